use std::collections::HashMap;
use std::sync::RwLock;

use super::{SessionStorage, StorageError};

/// In-process storage, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with entries, as if left behind by an earlier run
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn commit(&self, entries: &[(&str, String)]) -> Result<(), StorageError> {
        let mut stored = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        for (key, value) in entries {
            stored.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut stored = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        for key in keys {
            stored.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{TOKEN_KEY, USER_KEY};

    #[test]
    fn commit_then_remove() {
        let storage = MemoryStorage::new();
        storage
            .commit(&[(TOKEN_KEY, "abc".to_string()), (USER_KEY, "{}".to_string())])
            .unwrap();

        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));
        assert_eq!(storage.len(), 2);

        storage.remove(&[TOKEN_KEY, USER_KEY, "absent"]).unwrap();
        assert!(storage.is_empty());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn with_entries_prepopulates() {
        let storage = MemoryStorage::with_entries([(TOKEN_KEY, "t")]);
        assert_eq!(storage.get(TOKEN_KEY).unwrap().as_deref(), Some("t"));
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }
}
