//! Persistent key/value storage for the session.
//!
//! The session lives under two fixed keys: `token` holds the raw bearer token
//! and `user` holds the JSON-serialized user record. Backends write and remove
//! several keys as one unit so the pair never lands half-written.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Errors from storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Key/value backend holding the persisted session
pub trait SessionStorage: Send + Sync {
    /// Read a single key. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write every entry, or none of them
    fn commit(&self, entries: &[(&str, String)]) -> Result<(), StorageError>;

    /// Remove every listed key. Keys that are not present are ignored.
    fn remove(&self, keys: &[&str]) -> Result<(), StorageError>;
}
