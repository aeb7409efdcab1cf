use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::config;
use crate::session::SessionStore;
use crate::storage::FileStorage;

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = match &config().storage.config_dir {
        Some(custom_dir) => custom_dir.clone(),
        None => {
            let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
            PathBuf::from(home).join(".config").join("vet")
        }
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn open_session_storage() -> anyhow::Result<FileStorage> {
    let config_dir = get_config_dir()?;
    Ok(FileStorage::in_dir(&config_dir, &config().storage.session_file))
}

/// Shared client plus the session restored from the config directory
pub async fn open_session() -> anyhow::Result<SessionStore> {
    let api = &config().api;
    let client = ApiClient::new(api)?;
    let storage = open_session_storage()?;

    Ok(SessionStore::restore(client, Arc::new(storage))
        .await
        .with_login_path(api.login_path.clone()))
}
