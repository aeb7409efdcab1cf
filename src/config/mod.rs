use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub login_path: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Overrides the default `~/.config/vet` directory when set
    pub config_dir: Option<PathBuf>,
    pub session_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set
    pub default_filter: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("VET_API_URL") {
            self.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("VET_API_LOGIN_PATH") {
            self.api.login_path = v;
        }
        if let Ok(v) = env::var("VET_API_TIMEOUT_SECS") {
            self.api.timeout_secs = v.parse().unwrap_or(self.api.timeout_secs);
        }
        if let Ok(v) = env::var("VET_USER_AGENT") {
            self.api.user_agent = v;
        }

        if let Ok(v) = env::var("VET_CONFIG_DIR") {
            self.storage.config_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var("VET_SESSION_FILE") {
            self.storage.session_file = v;
        }

        if let Ok(v) = env::var("VET_LOG") {
            self.logging.default_filter = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            api: ApiConfig {
                base_url: "http://localhost:8080".to_string(),
                login_path: "/api/auth/login".to_string(),
                timeout_secs: 30,
                user_agent: format!("vet-session/{}", env!("CARGO_PKG_VERSION")),
            },
            storage: StorageConfig {
                config_dir: None,
                session_file: "session.json".to_string(),
            },
            logging: LoggingConfig {
                default_filter: "warn".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            api: ApiConfig {
                base_url: "https://staging.vet.example.com".to_string(),
                login_path: "/api/auth/login".to_string(),
                timeout_secs: 15,
                user_agent: format!("vet-session/{}", env!("CARGO_PKG_VERSION")),
            },
            storage: StorageConfig {
                config_dir: None,
                session_file: "session.json".to_string(),
            },
            logging: LoggingConfig {
                default_filter: "vet_session=info,warn".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            api: ApiConfig {
                base_url: "https://vet.example.com".to_string(),
                login_path: "/api/auth/login".to_string(),
                timeout_secs: 10,
                user_agent: format!("vet-session/{}", env!("CARGO_PKG_VERSION")),
            },
            storage: StorageConfig {
                config_dir: None,
                session_file: "session.json".to_string(),
            },
            logging: LoggingConfig {
                default_filter: "warn".to_string(),
            },
        }
    }
}

impl ApiConfig {
    /// Config pointing at an arbitrary base URL, with development defaults for the rest
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..AppConfig::development().api
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
