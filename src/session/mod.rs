//! Authentication session for the clinic API.
//!
//! `SessionStore` is created once at startup from the shared [`ApiClient`]
//! and a [`SessionStorage`] backend. It restores any persisted session,
//! performs login and logout, and answers permission and role queries.
//! Login and logout also install or remove the bearer credential on the
//! shared client, so every other API call follows the session.

pub mod model;
pub mod roles;

pub use model::{Credentials, LoginResponse, Session, UserRecord};
pub use roles::RoleCheck;

use std::sync::Arc;

use reqwest::header::HeaderValue;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::api::{bearer_header, ApiClient};
use crate::error::AuthError;
use crate::storage::{SessionStorage, StorageError, TOKEN_KEY, USER_KEY};

pub const LOGIN_PATH: &str = "/api/auth/login";

pub struct SessionStore {
    client: ApiClient,
    storage: Arc<dyn SessionStorage>,
    state: RwLock<Session>,
    // Held for the whole of a login or logout so they apply one at a time
    login_gate: Mutex<()>,
    login_path: String,
}

impl SessionStore {
    /// Build the store, loading whatever session the storage holds.
    ///
    /// A missing, partial or unreadable stored session starts signed out.
    pub async fn restore(client: ApiClient, storage: Arc<dyn SessionStorage>) -> Self {
        let session = match load_persisted(storage.as_ref()) {
            Ok(Some((session, header))) => {
                client.set_authorization(header).await;
                debug!(
                    "Restored session for '{}'",
                    session.user.as_ref().map(|u| u.username.as_str()).unwrap_or_default()
                );
                session
            }
            Ok(None) => Session::default(),
            Err(e) => {
                warn!("Could not read stored session, starting signed out: {}", e);
                Session::default()
            }
        };

        Self {
            client,
            storage,
            state: RwLock::new(session),
            login_gate: Mutex::new(()),
            login_path: LOGIN_PATH.to_string(),
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// The shared client whose default headers follow this session
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Snapshot of the current session
    pub async fn session(&self) -> Session {
        self.state.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    pub async fn user(&self) -> Option<UserRecord> {
        self.state.read().await.user.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    pub async fn has_permission(&self, name: &str) -> bool {
        self.state.read().await.has_permission(name)
    }

    pub async fn check(&self, role: RoleCheck) -> bool {
        self.state.read().await.check(role)
    }

    /// Sign in and make the returned user the current session
    pub async fn login(&self, credentials: &Credentials) -> Result<UserRecord, AuthError> {
        let _gate = self.login_gate.lock().await;

        match self.try_login(credentials).await {
            Ok(user) => Ok(user),
            Err(e) => {
                error!(
                    code = e.error_code(),
                    status = ?e.status(),
                    "Login failed for '{}': {}",
                    credentials.username,
                    e
                );
                Err(e)
            }
        }
    }

    async fn try_login(&self, credentials: &Credentials) -> Result<UserRecord, AuthError> {
        debug!("Sending login request for '{}'", credentials.username);

        let response = self
            .client
            .post_json(&self.login_path, credentials)
            .await
            .map_err(|e| {
                error!("Login request failed: {}", e);
                AuthError::transport()
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!("Could not read login response body: {}", e);
            AuthError::transport()
        })?;

        if !status.is_success() {
            let payload = serde_json::from_slice::<serde_json::Value>(&body).ok();
            debug!("Login rejected with status {}: {:?}", status, payload);
            return Err(AuthError::rejected(status.as_u16(), payload.as_ref()));
        }

        let parsed: LoginResponse = serde_json::from_slice(&body)
            .map_err(|e| AuthError::invalid_response(e.to_string()))?;
        let password_change_required = parsed.password_change_required();

        // Everything is validated before anything is written
        let (token, user) = parsed.into_session(&credentials.username)?;
        let header = bearer_header(&token)?;

        self.commit(token, user.clone(), header).await?;

        if password_change_required {
            warn!("User '{}' must change their password", user.username);
        }
        info!(
            permissions = user.permissions.len(),
            "Logged in as '{}'",
            user.username
        );

        Ok(user)
    }

    /// Persist the session, then publish it to memory and the shared client.
    ///
    /// Storage is written first as one unit; if that fails nothing changes.
    async fn commit(&self, token: String, user: UserRecord, header: HeaderValue) -> Result<(), AuthError> {
        let encoded = serde_json::to_string(&user).map_err(StorageError::from)?;
        self.storage
            .commit(&[(TOKEN_KEY, token.clone()), (USER_KEY, encoded)])?;

        let mut state = self.state.write().await;
        *state = Session::new(token, user);
        self.client.set_authorization(header).await;
        Ok(())
    }

    /// Sign out. Clears memory, storage and the shared bearer credential.
    pub async fn logout(&self) {
        let _gate = self.login_gate.lock().await;

        let mut state = self.state.write().await;
        let previous = state.user.take().map(|u| u.username);
        *state = Session::default();

        if let Err(e) = self.storage.remove(&[TOKEN_KEY, USER_KEY]) {
            warn!("Could not clear stored session: {}", e);
        }
        self.client.clear_bearer_token().await;

        match previous {
            Some(username) => info!("Logged out '{}'", username),
            None => debug!("Logout with no active session"),
        }
    }
}

fn load_persisted(storage: &dyn SessionStorage) -> Result<Option<(Session, HeaderValue)>, StorageError> {
    let token = match storage.get(TOKEN_KEY)? {
        Some(token) if !token.is_empty() => token,
        _ => return Ok(None),
    };

    let user = match storage.get(USER_KEY)? {
        Some(raw) => match serde_json::from_str::<UserRecord>(&raw) {
            Ok(user) => user,
            Err(e) => {
                warn!("Ignoring stored session with unreadable user record: {}", e);
                return Ok(None);
            }
        },
        None => {
            warn!("Ignoring stored token without a user record");
            return Ok(None);
        }
    };

    match bearer_header(&token) {
        Ok(header) => Ok(Some((Session::new(token, user), header))),
        Err(_) => {
            warn!("Ignoring stored token that is not a valid bearer credential");
            Ok(None)
        }
    }
}
