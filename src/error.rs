// Authentication error types
use serde_json::{json, Value};
use thiserror::Error;

use crate::storage::StorageError;

/// Message shown when the server does not provide one of its own
pub const DEFAULT_LOGIN_ERROR: &str = "Error al iniciar sesión";

/// Login failure with a user-facing message
#[derive(Debug, Error)]
pub enum AuthError {
    // Success status but no usable token in the body
    #[error("token missing")]
    TokenMissing,

    // Success status but the body does not match the login response schema
    #[error("invalid login response: {0}")]
    InvalidResponse(String),

    // Token contains bytes that cannot appear in an Authorization header
    #[error("token cannot be used as a bearer credential")]
    InvalidToken,

    // Non-success status from the login endpoint
    #[error("{message}")]
    Rejected { status: u16, message: String },

    // Connection, timeout or body read failure
    #[error("{0}")]
    Transport(String),

    // Session could not be written to persistent storage
    #[error("could not persist session: {0}")]
    Storage(String),
}

impl AuthError {
    /// Build a rejection from the error body, preferring the server's `mensaje`
    pub fn rejected(status: u16, body: Option<&Value>) -> Self {
        let message = body
            .and_then(|b| b.get("mensaje"))
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(DEFAULT_LOGIN_ERROR)
            .to_string();

        AuthError::Rejected { status, message }
    }

    pub fn transport() -> Self {
        AuthError::Transport(DEFAULT_LOGIN_ERROR.to_string())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        AuthError::InvalidResponse(message.into())
    }

    /// Client-safe message. Internal detail stays in `Display` for the logs.
    pub fn message(&self) -> String {
        match self {
            AuthError::TokenMissing | AuthError::Rejected { .. } | AuthError::Transport(_) => {
                self.to_string()
            }
            AuthError::InvalidResponse(_) | AuthError::InvalidToken | AuthError::Storage(_) => {
                DEFAULT_LOGIN_ERROR.to_string()
            }
        }
    }

    /// HTTP status reported by the server, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::TokenMissing => "TOKEN_MISSING",
            AuthError::InvalidResponse(_) => "INVALID_RESPONSE",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::Rejected { .. } => "LOGIN_REJECTED",
            AuthError::Transport(_) => "TRANSPORT_ERROR",
            AuthError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Convert to JSON body for machine-readable output
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        if let Some(status) = self.status() {
            body["status"] = json!(status);
        }

        body
    }
}

impl From<StorageError> for AuthError {
    fn from(err: StorageError) -> Self {
        AuthError::Storage(err.to_string())
    }
}
