pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;

pub use api::ApiClient;
pub use error::AuthError;
pub use session::{Credentials, RoleCheck, Session, SessionStore, UserRecord};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
