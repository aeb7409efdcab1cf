pub mod client;

pub use client::{bearer_header, ApiClient, ClientError};
