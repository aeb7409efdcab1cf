// Shared HTTP client for the clinic API
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::ApiConfig;
use crate::error::AuthError;

/// Errors building an ApiClient
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid API base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        source: url::ParseError,
    },

    #[error(transparent)]
    Build(#[from] reqwest::Error),
}

/// HTTP client shared by every consumer of the API.
///
/// Clones share one set of default headers, so the bearer credential set by
/// a login is sent by every clone until logout removes it.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    default_headers: Arc<RwLock<HeaderMap>>,
}

/// `Bearer <token>` header value, marked sensitive so it is redacted from Debug output
pub fn bearer_header(token: &str) -> Result<HeaderValue, AuthError> {
    let mut value =
        HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| AuthError::InvalidToken)?;
    value.set_sensitive(true);
    Ok(value)
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        url::Url::parse(&config.base_url).map_err(|source| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            default_headers: Arc::new(RwLock::new(HeaderMap::new())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        if path.is_empty() {
            return self.base_url.clone();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Install `Authorization: Bearer <token>` on every future request
    pub async fn set_bearer_token(&self, token: &str) -> Result<(), AuthError> {
        let value = bearer_header(token)?;
        self.set_authorization(value).await;
        Ok(())
    }

    pub(crate) async fn set_authorization(&self, value: HeaderValue) {
        self.default_headers
            .write()
            .await
            .insert(AUTHORIZATION, value);
    }

    pub async fn clear_bearer_token(&self) {
        self.default_headers.write().await.remove(AUTHORIZATION);
    }

    /// Current default Authorization header, e.g. `Bearer abc`
    pub async fn authorization(&self) -> Option<String> {
        self.default_headers
            .read()
            .await
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub async fn bearer_token(&self) -> Option<String> {
        self.authorization()
            .await
            .and_then(|v| v.strip_prefix("Bearer ").map(str::to_string))
    }

    /// Request builder for `path` with the current default headers applied
    pub async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let headers = self.default_headers.read().await.clone();
        self.client.request(method, self.url(path)).headers(headers)
    }

    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        self.request(Method::GET, path).await.send().await
    }

    pub async fn post_json<T>(&self, path: &str, body: &T) -> Result<Response, reqwest::Error>
    where
        T: Serialize + ?Sized,
    {
        self.request(Method::POST, path).await.json(body).send().await
    }
}
