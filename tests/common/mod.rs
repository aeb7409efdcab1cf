#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use vet_session::config::ApiConfig;
use vet_session::{ApiClient, SessionStorage, SessionStore};

pub const PASSWORD: &str = "secreto";

/// Requests seen by the mock backend
#[derive(Clone, Default)]
pub struct Recorded {
    pub login_bodies: Arc<Mutex<Vec<Value>>>,
}

impl Recorded {
    pub fn logins(&self) -> Vec<Value> {
        self.login_bodies.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub recorded: Recorded,
}

/// Start a mock clinic API on a free local port, serving until the test runtime stops
pub async fn spawn_backend() -> Result<MockBackend> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind mock backend")?;

    let recorded = Recorded::default();
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/echo-auth", get(echo_auth))
        .with_state(recorded.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(MockBackend {
        base_url: format!("http://127.0.0.1:{}", port),
        recorded,
    })
}

/// Base URL where nothing is listening
pub fn unreachable_base_url() -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    Ok(format!("http://127.0.0.1:{}", port))
}

pub fn client_for(base_url: &str) -> ApiClient {
    let mut config = ApiConfig::for_base_url(base_url);
    config.timeout_secs = 5;
    ApiClient::new(&config).expect("valid test client")
}

pub async fn store_for(base_url: &str, storage: Arc<dyn SessionStorage>) -> SessionStore {
    SessionStore::restore(client_for(base_url), storage).await
}

async fn login(State(recorded): State<Recorded>, Json(body): Json<Value>) -> Response {
    if let Ok(mut bodies) = recorded.login_bodies.lock() {
        bodies.push(body.clone());
    }

    let username = body["nombreUsuario"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if password != PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "mensaje": "Credenciales inválidas" })),
        )
            .into_response();
    }

    match username {
        "vet" => Json(json!({
            "token": "tok-vet",
            "roles": ["ROLE_VETERINARIO"],
            "nombreUsuario": "dra.garcia",
            "rolNombre": "Veterinario"
        }))
        .into_response(),
        "sysadmin" => Json(json!({
            "token": "tok-admin",
            "roles": ["ROLE_ADMIN_SISTEMA"],
            "passwordChangeRequired": true
        }))
        .into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Json(json!({
                "token": "tok-slow",
                "roles": ["ROLE_GERENTE"],
                "nombreUsuario": "slow"
            }))
            .into_response()
        }
        "notoken" => Json(json!({
            "roles": ["ROLE_ADMIN"],
            "nombreUsuario": "notoken"
        }))
        .into_response(),
        "badtoken" => Json(json!({ "token": "a\nb", "roles": ["ROLE_ADMIN"] })).into_response(),
        "emptytoken" => Json(json!({ "token": "", "roles": ["ROLE_ADMIN"] })).into_response(),
        "garbage" => (StatusCode::OK, "<html>mantenimiento</html>").into_response(),
        "crash" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "mensaje": "Usuario no encontrado" })),
        )
            .into_response(),
    }
}

async fn echo_auth(headers: HeaderMap) -> Json<Value> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Json(json!({ "authorization": authorization }))
}
