mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use vet_session::error::DEFAULT_LOGIN_ERROR;
use vet_session::storage::{TOKEN_KEY, USER_KEY};
use vet_session::{AuthError, Credentials, MemoryStorage, Session, SessionStorage, UserRecord};

#[tokio::test]
async fn login_sets_session_and_bearer_header() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = common::store_for(&backend.base_url, Arc::new(MemoryStorage::new())).await;

    let user = store.login(&Credentials::new("vet", common::PASSWORD)).await?;

    assert_eq!(user.username, "dra.garcia");
    assert_eq!(user.permissions, vec!["ROLE_VETERINARIO"]);
    assert_eq!(user.roles, user.permissions);
    assert_eq!(user.role_name, "Veterinario");

    let session = store.session().await;
    assert!(session.is_authenticated());
    assert!(session.is_veterinario());
    assert!(!session.is_admin());
    assert!(session.has_permission("ROLE_VETERINARIO"));
    assert_eq!(session.token.as_deref(), Some("tok-vet"));
    assert_eq!(
        store.client().authorization().await.as_deref(),
        Some("Bearer tok-vet")
    );

    Ok(())
}

#[tokio::test]
async fn login_sends_credentials_payload() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = common::store_for(&backend.base_url, Arc::new(MemoryStorage::new())).await;

    store.login(&Credentials::new("vet", common::PASSWORD)).await?;

    let logins = backend.recorded.logins();
    assert_eq!(logins.len(), 1);
    assert_eq!(logins[0]["nombreUsuario"], "vet");
    assert_eq!(logins[0]["password"], common::PASSWORD);

    Ok(())
}

#[tokio::test]
async fn login_falls_back_to_submitted_username() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = common::store_for(&backend.base_url, Arc::new(MemoryStorage::new())).await;

    // passwordChangeRequired is reported but does not block the login
    let user = store.login(&Credentials::new("sysadmin", common::PASSWORD)).await?;

    assert_eq!(user.username, "sysadmin");
    assert_eq!(user.role_name, "");

    let session = store.session().await;
    assert!(session.is_admin());
    assert!(session.is_admin_sistema());
    assert!(session.is_admin_usuarios());
    assert!(session.is_admin_veterinaria());
    assert!(!session.is_veterinario());

    Ok(())
}

#[tokio::test]
async fn missing_token_leaves_session_unchanged() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let storage = Arc::new(MemoryStorage::new());
    let store = common::store_for(&backend.base_url, storage.clone()).await;

    let err = store
        .login(&Credentials::new("notoken", common::PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::TokenMissing));
    assert_eq!(store.session().await, Session::default());
    assert_eq!(store.client().authorization().await, None);
    assert!(storage.is_empty());

    // An existing session survives a failed login as well
    store.login(&Credentials::new("vet", common::PASSWORD)).await?;
    let before = store.session().await;

    let err = store
        .login(&Credentials::new("emptytoken", common::PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::TokenMissing));
    assert_eq!(store.session().await, before);
    assert_eq!(
        store.client().authorization().await.as_deref(),
        Some("Bearer tok-vet")
    );

    Ok(())
}

#[tokio::test]
async fn rejected_login_uses_server_message() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = common::store_for(&backend.base_url, Arc::new(MemoryStorage::new())).await;

    let err = store
        .login(&Credentials::new("vet", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Credenciales inválidas");
    assert_eq!(err.status(), Some(401));
    assert!(!store.is_authenticated().await);

    let err = store
        .login(&Credentials::new("nobody", common::PASSWORD))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Usuario no encontrado");
    assert_eq!(err.status(), Some(404));

    Ok(())
}

#[tokio::test]
async fn server_error_without_message_uses_default() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = common::store_for(&backend.base_url, Arc::new(MemoryStorage::new())).await;

    let err = store
        .login(&Credentials::new("crash", common::PASSWORD))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), DEFAULT_LOGIN_ERROR);
    assert_eq!(err.status(), Some(500));

    Ok(())
}

#[tokio::test]
async fn malformed_success_body_is_invalid_response() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = common::store_for(&backend.base_url, Arc::new(MemoryStorage::new())).await;

    let err = store
        .login(&Credentials::new("garbage", common::PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidResponse(_)));
    assert_eq!(err.message(), DEFAULT_LOGIN_ERROR);
    assert_eq!(err.to_json()["message"], DEFAULT_LOGIN_ERROR);
    assert!(!store.is_authenticated().await);

    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_transport_error() -> Result<()> {
    let base_url = common::unreachable_base_url()?;
    let store = common::store_for(&base_url, Arc::new(MemoryStorage::new())).await;

    let err = store
        .login(&Credentials::new("vet", common::PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Transport(_)));
    assert_eq!(err.to_string(), DEFAULT_LOGIN_ERROR);
    assert!(!store.is_authenticated().await);

    Ok(())
}

#[tokio::test]
async fn bearer_header_follows_session_on_other_requests() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = common::store_for(&backend.base_url, Arc::new(MemoryStorage::new())).await;
    let other_consumer = store.client().clone();

    let body: Value = other_consumer.get("/api/echo-auth").await?.json().await?;
    assert!(body["authorization"].is_null());

    store.login(&Credentials::new("vet", common::PASSWORD)).await?;
    let body: Value = other_consumer.get("/api/echo-auth").await?.json().await?;
    assert_eq!(body["authorization"], "Bearer tok-vet");

    store.logout().await;
    let body: Value = other_consumer.get("/api/echo-auth").await?.json().await?;
    assert!(body["authorization"].is_null());

    Ok(())
}

#[tokio::test]
async fn logout_after_login_clears_session() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let storage = Arc::new(MemoryStorage::new());
    let store = common::store_for(&backend.base_url, storage.clone()).await;

    store.login(&Credentials::new("vet", common::PASSWORD)).await?;
    assert!(!storage.is_empty());

    store.logout().await;

    assert!(!store.is_authenticated().await);
    assert_eq!(store.token().await, None);
    assert_eq!(store.user().await, None);
    assert!(!store.has_permission("ROLE_VETERINARIO").await);
    assert_eq!(store.client().authorization().await, None);
    assert!(storage.is_empty());

    Ok(())
}

#[tokio::test]
async fn concurrent_logins_apply_one_at_a_time() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let store = Arc::new(common::store_for(&backend.base_url, Arc::new(MemoryStorage::new())).await);

    let slow_store = store.clone();
    let slow = tokio::spawn(async move {
        slow_store
            .login(&Credentials::new("slow", common::PASSWORD))
            .await
    });

    // Let the slow login take the gate before the fast one starts
    tokio::time::sleep(Duration::from_millis(50)).await;
    store.login(&Credentials::new("vet", common::PASSWORD)).await?;
    slow.await??;

    // The fast login waited for the slow one, so it is the last to apply
    assert_eq!(store.token().await.as_deref(), Some("tok-vet"));
    assert_eq!(
        store.client().authorization().await.as_deref(),
        Some("Bearer tok-vet")
    );

    Ok(())
}

#[tokio::test]
async fn header_unsafe_token_changes_nothing() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let storage = Arc::new(MemoryStorage::new());
    let store = common::store_for(&backend.base_url, storage.clone()).await;

    let err = store
        .login(&Credentials::new("badtoken", common::PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidToken));
    assert_eq!(err.message(), DEFAULT_LOGIN_ERROR);
    assert_eq!(store.session().await, Session::default());
    assert_eq!(store.client().authorization().await, None);
    assert!(storage.is_empty());

    // an existing session is left as it was
    store.login(&Credentials::new("vet", common::PASSWORD)).await?;
    let before = store.session().await;

    store
        .login(&Credentials::new("badtoken", common::PASSWORD))
        .await
        .unwrap_err();

    assert_eq!(store.session().await, before);
    assert_eq!(
        store.client().authorization().await.as_deref(),
        Some("Bearer tok-vet")
    );
    assert_eq!(storage.len(), 2);

    Ok(())
}

#[tokio::test]
async fn rejected_login_keeps_existing_session() -> Result<()> {
    let backend = common::spawn_backend().await?;
    let storage = Arc::new(MemoryStorage::new());
    let store = common::store_for(&backend.base_url, storage.clone()).await;

    store.login(&Credentials::new("vet", common::PASSWORD)).await?;
    let before = store.session().await;

    let err = store
        .login(&Credentials::new("sysadmin", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(401));

    assert_eq!(store.session().await, before);
    assert_eq!(
        store.client().authorization().await.as_deref(),
        Some("Bearer tok-vet")
    );
    assert_eq!(storage.get(TOKEN_KEY)?.as_deref(), Some("tok-vet"));

    Ok(())
}

#[tokio::test]
async fn transport_failure_keeps_existing_session() -> Result<()> {
    let base_url = common::unreachable_base_url()?;
    let user = UserRecord::new("ana", vec!["ROLE_GERENTE".to_string()], "Gerente");
    let storage = Arc::new(MemoryStorage::with_entries([
        (TOKEN_KEY, "stored-token".to_string()),
        (USER_KEY, serde_json::to_string(&user)?),
    ]));
    let store = common::store_for(&base_url, storage.clone()).await;
    assert!(store.is_authenticated().await);

    let err = store
        .login(&Credentials::new("vet", common::PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Transport(_)));

    assert_eq!(store.user().await, Some(user));
    assert_eq!(store.token().await.as_deref(), Some("stored-token"));
    assert_eq!(
        store.client().authorization().await.as_deref(),
        Some("Bearer stored-token")
    );
    assert_eq!(storage.get(TOKEN_KEY)?.as_deref(), Some("stored-token"));

    Ok(())
}
