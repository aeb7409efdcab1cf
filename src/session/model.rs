use std::fmt;

use serde::{Deserialize, Serialize};

use super::roles::RoleCheck;
use crate::error::AuthError;

/// User data kept alongside the token. Field names match the stored JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(rename = "nombreUsuario")]
    pub username: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Same list as `permissions`, kept for consumers that read `roles`
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(rename = "rolNombre", default)]
    pub role_name: String,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, permissions: Vec<String>, role_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roles: permissions.clone(),
            permissions,
            role_name: role_name.into(),
        }
    }
}

/// Login payload
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "nombreUsuario")]
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of a successful `POST /api/auth/login`
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    #[serde(default)]
    pub nombre_usuario: Option<String>,
    #[serde(default)]
    pub rol_nombre: Option<String>,
    #[serde(default)]
    pub password_change_required: Option<bool>,
}

impl LoginResponse {
    pub fn password_change_required(&self) -> bool {
        self.password_change_required.unwrap_or(false)
    }

    /// Validate the response and build the session it describes.
    ///
    /// `fallback_username` is used when the server omits the username.
    pub fn into_session(self, fallback_username: &str) -> Result<(String, UserRecord), AuthError> {
        let token = self
            .token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::TokenMissing)?;

        let username = self
            .nombre_usuario
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| fallback_username.to_string());

        let user = UserRecord::new(
            username,
            self.roles.unwrap_or_default(),
            self.rol_nombre.unwrap_or_default(),
        );

        Ok((token, user))
    }
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("roles", &self.roles)
            .field("nombre_usuario", &self.nombre_usuario)
            .field("rol_nombre", &self.rol_nombre)
            .field("password_change_required", &self.password_change_required)
            .finish()
    }
}

/// Token and user of the signed-in account. Both are absent when signed out.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<UserRecord>,
}

impl Session {
    pub fn new(token: String, user: UserRecord) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn permissions(&self) -> &[String] {
        self.user
            .as_ref()
            .map(|u| u.permissions.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_permission(&self, name: &str) -> bool {
        self.permissions().iter().any(|p| p == name)
    }

    pub fn check(&self, role: RoleCheck) -> bool {
        role.is_satisfied_by(self.permissions())
    }

    pub fn is_admin(&self) -> bool {
        self.check(RoleCheck::Admin)
    }

    pub fn is_admin_sistema(&self) -> bool {
        self.check(RoleCheck::AdminSistema)
    }

    pub fn is_admin_usuarios(&self) -> bool {
        self.check(RoleCheck::AdminUsuarios)
    }

    pub fn is_admin_veterinaria(&self) -> bool {
        self.check(RoleCheck::AdminVeterinaria)
    }

    pub fn is_veterinario(&self) -> bool {
        self.check(RoleCheck::Veterinario)
    }

    pub fn is_gerente(&self) -> bool {
        self.check(RoleCheck::Gerente)
    }

    pub fn is_recepcionista(&self) -> bool {
        self.check(RoleCheck::Recepcionista)
    }

    pub fn is_asistente(&self) -> bool {
        self.check(RoleCheck::Asistente)
    }

    pub fn is_consultor_datos(&self) -> bool {
        self.check(RoleCheck::ConsultorDatos)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user", &self.user)
            .finish()
    }
}
