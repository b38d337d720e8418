//! Sesión autenticada
//!
//! La sesión se extrae una vez por request del header `Authorization`
//! y se inyecta en los handlers. Ningún handler lee el token directamente.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    models::role::{NavItem, Role},
    state::AppState,
    utils::{
        errors::{forbidden_error, AppError, AppResult},
        jwt::{extract_token_from_header, verify_token, JwtClaims},
    },
};

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: Uuid,
    email: String,
    role: Role,
}

/// Vista pública de la sesión, con la navegación del rol
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub navigation: &'static [NavItem],
}

impl Session {
    pub fn new(user_id: Uuid, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
        }
    }

    pub fn from_claims(claims: JwtClaims) -> AppResult<Self> {
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthorized("ID de usuario inválido".to_string()))?;
        Ok(Self::new(user_id, claims.email, claims.role))
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            user_id: self.user_id,
            email: self.email.clone(),
            role: self.role,
            navigation: self.role.navigation(),
        }
    }

    /// Solo administradores
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(forbidden_error("access resource", "se requieren permisos de administrador"))
        }
    }

    /// Propietarios o administradores
    pub fn require_fleet_manager(&self) -> AppResult<()> {
        if self.role.can_manage_fleet() {
            Ok(())
        } else {
            Err(forbidden_error(
                "manage cars",
                "se requiere ser propietario (tras una aprobación, renueva el token en /api/auth/refresh)",
            ))
        }
    }

    /// El propio usuario o un administrador
    pub fn require_self_or_admin(&self, user_id: Uuid) -> AppResult<()> {
        if self.user_id == user_id || self.role.is_admin() {
            Ok(())
        } else {
            Err(forbidden_error("access user", "no es tu cuenta"))
        }
    }

    /// Dueño del recurso o administrador
    pub fn owns_or_admin(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.role.is_admin()
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

        let token = extract_token_from_header(auth_header)?;
        let claims = verify_token(token, &state.jwt)?;
        Session::from_claims(claims)
    }
}
