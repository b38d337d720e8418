//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::availability::RangeError;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("JWT error: {0}")]
    Jwt(String),

    #[error("Hash error: {0}")]
    Hash(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            details: None,
            code: Some(code.to_string()),
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl AppError {
    /// Código HTTP asociado al error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(e) if is_unique_violation(e) || is_foreign_key_violation(e) => {
                StatusCode::CONFLICT
            }
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::Jwt(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            AppError::Hash(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

// Referencia a una fila que ya no existe (p. ej. una cuenta borrada)
fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map(|db| db.is_foreign_key_violation())
        .unwrap_or(false)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("❌ {}", self);
        } else {
            tracing::warn!("⚠️ {}", self);
        }

        let body = match self {
            AppError::Database(e) if is_unique_violation(&e) => ErrorResponse::new(
                "Conflict",
                "El recurso ya existe",
                "CONFLICT",
            ),
            AppError::Database(e) if is_foreign_key_violation(&e) => ErrorResponse::new(
                "Conflict",
                "El recurso referenciado ya no existe",
                "CONFLICT",
            ),
            AppError::Database(e) => ErrorResponse::new(
                "Database Error",
                "An error occurred while accessing the database",
                "DB_ERROR",
            )
            .with_details(json!({ "sql_error": e.to_string() })),
            AppError::Validation(e) => ErrorResponse::new(
                "Validation Error",
                "The provided data is invalid",
                "VALIDATION_ERROR",
            )
            .with_details(json!(e)),
            AppError::Unauthorized(msg) => ErrorResponse::new("Unauthorized", msg, "UNAUTHORIZED"),
            AppError::Forbidden(msg) => ErrorResponse::new("Forbidden", msg, "FORBIDDEN"),
            AppError::NotFound(msg) => ErrorResponse::new("Not Found", msg, "NOT_FOUND"),
            AppError::Conflict(msg) => ErrorResponse::new("Conflict", msg, "CONFLICT"),
            AppError::BadRequest(msg) => ErrorResponse::new("Bad Request", msg, "BAD_REQUEST"),
            AppError::Internal(msg) => ErrorResponse::new(
                "Internal Server Error",
                "An unexpected error occurred",
                "INTERNAL_ERROR",
            )
            .with_details(json!({ "internal_error": msg })),
            AppError::RateLimitExceeded => ErrorResponse::new(
                "Rate Limit Exceeded",
                "Too many requests. Please try again later",
                "RATE_LIMIT_EXCEEDED",
            ),
            AppError::Jwt(msg) => ErrorResponse::new("JWT Error", msg, "JWT_ERROR"),
            AppError::Hash(msg) => ErrorResponse::new(
                "Hash Error",
                "An error occurred while processing credentials",
                "HASH_ERROR",
            )
            .with_details(json!({ "hash_error": msg })),
            AppError::PayloadTooLarge(msg) => {
                ErrorResponse::new("Payload Too Large", msg, "PAYLOAD_TOO_LARGE")
            }
            AppError::UnsupportedMediaType(msg) => {
                ErrorResponse::new("Unsupported Media Type", msg, "UNSUPPORTED_MEDIA_TYPE")
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(e: bcrypt::BcryptError) -> Self {
        AppError::Hash(e.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::Jwt(format!("Token inválido: {}", e))
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(e.body_text())
        } else {
            AppError::BadRequest(format!("Formulario multipart inválido: {}", e.body_text()))
        }
    }
}

impl From<RangeError> for AppError {
    fn from(e: RangeError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.add_param("field".into(), &field);
    error.add_param("message".into(), &message);

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Jwt("x".into()).status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::RateLimitExceeded.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            AppError::UnsupportedMediaType("x".into()).status_code(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[derive(Debug)]
    struct ConstraintError(sqlx::error::ErrorKind);

    impl std::fmt::Display for ConstraintError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "constraint violated")
        }
    }

    impl std::error::Error for ConstraintError {}

    impl sqlx::error::DatabaseError for ConstraintError {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            match self.0 {
                sqlx::error::ErrorKind::UniqueViolation => sqlx::error::ErrorKind::UniqueViolation,
                sqlx::error::ErrorKind::ForeignKeyViolation => sqlx::error::ErrorKind::ForeignKeyViolation,
                _ => sqlx::error::ErrorKind::Other,
            }
        }
    }

    fn constraint_error(kind: sqlx::error::ErrorKind) -> AppError {
        AppError::Database(sqlx::Error::Database(Box::new(ConstraintError(kind))))
    }

    #[test]
    fn test_constraint_violations_are_conflicts() {
        let err = constraint_error(sqlx::error::ErrorKind::ForeignKeyViolation);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = constraint_error(sqlx::error::ErrorKind::UniqueViolation);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = constraint_error(sqlx::error::ErrorKind::Other);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_range_error_is_bad_request() {
        let err: AppError = RangeError::EndBeforeStart {
            start: chrono::NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            end: chrono::NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_error_helper() {
        let err = validation_error("email", "invalid");
        match err {
            AppError::Validation(errors) => assert!(errors.field_errors().contains_key("email")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
