use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::user_dto::UserResponse;
use crate::middleware::auth::SessionView;
use crate::utils::validation::validate_phone;

// Request de registro
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
}

// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

// Response de login y registro
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub session: SessionView,
    pub user: UserResponse,
}
