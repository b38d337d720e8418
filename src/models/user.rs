//! Modelo de User
//!
//! Mapea exactamente a la tabla users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::Role;

/// User principal - mapea exactamente a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: Role,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(full_name: String, email: String, password_hash: String, phone: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            full_name,
            email,
            password_hash,
            phone,
            role: Role::Customer,
            profile_image: None,
            created_at: now,
            updated_at: now,
        }
    }
}
