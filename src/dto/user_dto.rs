use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{role::Role, user::User};
use crate::utils::pagination::PageParams;
use crate::utils::validation::validate_phone;

/// Response de usuario (sin password)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            profile_image: user.profile_image,
            created_at: user.created_at,
        }
    }
}

/// Request para actualizar el perfil propio
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 100))]
    pub full_name: Option<String>,

    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,

    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
}

/// Filtros para búsqueda de usuarios
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilters {
    pub role: Option<Role>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl UserFilters {
    pub fn page_params(&self) -> PageParams {
        PageParams::new(self.page, self.limit)
    }
}

/// Contadores del panel de administración
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub customers: i64,
    pub owners: i64,
    pub admins: i64,
    pub cars: i64,
    pub available_cars: i64,
    pub pending_bookings: i64,
    pub confirmed_bookings: i64,
    pub cancelled_bookings: i64,
    pub completed_bookings: i64,
    pub pending_applications: i64,
}
