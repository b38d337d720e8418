use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{Application, ApplicationStatus};
use crate::utils::pagination::PageParams;
use crate::utils::validation::validate_phone;

/// Campos de texto del formulario multipart de solicitud
#[derive(Debug, Default, Validate)]
pub struct ApplicationForm {
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,

    #[validate(custom = "validate_phone")]
    pub phone: String,

    #[validate(length(min = 4, max = 50))]
    pub license_number: String,

    #[validate(length(max = 1000))]
    pub message: Option<String>,
}

// Request para resolver una solicitud
#[derive(Debug, Deserialize)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
}

// Response de solicitud
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub license_number: String,
    pub license_document: String,
    pub selfie: String,
    pub message: Option<String>,
    pub status: ApplicationStatus,
    pub reviewed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(application: Application) -> Self {
        Self {
            id: application.id,
            user_id: application.user_id,
            full_name: application.full_name,
            phone: application.phone,
            license_number: application.license_number,
            license_document: application.license_document,
            selfie: application.selfie,
            message: application.message,
            status: application.status,
            reviewed_by: application.reviewed_by,
            created_at: application.created_at,
        }
    }
}

/// Filtros para listados de solicitudes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationFilters {
    pub status: Option<ApplicationStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl ApplicationFilters {
    pub fn page_params(&self) -> PageParams {
        PageParams::new(self.page, self.limit)
    }
}
