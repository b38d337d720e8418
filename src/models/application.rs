//! Modelo de Application
//!
//! Solicitud de un cliente para publicar autos como propietario.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la solicitud - mapea al ENUM application_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "application_status", rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// Solo una solicitud pendiente puede resolverse
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        matches!(
            (self, next),
            (ApplicationStatus::Pending, ApplicationStatus::Approved)
                | (ApplicationStatus::Pending, ApplicationStatus::Rejected)
        )
    }
}

/// Application principal - mapea exactamente a la tabla applications
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
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
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_transitions() {
        use ApplicationStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Pending.can_transition_to(Pending));
    }
}
