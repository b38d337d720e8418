use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::application_dto::ApplicationFilters;
use crate::models::application::{Application, ApplicationStatus};
use crate::utils::errors::AppError;

pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, application: &Application) -> Result<Application, AppError> {
        let created = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (
                id, user_id, full_name, phone, license_number, license_document,
                selfie, message, status, reviewed_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(application.id)
        .bind(application.user_id)
        .bind(&application.full_name)
        .bind(&application.phone)
        .bind(&application.license_number)
        .bind(&application.license_document)
        .bind(&application.selfie)
        .bind(&application.message)
        .bind(application.status)
        .bind(application.reviewed_by)
        .bind(application.created_at)
        .bind(application.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn has_pending(&self, user_id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM applications WHERE user_id = $1 AND status = 'pending')",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>, AppError> {
        let application = sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(application)
    }

    pub async fn list(&self, filters: &ApplicationFilters) -> Result<(Vec<Application>, i64), AppError> {
        let params = filters.page_params();

        let applications = sqlx::query_as::<_, Application>(
            r#"
            SELECT * FROM applications
            WHERE ($1::application_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filters.status)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM applications WHERE ($1::application_status IS NULL OR status = $1)",
        )
        .bind(filters.status)
        .fetch_one(&self.pool)
        .await?;

        Ok((applications, total.0))
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Application>, AppError> {
        let applications = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    /// Resolver la solicitud solo si sigue pendiente
    pub async fn resolve(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: ApplicationStatus,
        reviewer_id: Uuid,
    ) -> Result<Option<Application>, AppError> {
        let application = sqlx::query_as::<_, Application>(
            r#"
            UPDATE applications
            SET status = $2, reviewed_by = $3, updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewer_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(application)
    }

    pub async fn count_pending(&self) -> Result<i64, AppError> {
        let result: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM applications WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }
}
