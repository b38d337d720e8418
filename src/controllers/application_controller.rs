use axum::extract::Multipart;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::application_dto::{
    ApplicationFilters, ApplicationForm, ApplicationResponse, UpdateApplicationStatusRequest,
};
use crate::middleware::auth::Session;
use crate::models::application::{Application, ApplicationStatus};
use crate::models::role::Role;
use crate::repositories::application_repository::ApplicationRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::upload_service::{UploadKind, UploadStore};
use crate::utils::errors::{forbidden_error, not_found_error, validation_error, AppError};
use crate::utils::pagination::Paginated;

/// Campos recibidos del formulario multipart
#[derive(Default)]
struct SubmittedForm {
    form: ApplicationForm,
    license_document: Option<String>,
    selfie: Option<String>,
}

impl SubmittedForm {
    fn stored_files(&self) -> impl Iterator<Item = &String> {
        self.license_document.iter().chain(self.selfie.iter())
    }
}

pub struct ApplicationController {
    pool: PgPool,
    repository: ApplicationRepository,
    users: UserRepository,
}

impl ApplicationController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ApplicationRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Solicitud de un cliente para convertirse en propietario
    pub async fn submit(
        &self,
        session: &Session,
        uploads: &UploadStore,
        multipart: Multipart,
    ) -> Result<ApiResponse<ApplicationResponse>, AppError> {
        if !session.role().can_apply_for_ownership() {
            return Err(forbidden_error("apply", "solo los clientes pueden solicitarlo"));
        }
        // El rol del token puede haber quedado viejo tras una aprobación
        let role = self
            .users
            .current_role(session.user_id())
            .await?
            .ok_or_else(|| AppError::Unauthorized("La cuenta ya no existe".to_string()))?;
        if !role.can_apply_for_ownership() {
            return Err(forbidden_error("apply", "la cuenta ya es de propietario"));
        }
        if self.repository.has_pending(session.user_id()).await? {
            return Err(AppError::Conflict("Ya tienes una solicitud pendiente".to_string()));
        }

        let mut submitted = SubmittedForm::default();
        let result = match self.read_form(uploads, multipart, &mut submitted).await {
            Ok(()) => self.save(session, &submitted).await,
            Err(e) => Err(e),
        };

        // Los archivos de una solicitud rechazada no se conservan
        if result.is_err() {
            for url in submitted.stored_files() {
                uploads.remove(url).await;
            }
        }

        let application = result?;
        info!("📝 Solicitud de propietario {} de {}", application.id, session.email());
        Ok(ApiResponse::success_with_message(
            ApplicationResponse::from(application),
            "Solicitud enviada",
        ))
    }

    async fn read_form(
        &self,
        uploads: &UploadStore,
        mut multipart: Multipart,
        submitted: &mut SubmittedForm,
    ) -> Result<(), AppError> {
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "fullName" => submitted.form.full_name = field.text().await?.trim().to_string(),
                "phone" => submitted.form.phone = field.text().await?.trim().to_string(),
                "licenseNumber" => submitted.form.license_number = field.text().await?.trim().to_string(),
                "message" => {
                    let message = field.text().await?.trim().to_string();
                    submitted.form.message = (!message.is_empty()).then_some(message);
                }
                "licenseDocument" => {
                    let url = uploads.store_field(UploadKind::LicenseDocument, field).await?;
                    if let Some(previous) = submitted.license_document.replace(url) {
                        uploads.remove(&previous).await;
                    }
                }
                "selfie" => {
                    let url = uploads.store_field(UploadKind::Selfie, field).await?;
                    if let Some(previous) = submitted.selfie.replace(url) {
                        uploads.remove(&previous).await;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    async fn save(&self, session: &Session, submitted: &SubmittedForm) -> Result<Application, AppError> {
        submitted.form.validate()?;

        let license_document = submitted
            .license_document
            .clone()
            .ok_or_else(|| validation_error("licenseDocument", "El documento de licencia es obligatorio"))?;
        let selfie = submitted
            .selfie
            .clone()
            .ok_or_else(|| validation_error("selfie", "La selfie es obligatoria"))?;

        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4(),
            user_id: session.user_id(),
            full_name: submitted.form.full_name.clone(),
            phone: submitted.form.phone.clone(),
            license_number: submitted.form.license_number.clone(),
            license_document,
            selfie,
            message: submitted.form.message.clone(),
            status: ApplicationStatus::Pending,
            reviewed_by: None,
            created_at: now,
            updated_at: now,
        };

        self.repository.create(&application).await
    }

    pub async fn list(
        &self,
        session: &Session,
        filters: ApplicationFilters,
    ) -> Result<Paginated<ApplicationResponse>, AppError> {
        session.require_admin()?;
        let (applications, total) = self.repository.list(&filters).await?;
        Ok(Paginated::new(applications, total, &filters.page_params()).map(ApplicationResponse::from))
    }

    pub async fn list_mine(&self, session: &Session) -> Result<Vec<ApplicationResponse>, AppError> {
        let applications = self.repository.list_by_user(session.user_id()).await?;
        Ok(applications.into_iter().map(ApplicationResponse::from).collect())
    }

    /// Aprobar o rechazar. La aprobación promueve al usuario a propietario
    /// en la misma transacción.
    pub async fn update_status(
        &self,
        session: &Session,
        id: Uuid,
        request: UpdateApplicationStatusRequest,
    ) -> Result<ApiResponse<ApplicationResponse>, AppError> {
        session.require_admin()?;

        let current = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Application", &id.to_string()))?;

        if !current.status.can_transition_to(request.status) {
            return Err(AppError::Conflict(format!(
                "La solicitud ya está {:?}",
                current.status
            )));
        }

        let mut tx = self.pool.begin().await?;

        let application = self
            .repository
            .resolve(&mut tx, id, request.status, session.user_id())
            .await?
            .ok_or_else(|| AppError::Conflict("La solicitud ya fue resuelta".to_string()))?;

        if application.status == ApplicationStatus::Approved {
            self.users.set_role(&mut tx, application.user_id, Role::Owner).await?;
        }
        tx.commit().await?;

        info!(
            "✅ Solicitud {} {:?} por {}",
            application.id,
            application.status,
            session.email()
        );
        let message = match application.status {
            ApplicationStatus::Approved => "Solicitud aprobada; el usuario obtiene el rol con POST /api/auth/refresh",
            _ => "Solicitud resuelta",
        };
        Ok(ApiResponse::success_with_message(
            ApplicationResponse::from(application),
            message,
        ))
    }
}
