use axum::extract::Multipart;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::user_dto::{AdminStats, UpdateProfileRequest, UserFilters, UserResponse};
use crate::middleware::auth::Session;
use crate::models::booking::BookingStatus;
use crate::models::car::CarStatus;
use crate::models::role::Role;
use crate::repositories::application_repository::ApplicationRepository;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::car_repository::CarRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::upload_service::{UploadKind, UploadStore};
use crate::utils::errors::{not_found_error, AppError};
use crate::utils::pagination::Paginated;

pub struct UserController {
    repository: UserRepository,
    bcrypt_cost: u32,
}

impl UserController {
    pub fn new(pool: PgPool, bcrypt_cost: u32) -> Self {
        Self {
            repository: UserRepository::new(pool),
            bcrypt_cost,
        }
    }

    pub async fn list(&self, session: &Session, filters: UserFilters) -> Result<Paginated<UserResponse>, AppError> {
        session.require_admin()?;
        let (users, total) = self.repository.list(&filters).await?;
        Ok(Paginated::new(users, total, &filters.page_params()).map(UserResponse::from))
    }

    pub async fn get_by_id(&self, session: &Session, id: Uuid) -> Result<UserResponse, AppError> {
        session.require_self_or_admin(id)?;
        let user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("User", &id.to_string()))?;

        Ok(UserResponse::from(user))
    }

    pub async fn update_me(
        &self,
        session: &Session,
        request: UpdateProfileRequest,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        request.validate()?;

        let password_hash = match request.password {
            Some(password) => Some(bcrypt::hash(password, self.bcrypt_cost)?),
            None => None,
        };
        let user = self
            .repository
            .update_profile(
                session.user_id(),
                request.full_name.map(|name| name.trim().to_string()),
                request.phone,
                password_hash,
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            UserResponse::from(user),
            "Perfil actualizado",
        ))
    }

    pub async fn upload_selfie(
        &self,
        session: &Session,
        uploads: &UploadStore,
        mut multipart: Multipart,
    ) -> Result<ApiResponse<UserResponse>, AppError> {
        let current = self
            .repository
            .find_by_id(session.user_id())
            .await?
            .ok_or_else(|| not_found_error("User", &session.user_id().to_string()))?;

        let url = uploads
            .store_from_multipart(UploadKind::Selfie, &mut multipart, "selfie")
            .await?;
        let user = match self.repository.update_profile_image(current.id, &url).await {
            Ok(user) => user,
            Err(e) => {
                uploads.remove(&url).await;
                return Err(e);
            }
        };

        if let Some(previous) = current.profile_image {
            uploads.remove(&previous).await;
        }

        Ok(ApiResponse::success_with_message(
            UserResponse::from(user),
            "Foto de perfil actualizada",
        ))
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> Result<(), AppError> {
        session.require_admin()?;
        if id == session.user_id() {
            return Err(AppError::BadRequest(
                "Un administrador no puede eliminar su propia cuenta".to_string(),
            ));
        }

        if !self.repository.delete(id).await? {
            return Err(not_found_error("User", &id.to_string()));
        }

        info!("🗑️ Usuario {} eliminado por {}", id, session.email());
        Ok(())
    }
}

/// Contadores del panel de administración
pub struct AdminController {
    users: UserRepository,
    cars: CarRepository,
    bookings: BookingRepository,
    applications: ApplicationRepository,
}

impl AdminController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            cars: CarRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool.clone()),
            applications: ApplicationRepository::new(pool),
        }
    }

    pub async fn stats(&self, session: &Session) -> Result<AdminStats, AppError> {
        session.require_admin()?;

        let (roles, cars, bookings, pending_applications) = tokio::try_join!(
            self.users.count_by_role(),
            self.cars.count_by_status(),
            self.bookings.count_by_status(),
            self.applications.count_pending()
        )?;

        let mut stats = AdminStats {
            pending_applications,
            ..AdminStats::default()
        };

        for (role, count) in roles {
            match role {
                Role::Customer => stats.customers = count,
                Role::Owner => stats.owners = count,
                Role::Admin => stats.admins = count,
            }
        }
        for (status, count) in cars {
            stats.cars += count;
            if status == CarStatus::Available {
                stats.available_cars = count;
            }
        }
        for (status, count) in bookings {
            match status {
                BookingStatus::Pending => stats.pending_bookings = count,
                BookingStatus::Confirmed => stats.confirmed_bookings = count,
                BookingStatus::Cancelled => stats.cancelled_bookings = count,
                BookingStatus::Completed => stats.completed_bookings = count,
            }
        }

        Ok(stats)
    }
}
