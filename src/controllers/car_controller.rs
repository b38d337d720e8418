use axum::extract::Multipart;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::car_dto::{
    AvailabilityQuery, CarFilters, CarResponse, CreateCarRequest, UpdateCarRequest,
    UpdateCarStatusRequest,
};
use crate::middleware::auth::Session;
use crate::models::car::{Car, CarStatus};
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::car_repository::CarRepository;
use crate::services::availability::{filter_available, parse_requested_range};
use crate::services::upload_service::{UploadKind, UploadStore};
use crate::utils::errors::{forbidden_error, not_found_error, AppError};
use crate::utils::pagination::Paginated;
use crate::utils::validation::normalize_plate_number;

pub struct CarController {
    repository: CarRepository,
    bookings: BookingRepository,
}

impl CarController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CarRepository::new(pool.clone()),
            bookings: BookingRepository::new(pool),
        }
    }

    pub async fn list(&self, filters: CarFilters) -> Result<Paginated<CarResponse>, AppError> {
        let (cars, total) = self.repository.list(&filters).await?;
        Ok(Paginated::new(cars, total, &filters.page_params()).map(CarResponse::from))
    }

    /// Autos disponibles, opcionalmente para un rango de fechas
    pub async fn available(&self, query: AvailabilityQuery) -> Result<Vec<CarResponse>, AppError> {
        let requested = parse_requested_range(query.start.as_deref(), query.end.as_deref())?;

        let (cars, bookings) = tokio::try_join!(
            self.repository.list_by_status(CarStatus::Available),
            self.bookings.list_blocking()
        )?;

        let total = cars.len();
        let available = filter_available(cars, &bookings, requested.as_ref());
        debug!(
            "🚗 Disponibilidad: {} de {} autos libres ({} reservas bloqueantes)",
            available.len(),
            total,
            bookings.len()
        );

        Ok(available.into_iter().map(CarResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<CarResponse, AppError> {
        let car = self.find(id).await?;
        Ok(CarResponse::from(car))
    }

    pub async fn list_mine(&self, session: &Session) -> Result<Vec<CarResponse>, AppError> {
        session.require_fleet_manager()?;
        let cars = self.repository.list_by_owner(session.user_id()).await?;
        Ok(cars.into_iter().map(CarResponse::from).collect())
    }

    pub async fn create(
        &self,
        session: &Session,
        request: CreateCarRequest,
    ) -> Result<ApiResponse<CarResponse>, AppError> {
        session.require_fleet_manager()?;
        request.validate()?;

        let plate_number = normalize_plate_number(&request.car_details.plate_number);
        if self.repository.plate_exists(&plate_number, None).await? {
            return Err(AppError::Conflict("La matrícula ya está registrada".to_string()));
        }

        let now = Utc::now();
        let car = Car {
            id: Uuid::new_v4(),
            owner_id: session.user_id(),
            name: request.name.trim().to_string(),
            price: request.price,
            seats: request.car_details.seats,
            transmission: request.car_details.transmission,
            fuel_type: request.car_details.fuel_type,
            plate_number,
            rating: 0.0,
            image: None,
            status: request.status.unwrap_or(CarStatus::Available),
            created_at: now,
            updated_at: now,
        };
        let car = self.repository.create(&car).await?;

        info!("🚗 Auto creado: {} ({}) por {}", car.name, car.plate_number, session.email());
        Ok(ApiResponse::success_with_message(
            CarResponse::from(car),
            "Auto creado exitosamente",
        ))
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        request: UpdateCarRequest,
    ) -> Result<ApiResponse<CarResponse>, AppError> {
        request.validate()?;
        let mut car = self.find_managed(session, id).await?;

        if let Some(name) = request.name {
            car.name = name.trim().to_string();
        }
        if let Some(price) = request.price {
            car.price = price;
        }
        if let Some(rating) = request.rating {
            car.rating = rating;
        }
        if let Some(status) = request.status {
            car.status = status;
        }
        if let Some(details) = request.car_details {
            if let Some(seats) = details.seats {
                car.seats = seats;
            }
            if let Some(transmission) = details.transmission {
                car.transmission = transmission;
            }
            if let Some(fuel_type) = details.fuel_type {
                car.fuel_type = fuel_type;
            }
            if let Some(plate_number) = details.plate_number {
                let plate_number = normalize_plate_number(&plate_number);
                if self.repository.plate_exists(&plate_number, Some(car.id)).await? {
                    return Err(AppError::Conflict("La matrícula ya está registrada".to_string()));
                }
                car.plate_number = plate_number;
            }
        }

        let car = self.repository.update(&car).await?.ok_or_else(|| {
            AppError::Conflict("El auto fue modificado por otra petición; vuelve a cargarlo".to_string())
        })?;
        Ok(ApiResponse::success_with_message(
            CarResponse::from(car),
            "Auto actualizado exitosamente",
        ))
    }

    pub async fn update_status(
        &self,
        session: &Session,
        id: Uuid,
        request: UpdateCarStatusRequest,
    ) -> Result<ApiResponse<CarResponse>, AppError> {
        let car = self.find_managed(session, id).await?;
        let car = self.repository.update_status(car.id, request.status).await?;

        info!("🚦 Auto {} ahora {:?}", car.id, car.status);
        Ok(ApiResponse::success(CarResponse::from(car)))
    }

    pub async fn upload_image(
        &self,
        session: &Session,
        id: Uuid,
        uploads: &UploadStore,
        mut multipart: Multipart,
    ) -> Result<ApiResponse<CarResponse>, AppError> {
        let car = self.find_managed(session, id).await?;

        let url = uploads
            .store_from_multipart(UploadKind::CarPhoto, &mut multipart, "image")
            .await?;
        let updated = match self.repository.update_image(car.id, &url).await {
            Ok(updated) => updated,
            Err(e) => {
                uploads.remove(&url).await;
                return Err(e);
            }
        };

        if let Some(previous) = car.image {
            uploads.remove(&previous).await;
        }

        Ok(ApiResponse::success_with_message(
            CarResponse::from(updated),
            "Imagen actualizada",
        ))
    }

    pub async fn delete(&self, session: &Session, id: Uuid, uploads: &UploadStore) -> Result<(), AppError> {
        let car = self.find_managed(session, id).await?;

        if self.bookings.has_unfinished_blocking(car.id).await? {
            return Err(AppError::Conflict(
                "El auto tiene reservas activas y no puede eliminarse".to_string(),
            ));
        }

        self.repository.delete(car.id).await?;
        if let Some(image) = &car.image {
            uploads.remove(image).await;
        }

        info!("🗑️ Auto eliminado: {} por {}", car.id, session.email());
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Car, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Car", &id.to_string()))
    }

    /// Auto que la sesión puede gestionar: su dueño o un administrador
    async fn find_managed(&self, session: &Session, id: Uuid) -> Result<Car, AppError> {
        session.require_fleet_manager()?;
        let car = self.find(id).await?;

        if !session.owns_or_admin(car.owner_id) {
            return Err(forbidden_error("manage car", "el auto pertenece a otro propietario"));
        }
        Ok(car)
    }
}
