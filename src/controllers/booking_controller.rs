use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::booking_dto::{
    BookingFilters, BookingResponse, CreateBookingRequest, UpdateBookingStatusRequest,
};
use crate::middleware::auth::Session;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::car::CarStatus;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::car_repository::CarRepository;
use crate::repositories::user_repository::UserRepository;
use crate::services::availability::{is_car_available, DateRange};
use crate::utils::errors::{forbidden_error, not_found_error, validation_error, AppError, AppResult};
use crate::utils::pagination::Paginated;
use crate::utils::validation::parse_calendar_instant;

pub struct BookingController {
    pool: PgPool,
    repository: BookingRepository,
    cars: CarRepository,
    users: UserRepository,
}

/// Quién puede llevar una reserva de `current` a `next`.
///
/// El cliente solo puede cancelar; el dueño del auto (o un administrador)
/// puede además confirmarla y completarla.
pub fn authorize_transition(
    current: BookingStatus,
    next: BookingStatus,
    is_customer: bool,
    manages_car: bool,
) -> AppResult<()> {
    let allowed = match next {
        BookingStatus::Cancelled => is_customer || manages_car,
        _ => manages_car,
    };
    if !allowed {
        return Err(forbidden_error(
            "update booking",
            "solo el propietario del auto o un administrador puede hacerlo",
        ));
    }

    if !current.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "No se puede pasar de {:?} a {:?}",
            current, next
        )));
    }
    Ok(())
}

impl BookingController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BookingRepository::new(pool.clone()),
            cars: CarRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Crear una reserva pendiente.
    ///
    /// La fila del auto queda bloqueada durante la transacción, así dos
    /// reservas simultáneas sobre el mismo auto se comprueban una tras otra.
    pub async fn create(
        &self,
        session: &Session,
        request: CreateBookingRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        request.validate()?;

        let pickup = parse_calendar_instant(&request.pickup_date)
            .map_err(|_| validation_error("pickupDate", "Fecha de recogida inválida"))?;
        let return_at = parse_calendar_instant(&request.return_date)
            .map_err(|_| validation_error("returnDate", "Fecha de devolución inválida"))?;
        let range = DateRange::whole_days(pickup, return_at)?;
        range.ensure_bookable(Utc::now().date_naive())?;

        let mut tx = self.pool.begin().await?;

        // El token puede sobrevivir a la cuenta
        if !self.users.exists_in_tx(&mut tx, session.user_id()).await? {
            return Err(AppError::Unauthorized("La cuenta ya no existe".to_string()));
        }

        let car = self
            .cars
            .find_by_id_for_update(&mut tx, request.car_id)
            .await?
            .ok_or_else(|| not_found_error("Car", &request.car_id.to_string()))?;

        if car.status != CarStatus::Available {
            return Err(AppError::Conflict("El auto no está disponible".to_string()));
        }
        if car.is_owned_by(session.user_id()) {
            return Err(forbidden_error("book car", "no puedes reservar tu propio auto"));
        }

        let existing = self.repository.list_blocking_for_car(&mut tx, car.id).await?;
        if !is_car_available(car.id, &existing, &range) {
            warn!("📅 Reserva rechazada: {} ya ocupado en esas fechas", car.id);
            return Err(AppError::Conflict(
                "El auto ya está reservado en esas fechas".to_string(),
            ));
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            car_id: car.id,
            customer_id: session.user_id(),
            pickup_date: range.start(),
            return_date: range.end(),
            total_price: car.price * Decimal::from(range.rental_days()),
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        let booking = self.repository.create(&mut tx, &booking).await?;
        tx.commit().await?;

        info!(
            "📅 Reserva creada: {} para auto {} ({} días)",
            booking.id,
            booking.car_id,
            range.rental_days()
        );
        Ok(ApiResponse::success_with_message(
            BookingResponse::from(booking),
            "Reserva creada exitosamente",
        ))
    }

    pub async fn list(
        &self,
        session: &Session,
        filters: BookingFilters,
    ) -> Result<Paginated<BookingResponse>, AppError> {
        session.require_admin()?;
        let (bookings, total) = self.repository.list(&filters).await?;
        Ok(Paginated::new(bookings, total, &filters.page_params()).map(BookingResponse::from))
    }

    pub async fn list_mine(&self, session: &Session) -> Result<Vec<BookingResponse>, AppError> {
        let bookings = self.repository.list_by_customer(session.user_id()).await?;
        Ok(bookings.into_iter().map(BookingResponse::from).collect())
    }

    pub async fn list_for_owner(&self, session: &Session) -> Result<Vec<BookingResponse>, AppError> {
        session.require_fleet_manager()?;
        let bookings = self.repository.list_by_owner(session.user_id()).await?;
        Ok(bookings.into_iter().map(BookingResponse::from).collect())
    }

    pub async fn get_by_id(&self, session: &Session, id: Uuid) -> Result<BookingResponse, AppError> {
        let booking = self.find(id).await?;

        if booking.customer_id != session.user_id() && !self.manages_car_of(session, &booking).await? {
            return Err(forbidden_error("access booking", "la reserva no es tuya"));
        }
        Ok(BookingResponse::from(booking))
    }

    pub async fn update_status(
        &self,
        session: &Session,
        id: Uuid,
        request: UpdateBookingStatusRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let booking = self.find(id).await?;
        let next = request.status;

        let manages_car = self.manages_car_of(session, &booking).await?;
        let is_customer = booking.customer_id == session.user_id();
        authorize_transition(booking.status, next, is_customer, manages_car)?;

        let booking = self
            .repository
            .update_status(booking.id, booking.status, next)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("La reserva cambió de estado mientras se actualizaba".to_string())
            })?;
        info!("📅 Reserva {} ahora {:?} ({})", booking.id, booking.status, session.email());

        Ok(ApiResponse::success(BookingResponse::from(booking)))
    }

    async fn find(&self, id: Uuid) -> Result<Booking, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &id.to_string()))
    }

    /// Administrador o dueño del auto reservado
    async fn manages_car_of(&self, session: &Session, booking: &Booking) -> Result<bool, AppError> {
        if session.is_admin() {
            return Ok(true);
        }
        let owner_id = self.cars.find_by_id(booking.car_id).await?.map(|car| car.owner_id);
        Ok(owner_id == Some(session.user_id()))
    }
}
