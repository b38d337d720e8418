use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::dto::booking_dto::BookingFilters;
use crate::models::booking::{Booking, BookingStatus};
use crate::utils::errors::AppError;

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insertar dentro de la transacción que tiene bloqueado el auto
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: &Booking,
    ) -> Result<Booking, AppError> {
        let created = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, car_id, customer_id, pickup_date, return_date,
                total_price, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(booking.car_id)
        .bind(booking.customer_id)
        .bind(booking.pickup_date)
        .bind(booking.return_date)
        .bind(booking.total_price)
        .bind(booking.status)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .fetch_one(&mut **tx)
        .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    /// Todas las reservas que ocupan fechas (`BookingStatus::BLOCKING`)
    pub async fn list_blocking(&self) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE status = ANY($1) ORDER BY pickup_date",
        )
        .bind(BookingStatus::BLOCKING.to_vec())
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    pub async fn list_blocking_for_car(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        car_id: Uuid,
    ) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE car_id = $1 AND status = ANY($2) ORDER BY pickup_date",
        )
        .bind(car_id)
        .bind(BookingStatus::BLOCKING.to_vec())
        .fetch_all(&mut **tx)
        .await?;

        Ok(bookings)
    }

    /// Reservas pendientes o confirmadas que todavía no terminaron
    pub async fn has_unfinished_blocking(&self, car_id: Uuid) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM bookings
                WHERE car_id = $1
                  AND status IN ('pending', 'confirmed')
                  AND return_date >= date_trunc('day', NOW())
            )
            "#,
        )
        .bind(car_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn list(&self, filters: &BookingFilters) -> Result<(Vec<Booking>, i64), AppError> {
        let params = filters.page_params();

        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE ($1::booking_status IS NULL OR status = $1)
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
            "SELECT COUNT(*) FROM bookings WHERE ($1::booking_status IS NULL OR status = $1)",
        )
        .bind(filters.status)
        .fetch_one(&self.pool)
        .await?;

        Ok((bookings, total.0))
    }

    pub async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE customer_id = $1 ORDER BY pickup_date DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Reservas de los autos de un propietario
    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT b.* FROM bookings b
            INNER JOIN cars c ON c.id = b.car_id
            WHERE c.owner_id = $1
            ORDER BY b.pickup_date DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Cambiar el estado solo si la reserva sigue en `from`.
    ///
    /// `None` si la reserva no existe o alguien cambió su estado antes.
    pub async fn update_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    pub async fn count_by_status(&self) -> Result<Vec<(BookingStatus, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (BookingStatus, i64)>(
            "SELECT status, COUNT(*) FROM bookings GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
