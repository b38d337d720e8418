//! Modelo de Booking
//!
//! Una reserva referencia un auto y un cliente. El ciclo de vida es
//! `Pending -> Confirmed -> Completed`, con `Cancelled` alcanzable desde
//! `Pending` y `Confirmed`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgHasArrayType, PgTypeInfo};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la reserva - mapea al ENUM booking_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Estados que ocupan el auto durante sus fechas
    pub const BLOCKING: [BookingStatus; 3] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Completed,
    ];

    /// Una reserva cancelada libera las fechas
    pub fn blocks_availability(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled) | (Confirmed, Completed)
        )
    }
}

// Permite enviar `BLOCKING` como `booking_status[]`
impl PgHasArrayType for BookingStatus {
    fn array_type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("_booking_status")
    }
}

/// Booking principal - mapea exactamente a la tabla bookings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub car_id: Uuid,
    pub customer_id: Uuid,
    pub pickup_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
