use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::booking::{Booking, BookingStatus};
use crate::utils::pagination::PageParams;

// Request para crear una reserva. Las fechas aceptan YYYY-MM-DD o RFC3339.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub car_id: Uuid,

    #[validate(length(min = 10, max = 40))]
    pub pickup_date: String,

    #[validate(length(min = 10, max = 40))]
    pub return_date: String,
}

// Request para cambiar el estado de una reserva
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

// Response de reserva
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub car_id: Uuid,
    pub customer_id: Uuid,
    pub pickup_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            car_id: booking.car_id,
            customer_id: booking.customer_id,
            pickup_date: booking.pickup_date,
            return_date: booking.return_date,
            total_price: booking.total_price,
            status: booking.status,
            created_at: booking.created_at,
        }
    }
}

/// Filtros para listados de reservas
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilters {
    pub status: Option<BookingStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl BookingFilters {
    pub fn page_params(&self) -> PageParams {
        PageParams::new(self.page, self.limit)
    }
}
