//! Modelo de Car
//!
//! Este módulo contiene el struct Car tal como se guarda en la tabla cars.
//! Los detalles técnicos (`car_details` en la API) se guardan en columnas planas.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado del auto - mapea al ENUM car_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "car_status", rename_all = "lowercase")]
pub enum CarStatus {
    Available,
    Unavailable,
}

/// Car principal - mapea exactamente a la tabla cars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Car {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub seats: i32,
    pub transmission: String,
    pub fuel_type: String,
    pub plate_number: String,
    pub rating: f64,
    pub image: Option<String>,
    pub status: CarStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Car {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}
