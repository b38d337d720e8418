use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::car::{Car, CarStatus};
use crate::utils::pagination::PageParams;
use crate::utils::validation::{validate_not_empty, validate_plate_number, validate_price};

// Detalles técnicos al crear un auto
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CarDetailsInput {
    #[validate(range(min = 1, max = 9))]
    pub seats: i32,

    #[validate(length(min = 2, max = 20))]
    pub transmission: String,

    #[validate(length(min = 2, max = 20))]
    pub fuel_type: String,

    #[validate(custom = "validate_plate_number")]
    pub plate_number: String,
}

// Request para crear un auto
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCarRequest {
    #[validate(length(min = 2, max = 100), custom = "validate_not_empty")]
    pub name: String,

    #[validate(custom = "validate_price")]
    pub price: Decimal,

    #[validate]
    pub car_details: CarDetailsInput,

    pub status: Option<CarStatus>,
}

// Detalles técnicos al actualizar un auto
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCarDetails {
    #[validate(range(min = 1, max = 9))]
    pub seats: Option<i32>,

    #[validate(length(min = 2, max = 20))]
    pub transmission: Option<String>,

    #[validate(length(min = 2, max = 20))]
    pub fuel_type: Option<String>,

    #[validate(custom = "validate_plate_number")]
    pub plate_number: Option<String>,
}

// Request para actualizar un auto
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCarRequest {
    #[validate(length(min = 2, max = 100), custom = "validate_not_empty")]
    pub name: Option<String>,

    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,

    #[validate]
    pub car_details: Option<UpdateCarDetails>,

    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,

    pub status: Option<CarStatus>,
}

// Request para cambiar el estado de un auto
#[derive(Debug, Deserialize)]
pub struct UpdateCarStatusRequest {
    pub status: CarStatus,
}

// Detalles técnicos en la respuesta
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarDetails {
    pub seats: i32,
    pub transmission: String,
    pub fuel_type: String,
    pub plate_number: String,
}

// Response de auto
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub car_details: CarDetails,
    pub rating: f64,
    pub image: Option<String>,
    pub status: CarStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Car> for CarResponse {
    fn from(car: Car) -> Self {
        Self {
            id: car.id,
            owner_id: car.owner_id,
            name: car.name,
            price: car.price,
            car_details: CarDetails {
                seats: car.seats,
                transmission: car.transmission,
                fuel_type: car.fuel_type,
                plate_number: car.plate_number,
            },
            rating: car.rating,
            image: car.image,
            status: car.status,
            created_at: car.created_at,
        }
    }
}

/// Filtros para búsqueda de autos
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarFilters {
    pub status: Option<CarStatus>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_seats: Option<i32>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl CarFilters {
    pub fn page_params(&self) -> PageParams {
        PageParams::new(self.page, self.limit)
    }
}

/// Rango de fechas solicitado para la disponibilidad
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}
