//! DTOs de la API
//!
//! Requests y responses serializados en camelCase.

pub mod api_response;
pub mod application_dto;
pub mod auth_dto;
pub mod booking_dto;
pub mod car_dto;
pub mod user_dto;
