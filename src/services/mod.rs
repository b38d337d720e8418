//! Servicios de dominio
//!
//! Lógica sin acceso a base de datos: disponibilidad de autos y
//! almacenamiento de archivos subidos.

pub mod availability;
pub mod upload_service;
