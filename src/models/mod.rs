//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL de `migrations/`.

pub mod application;
pub mod booking;
pub mod car;
pub mod role;
pub mod user;
