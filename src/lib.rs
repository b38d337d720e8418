//! Marketplace de alquiler de autos
//!
//! API REST: autenticación, flota de autos, reservas con comprobación de
//! disponibilidad y solicitudes para convertirse en propietario.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
