//! Middleware de CORS
//!
//! Este módulo maneja la configuración de CORS para permitir
//! requests desde el cliente web.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::CorsLayer;

/// CORS según la configuración: sin orígenes configurados se permite
/// cualquier origen (solo para desarrollo)
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::very_permissive();
    }
    cors_middleware_with_origins(origins)
}

/// Crear middleware de CORS con orígenes específicos
pub fn cors_middleware_with_origins(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            HeaderName::from_static("authorization"),
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
