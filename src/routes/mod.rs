pub mod application_routes;
pub mod auth_routes;
pub mod booking_routes;
pub mod car_routes;
pub mod user_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use crate::middleware::cors::cors_layer;
use crate::services::upload_service::PUBLIC_PREFIX;
use crate::state::AppState;

/// Router completo de la aplicación
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes::create_auth_router(&state))
        .nest("/cars", car_routes::create_car_router(&state))
        .nest("/bookings", booking_routes::create_booking_router())
        .nest("/applications", application_routes::create_application_router(&state))
        .nest("/users", user_routes::create_user_router(&state))
        .nest("/admin", user_routes::create_admin_router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .nest_service(PUBLIC_PREFIX, ServeDir::new(state.uploads.root()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
