//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::middleware::rate_limit::RateLimitState;
use crate::services::upload_service::UploadStore;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
    pub uploads: UploadStore,
    pub rate_limit: RateLimitState,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self {
            jwt: JwtConfig::from(&config),
            uploads: UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes),
            rate_limit: RateLimitState::new(&config),
            pool,
            config,
        }
    }
}
