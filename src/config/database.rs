//! Configuración de base de datos
//!
//! Este módulo maneja la conexión y configuración de PostgreSQL con SQLx.

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Configuración de la base de datos
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    /// Leer la configuración del pool desde el entorno
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set in environment variables")?;
        Ok(Self::new(url)
            .with_max_connections(env_u32("DB_MAX_CONNECTIONS", 20)?)
            .with_min_connections(env_u32("DB_MIN_CONNECTIONS", 2)?))
    }

    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 20,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
    }

    /// Crear un nuevo pool de conexiones
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        self.pool_options().connect(&self.url).await
    }

    /// Crear un pool que no conecta hasta la primera consulta
    pub fn create_lazy_pool(&self) -> Result<PgPool, sqlx::Error> {
        self.pool_options().connect_lazy(&self.url)
    }
}

fn env_u32(name: &str, default: u32) -> Result<u32> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}
