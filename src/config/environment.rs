//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! `DATABASE_URL` y `JWT_SECRET` son obligatorias; el resto tiene valores
//! por defecto pensados para desarrollo.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
    /// Detrás de un proxy de confianza se usa `X-Forwarded-For` para la IP del cliente
    pub trust_proxy: bool,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl EnvironmentConfig {
    /// Leer la configuración desde las variables de entorno
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: parse_var("PORT", 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiration: parse_var("JWT_EXPIRATION", 86_400)?,
            bcrypt_cost: parse_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            rate_limit_requests: parse_var("RATE_LIMIT_REQUESTS", 20)?,
            rate_limit_window: parse_var("RATE_LIMIT_WINDOW", 60)?,
            trust_proxy: parse_var("TRUST_PROXY", false)?,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./uploads")),
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?,
        })
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value", name)),
        Err(_) => Ok(default),
    }
}
