//! Middleware de Rate Limiting
//!
//! Este módulo maneja la limitación de velocidad de requests
//! para prevenir abuso de los endpoints de autenticación.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::EnvironmentConfig;
use crate::utils::errors::AppError;

/// Estructura para almacenar información de rate limiting por IP
#[derive(Debug, Clone)]
struct RateLimitInfo {
    requests: u32,
    window_start: Instant,
}

/// Estado global del rate limiting
#[derive(Clone)]
pub struct RateLimitState {
    requests: Arc<RwLock<HashMap<String, RateLimitInfo>>>,
    max_requests: u32,
    window_duration: Duration,
    trust_proxy: bool,
}

impl RateLimitState {
    /// Crear nuevo estado de rate limiting
    pub fn new(config: &EnvironmentConfig) -> Self {
        Self::with_limits(config.rate_limit_requests, Duration::from_secs(config.rate_limit_window))
            .trusting_proxy(config.trust_proxy)
    }

    pub fn with_limits(max_requests: u32, window_duration: Duration) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            max_requests,
            window_duration,
            trust_proxy: false,
        }
    }

    /// Tomar la IP de `X-Forwarded-For` (solo detrás de un proxy propio)
    pub fn trusting_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    /// Verificar si una IP ha excedido el límite
    pub async fn check_rate_limit(&self, ip: &str) -> Result<(), RateLimitError> {
        let mut requests = self.requests.write().await;
        let now = Instant::now();

        // Limpiar entradas expiradas
        requests.retain(|_, info| now.duration_since(info.window_start) < self.window_duration);

        let info = requests.entry(ip.to_string()).or_insert(RateLimitInfo {
            requests: 0,
            window_start: now,
        });

        if info.requests >= self.max_requests {
            return Err(RateLimitError::LimitExceeded);
        }

        info.requests += 1;
        Ok(())
    }
}

/// Errores de rate limiting
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Rate limit exceeded")]
    LimitExceeded,
}

impl From<RateLimitError> for AppError {
    fn from(_: RateLimitError) -> Self {
        AppError::RateLimitExceeded
    }
}

/// IP del cliente.
///
/// Sin proxy de confianza se usa la dirección de la conexión y el header
/// `x-forwarded-for` se ignora.
fn client_ip(request: &Request, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| {
            request
                .headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(|ip| ip.trim().to_string())
                .filter(|ip| !ip.is_empty())
        })
        .flatten();

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware de rate limiting
pub async fn rate_limit_middleware(
    State(rate_limit_state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&request, rate_limit_state.trust_proxy);
    rate_limit_state.check_rate_limit(&ip).await.map_err(|e| {
        tracing::warn!("🚫 Rate limit excedido para {}", ip);
        AppError::from(e)
    })?;

    Ok(next.run(request).await)
}
