use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use car_rental_marketplace::{
    config::{DatabaseConfig, EnvironmentConfig},
    database::DatabaseConnection,
    routes::create_router,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug")),
        )
        .init();

    info!("🚗 Car Rental Marketplace API");
    info!("================================================");

    let config = EnvironmentConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;
    info!("⚙️ Entorno: {}", config.environment);
    if config.is_production() && config.cors_origins.is_empty() {
        warn!("⚠️ CORS_ORIGINS vacío en producción: se acepta cualquier origen");
    }

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new(&db_config).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {:#}", e);
            return Err(e);
        }
    };
    db_connection.run_migrations().await?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("📂 Archivos subidos en {}", config.upload_dir.display());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let server_url = config.server_url();

    let app_state = AppState::new(db_connection.pool().clone(), config);
    let app = create_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", server_url);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Estado del servicio");
    info!("🔐 Auth:");
    info!("   POST /api/auth/register | POST /api/auth/login");
    info!("   GET  /api/auth/session | GET /api/auth/me | POST /api/auth/refresh");
    info!("🚗 Cars:");
    info!("   GET  /api/cars | GET /api/cars/available?start=&end=");
    info!("   GET  /api/cars/mine | GET /api/cars/:id");
    info!("   POST /api/cars | PUT /api/cars/:id | DELETE /api/cars/:id");
    info!("   PATCH /api/cars/:id/status | POST /api/cars/:id/image");
    info!("📅 Bookings:");
    info!("   POST /api/bookings | GET /api/bookings");
    info!("   GET  /api/bookings/mine | GET /api/bookings/owner");
    info!("   GET  /api/bookings/:id | PATCH /api/bookings/:id/status");
    info!("📝 Applications:");
    info!("   POST /api/applications | GET /api/applications");
    info!("   GET  /api/applications/mine | PATCH /api/applications/:id/status");
    info!("👤 Users:");
    info!("   GET  /api/users | GET /api/users/:id | DELETE /api/users/:id");
    info!("   PUT  /api/users/me | POST /api/users/me/selfie");
    info!("   GET  /api/admin/stats");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
