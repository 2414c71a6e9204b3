use anyhow::Context;
use std::path::Path;
use tracing::{info, warn};

use employee_monitoring_api::app::{router, AppState};
use employee_monitoring_api::auth::JwtService;
use employee_monitoring_api::config::config;
use employee_monitoring_api::database::AppDbContext;
use employee_monitoring_api::is_development;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    info!("Starting Employee Monitoring API in {:?} mode", config.environment);
    if is_development!() {
        warn!("Development mode: using the built-in JWT secret unless JWT_SECRET is set");
    }

    let jwt = JwtService::new(&config.jwt).context("invalid JWT settings (set JWT_SECRET to 32+ bytes)")?;
    let ctx = AppDbContext::connect(&config.database)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;

    let upload_dir = Path::new(&config.api.upload_dir);
    tokio::fs::create_dir_all(upload_dir)
        .await
        .with_context(|| format!("failed to create upload directory {}", upload_dir.display()))?;

    let state = AppState::new(ctx.clone(), jwt, config.clone());
    let app = router(state);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Employee Monitoring API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    ctx.close().await;
    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
