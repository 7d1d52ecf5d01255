//! Loanflow API Server
//!
//! Main entry point for the Loanflow backend service.

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use loanflow_api::{AppState, create_router};
use loanflow_db::connect_with;
use loanflow_shared::config::LogConfig;
use loanflow_shared::{AppConfig, JwtConfig, JwtService};

/// Installs the global subscriber; `RUST_LOG` wins over the configured level.
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let registry = tracing_subscriber::registry().with(filter);

    if log.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log);

    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let jwt_service = JwtService::new(JwtConfig::from(&config.jwt));
    let store_timeout = Duration::from_millis(config.loans.store_timeout_ms);
    let state = AppState::with_database(&db, jwt_service, store_timeout);

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, store_timeout_ms = config.loans.store_timeout_ms, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
