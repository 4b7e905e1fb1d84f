use anyhow::Context;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::state::AppState;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!("Starting Produksi API in {:?} mode", config.environment);

    // Development tolerates a database that comes up after the server
    let pool = if config.is_development() {
        DatabaseManager::connect_lazy(&config.database)
    } else {
        DatabaseManager::connect(&config.database).await
    }
    .context("failed to create database pool")?;

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    let app = crate::app(AppState::new(config, pool));

    tracing::info!("Produksi API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
