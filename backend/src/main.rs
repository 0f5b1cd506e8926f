//! Main entry point for the template backend.
//!
//! This file loads configuration, installs logging, sets up the database
//! pool and serves the Axum router until a shutdown signal arrives.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod logging;
mod middleware;
mod repositories;
mod services;
mod utils;

use std::sync::Arc;

use anyhow::{Context, Result};
use config::Config;
use database::Database;
use tracing::info;
use utils::jwt::JwtUtils;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    logging::init(&config.log)?;

    let db = Database::new(&config).await?;
    db.migrate().await?;

    let jwt_utils = Arc::new(JwtUtils::new(&config.jwt)?);
    let app = api::router(db.pool().clone(), jwt_utils, config.server_debug);

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("binding {}", bind_address))?;

    info!("Starting server on port {}", config.server_port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    info!("Shutting down server...");
    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
