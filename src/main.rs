//! Traffic Volume Predictor - Main Entry Point
//!
//! Loads the reference dataset and model artifact once, then serves the
//! prediction form over HTTP.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use traffic_volume_predictor::{
    config::{AppConfig, LoggingConfig, DEFAULT_CONFIG_PATH},
    web::{create_router, AppState},
};

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(format!(
            "traffic_volume_predictor={},tower_http={}",
            logging.level, logging.level
        ))
    })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load_from_path(&config_path)?;

    init_tracing(&config.logging)?;
    info!("Starting Traffic Volume Predictor");
    info!(path = %config_path, "Configuration loaded successfully");

    // Model and schema are loaded once and shared read-only by every request
    let state = Arc::new(AppState::build(config)?);
    info!(
        encoded_features = state.engine.encoder().feature_count(),
        default_alpha = state.config.prediction.default_alpha,
        "Predictor ready"
    );

    let addr = state.config.bind_address();
    let app = create_router(state);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    Ok(())
}
