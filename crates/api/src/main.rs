//! Optimizer API - scoring service for the Azure cost dashboard

use anyhow::Result;
use optimizer_api::{serve, AppState, ServiceConfig};
use optimizer_lib::observability::{OptimizerMetrics, StructuredLogger};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs, filtered by RUST_LOG
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting optimizer-api");

    let config = ServiceConfig::load()?;
    info!(
        port = config.api_port,
        cpu_threshold = config.cpu_threshold,
        lookback_days = config.lookback_days,
        "Service configured"
    );

    let metrics = OptimizerMetrics::new();
    let logger = StructuredLogger::new(&config.service_name);
    logger.log_startup(SERVICE_VERSION, config.api_port);

    let app_state = Arc::new(AppState::new(metrics, logger.clone(), config.thresholds()));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
        }
    };
    serve(config.api_port, app_state, shutdown).await?;

    logger.log_shutdown("SIGINT received");
    info!("Shutting down");

    Ok(())
}
