//! faultline server
//!
//! Main entry point for the fault injection demo server.

use std::time::Duration;

use anyhow::Context;
use fault_server::{AppConfig, build_state, create_app, serve, shutdown_signal, telemetry};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    telemetry::init_tracing(&config.log_filter, config.server.log_format)?;
    info!("faultline v{} starting", env!("CARGO_PKG_VERSION"));

    let metrics = if config.metrics_enabled {
        Some(telemetry::init_metrics().context("Failed to install metrics recorder")?)
    } else {
        None
    };

    let state = build_state(&config, metrics).context("Invalid fault configuration")?;
    info!(
        faults = state.faults.len(),
        reporter = ?config.reporter,
        metrics = config.metrics_enabled,
        "Configuration loaded"
    );

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", listener.local_addr()?);

    let app = create_app(state);
    serve(
        listener,
        app,
        shutdown_signal(),
        Duration::from_secs(config.server.shutdown_timeout_secs),
    )
    .await?;

    info!("Server shutdown complete");
    Ok(())
}
