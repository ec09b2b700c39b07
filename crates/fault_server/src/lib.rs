//! faultline HTTP server
//!
//! Serves sample routes behind a configurable stack of faults, with an admin
//! API for changing faults while the server runs.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod stack;
pub mod state;
pub mod telemetry;

pub use config::{AppConfig, LogFormat, ReporterKind, ServerConfig};
pub use error::{ApiError, StackError};
pub use routes::{ADMIN_PREFIX, create_app};
pub use server::{serve, shutdown_signal};
pub use stack::FaultStack;
pub use state::AppState;

use metrics_exporter_prometheus::PrometheusHandle;

/// Build the fault stack described by `config` and wrap it in app state
pub fn build_state(
    config: &AppConfig,
    metrics: Option<PrometheusHandle>,
) -> Result<AppState, StackError> {
    let reporter = telemetry::reporter(config.reporter);
    let faults = FaultStack::from_configs(&config.faults, &reporter)?;
    Ok(AppState::new(faults, metrics))
}
