//! Application state shared across handlers

use metrics_exporter_prometheus::PrometheusHandle;

use crate::stack::FaultStack;

/// Shared application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Faults in front of the sample routes
    pub faults: FaultStack,
    /// Prometheus handle, present when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub const fn new(faults: FaultStack, metrics: Option<PrometheusHandle>) -> Self {
        Self { faults, metrics }
    }
}
