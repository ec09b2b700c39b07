//! Logging and metrics setup

use std::sync::Arc;

use fault_core::{MetricsReporter, NoopReporter, SharedReporter, TracingReporter};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, ReporterKind};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_tracing(default_filter: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?,
    }

    Ok(())
}

/// Install the Prometheus recorder as the global `metrics` recorder
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Reporter handed to every leaf injector
pub fn reporter(kind: ReporterKind) -> SharedReporter {
    match kind {
        ReporterKind::None => NoopReporter::shared(),
        ReporterKind::Tracing => Arc::new(TracingReporter),
        ReporterKind::Metrics => Arc::new(MetricsReporter),
    }
}
