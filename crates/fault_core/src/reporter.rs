//! Injector lifecycle reporting
//!
//! Leaf injectors tell a [`Reporter`] when they start and finish their work.
//! Events are delivered with [`dispatch`]. A reporter that blocks runs off the
//! request task, and a reporter that panics is contained, so neither can
//! delay or fail the request. Blocking reporters may see events out of order.

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use tokio::{runtime::Handle, sync::mpsc};
use tracing::{debug, info, warn};

/// Lifecycle state of an injector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectorState {
    /// The injector is about to do its work
    Started,
    /// The injector has finished its work
    Finished,
}

impl InjectorState {
    /// Stable label for logs and metrics
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for InjectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives injector lifecycle events
pub trait Reporter: Send + Sync + fmt::Debug {
    /// Called with the injector name and its new state
    fn report(&self, name: &str, state: InjectorState);

    /// Whether `report` is cheap and never blocks, so [`dispatch`] may call it
    /// on the request task instead of the blocking pool.
    fn is_nonblocking(&self) -> bool {
        false
    }
}

/// Shared reporter handle used by injectors
pub type SharedReporter = Arc<dyn Reporter>;

/// Deliver an event without blocking the caller.
///
/// Reporters that are not [`Reporter::is_nonblocking`] run on the blocking
/// pool when a tokio runtime is available. Everything else runs inline.
/// Panics are caught and logged either way.
pub fn dispatch(reporter: &SharedReporter, name: &'static str, state: InjectorState) {
    if reporter.is_nonblocking() {
        return deliver(reporter.as_ref(), name, state);
    }

    let reporter = Arc::clone(reporter);
    match Handle::try_current() {
        Ok(handle) => {
            handle.spawn_blocking(move || deliver(reporter.as_ref(), name, state));
        },
        Err(_) => deliver(reporter.as_ref(), name, state),
    }
}

fn deliver(reporter: &dyn Reporter, name: &str, state: InjectorState) {
    let result = panic::catch_unwind(AssertUnwindSafe(|| reporter.report(name, state)));
    if result.is_err() {
        warn!(injector = name, state = %state, "Injector reporter panicked");
    }
}

/// Reporter that discards all events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl NoopReporter {
    /// Shared no-op reporter, the default for every injector
    pub fn shared() -> SharedReporter {
        Arc::new(Self)
    }
}

impl Reporter for NoopReporter {
    fn report(&self, _name: &str, _state: InjectorState) {}

    fn is_nonblocking(&self) -> bool {
        true
    }
}

/// Reporter that logs events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, name: &str, state: InjectorState) {
        match state {
            InjectorState::Started => info!(injector = name, state = %state, "Fault injector started"),
            InjectorState::Finished => debug!(injector = name, state = %state, "Fault injector finished"),
        }
    }

    fn is_nonblocking(&self) -> bool {
        true
    }
}

/// Reporter that counts events with the `metrics` facade
///
/// Emits `faultline_injector_events_total{injector, state}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsReporter;

impl MetricsReporter {
    /// Counter name
    pub const COUNTER: &'static str = "faultline_injector_events_total";
}

impl Reporter for MetricsReporter {
    fn report(&self, name: &str, state: InjectorState) {
        metrics::counter!(Self::COUNTER, "injector" => name.to_owned(), "state" => state.as_str())
            .increment(1);
    }

    fn is_nonblocking(&self) -> bool {
        true
    }
}

/// A single reported event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEvent {
    /// Injector name
    pub name: String,
    /// Reported state
    pub state: InjectorState,
}

/// Reporter that forwards events into a bounded channel.
///
/// Events are dropped when the channel is full or closed.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    sender: mpsc::Sender<ReportEvent>,
}

impl ChannelReporter {
    /// Create a reporter and the receiving end of its channel
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ReportEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

impl Reporter for ChannelReporter {
    fn report(&self, name: &str, state: InjectorState) {
        let event = ReportEvent {
            name: name.to_owned(),
            state,
        };
        if self.sender.try_send(event).is_err() {
            debug!(injector = name, state = %state, "Dropped injector report");
        }
    }

    fn is_nonblocking(&self) -> bool {
        true
    }
}
