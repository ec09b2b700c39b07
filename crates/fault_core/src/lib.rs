//! Fault injection for HTTP services
//!
//! `fault_core` wraps request handlers with deliberately faulty behavior:
//! error responses, added latency, dropped connections, and compositions of
//! those. A [`Fault`] decides per request whether its [`Injector`] runs, based
//! on a master switch, a participation rate, and path/header policy.
//!
//! ```no_run
//! use axum::{Router, routing::get};
//! use fault_core::{ErrorInjector, Fault, FaultLayer};
//! use tower::Layer;
//!
//! # fn main() -> Result<(), fault_core::FaultError> {
//! let fault = Fault::builder()
//!     .injector(ErrorInjector::new(503)?)
//!     .enabled(true)
//!     .participation(0.25)
//!     .path_blocklist(["/health"])
//!     .build()?;
//!
//! let app = Router::new().route("/", get(|| async { "ok" }));
//! let service = FaultLayer::new(fault).layer(app);
//! # let _ = service;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fault;
pub mod handler;
pub mod injector;
pub mod layer;
pub mod random;
pub mod reporter;
pub mod trail;

#[cfg(test)]
mod test_support;

pub use config::{FaultConfig, InjectorConfig};
pub use error::FaultError;
pub use fault::{DEFAULT_FAULT_NAME, Fault, FaultBuilder};
pub use handler::{Aborted, Handler, HandlerFuture};
pub use injector::{
    ChainInjector, ErrorInjector, Injector, RandomInjector, RejectInjector, SlowInjector,
};
pub use layer::FaultLayer;
pub use random::{DEFAULT_SEED, RandomSource};
pub use reporter::{
    ChannelReporter, InjectorState, MetricsReporter, NoopReporter, ReportEvent, Reporter,
    SharedReporter, TracingReporter,
};
pub use trail::{FaultTrail, TrailEntry};
