//! Fault injectors
//!
//! An [`Injector`] wraps a downstream [`Handler`] with alternate behavior.
//! Leaf variants produce the fault (error, delay, dropped connection); the
//! composite variants ([`ChainInjector`], [`RandomInjector`]) combine other
//! injectors through the same `handler` capability.

mod chain;
mod error;
mod random;
mod reject;
mod slow;

pub use chain::ChainInjector;
pub use error::ErrorInjector;
pub use random::RandomInjector;
pub use reject::RejectInjector;
pub use slow::{SlowInjector, WaitFn, WaitFuture};

use crate::handler::Handler;

/// Closed set of fault behaviors
#[derive(Debug, Clone)]
pub enum Injector {
    /// Respond with an HTTP error
    Error(ErrorInjector),
    /// Delay, then continue
    Slow(SlowInjector),
    /// Drop the connection
    Reject(RejectInjector),
    /// Run several injectors in order
    Chain(ChainInjector),
    /// Run one injector picked at random
    Random(RandomInjector),
}

impl Injector {
    /// Injector that does nothing but call the next handler
    pub fn pass_through() -> Self {
        Self::Chain(ChainInjector::default())
    }

    /// Wrap `next` with this injector's behavior
    pub fn handler(&self, next: Handler) -> Handler {
        match self {
            Self::Error(injector) => injector.handler(next),
            Self::Slow(injector) => injector.handler(next),
            Self::Reject(injector) => injector.handler(next),
            Self::Chain(injector) => injector.handler(next),
            Self::Random(injector) => injector.handler(next),
        }
    }

    /// Name used when reporting
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Error(_) => ErrorInjector::NAME,
            Self::Slow(_) => SlowInjector::NAME,
            Self::Reject(_) => RejectInjector::NAME,
            Self::Chain(_) => ChainInjector::NAME,
            Self::Random(_) => RandomInjector::NAME,
        }
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::pass_through()
    }
}

impl From<ErrorInjector> for Injector {
    fn from(injector: ErrorInjector) -> Self {
        Self::Error(injector)
    }
}

impl From<SlowInjector> for Injector {
    fn from(injector: SlowInjector) -> Self {
        Self::Slow(injector)
    }
}

impl From<RejectInjector> for Injector {
    fn from(injector: RejectInjector) -> Self {
        Self::Reject(injector)
    }
}

impl From<ChainInjector> for Injector {
    fn from(injector: ChainInjector) -> Self {
        Self::Chain(injector)
    }
}

impl From<RandomInjector> for Injector {
    fn from(injector: RandomInjector) -> Self {
        Self::Random(injector)
    }
}
