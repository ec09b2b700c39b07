//! Slow injector: waits, then continues with the next handler.

use std::{fmt, future::Future, pin::Pin, sync::Arc, time::Duration};

use crate::{
    handler::Handler,
    reporter::{InjectorState, NoopReporter, SharedReporter, dispatch},
    trail::{self, TrailEntry},
};

/// Future returned by a wait function
pub type WaitFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Function used to wait for the configured duration
pub type WaitFn = Arc<dyn Fn(Duration) -> WaitFuture + Send + Sync>;

/// Delays the request, then always calls the next handler
#[derive(Clone)]
pub struct SlowInjector {
    duration: Duration,
    wait: WaitFn,
    reporter: SharedReporter,
}

impl SlowInjector {
    /// Name used when reporting
    pub const NAME: &'static str = "SlowInjector";

    /// Create an injector that sleeps for `duration`
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            wait: Arc::new(|d: Duration| -> WaitFuture { Box::pin(tokio::time::sleep(d)) }),
            reporter: NoopReporter::shared(),
        }
    }

    /// Replace the wait function
    #[must_use]
    pub fn with_wait_fn<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Duration) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.wait = Arc::new(move |d: Duration| -> WaitFuture { Box::pin(f(d)) });
        self
    }

    /// Set the lifecycle reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: SharedReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Wrap `next` with the delay
    pub fn handler(&self, next: Handler) -> Handler {
        let injector = Arc::new(self.clone());
        Handler::new(move |mut req| {
            let injector = Arc::clone(&injector);
            let next = next.clone();
            async move {
                dispatch(&injector.reporter, Self::NAME, InjectorState::Started);
                (injector.wait)(injector.duration).await;
                dispatch(&injector.reporter, Self::NAME, InjectorState::Finished);

                trail::record(&mut req, TrailEntry::Slow);
                next.handle(req).await
            }
        })
    }
}

impl fmt::Debug for SlowInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlowInjector")
            .field("duration", &self.duration)
            .field("reporter", &self.reporter)
            .finish_non_exhaustive()
    }
}
