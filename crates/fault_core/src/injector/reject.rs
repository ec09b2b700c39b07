//! Reject injector: drops the connection without any response.

use std::future;

use crate::{
    handler::{Aborted, Handler},
    reporter::{InjectorState, NoopReporter, SharedReporter, dispatch},
};

/// Ends the request with [`Aborted`], simulating a dropped connection
#[derive(Debug, Clone)]
pub struct RejectInjector {
    reporter: SharedReporter,
}

impl RejectInjector {
    /// Name used when reporting
    pub const NAME: &'static str = "RejectInjector";

    pub fn new() -> Self {
        Self {
            reporter: NoopReporter::shared(),
        }
    }

    /// Set the lifecycle reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: SharedReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Wrap `next`; the returned handler never calls it and never responds
    pub fn handler(&self, _next: Handler) -> Handler {
        let reporter = self.reporter.clone();
        Handler::new(move |_req| {
            // Finished is dispatched before the abort so it is never lost.
            dispatch(&reporter, Self::NAME, InjectorState::Started);
            dispatch(&reporter, Self::NAME, InjectorState::Finished);
            future::ready(Err(Aborted))
        })
    }
}

impl Default for RejectInjector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::test_support::{RecordingReporter, counting_terminal, terminal, test_request};

    #[tokio::test]
    async fn handler_aborts() {
        let handler = RejectInjector::new().handler(terminal());
        let result = handler.handle(test_request("/")).await;
        assert_eq!(result.unwrap_err(), Aborted);
    }

    #[tokio::test]
    async fn handler_never_calls_next() {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler = RejectInjector::new().handler(counting_terminal(Arc::clone(&calls)));

        assert!(handler.handle(test_request("/")).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reports_finished_before_abort() {
        let reporter = Arc::new(RecordingReporter::default());
        let handler = RejectInjector::new()
            .with_reporter(reporter.clone())
            .handler(terminal());

        assert!(handler.handle(test_request("/")).await.is_err());
        assert_eq!(
            reporter.wait_for(2).await,
            vec![
                (RejectInjector::NAME.to_owned(), InjectorState::Started),
                (RejectInjector::NAME.to_owned(), InjectorState::Finished),
            ]
        );
    }
}
