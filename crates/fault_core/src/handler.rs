//! Request handler abstraction
//!
//! A [`Handler`] takes a request and eventually produces a response, or
//! [`Aborted`] when an injector decided the connection should be dropped
//! without any response at all. Injectors and faults wrap one handler into
//! another, which is how the whole pipeline composes.

use std::{
    convert::Infallible,
    error::Error as StdError,
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{extract::Request, response::Response};
use thiserror::Error;
use tower::{Service, ServiceExt};

/// Future returned by a [`Handler`]
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Response, Aborted>> + Send>>;

/// Signal that the request must end without writing a response.
///
/// This is a simulated dropped connection, not a failure: transports should
/// close the connection and log it as expected behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Error)]
#[error("connection aborted by injected fault")]
pub struct Aborted;

impl Aborted {
    /// Check whether `err`, or anything in its `source()` chain, is an abort.
    pub fn is_abort(err: &(dyn StdError + 'static)) -> bool {
        std::iter::successors(Some(err), |&e| e.source()).any(|e| e.is::<Self>())
    }
}

impl From<Infallible> for Aborted {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// A cloneable, shareable request handler
#[derive(Clone)]
pub struct Handler {
    inner: Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>,
}

impl Handler {
    /// Create a handler from an async function
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, Aborted>> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |req: Request| -> HandlerFuture { Box::pin(f(req)) }),
        }
    }

    /// Create a handler that drives a tower service, such as an axum `Router`.
    ///
    /// The service is cloned per request, so it must be cheap to clone.
    pub fn from_service<S>(service: S) -> Self
    where
        S: Service<Request, Response = Response> + Clone + Send + Sync + 'static,
        S::Error: Into<Aborted>,
        S::Future: Send,
    {
        Self::new(move |req| {
            let service = service.clone();
            async move { service.oneshot(req).await.map_err(Into::into) }
        })
    }

    /// Handle a single request
    pub fn handle(&self, req: Request) -> HandlerFuture {
        (self.inner)(req)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

impl Service<Request> for Handler {
    type Response = Response;
    type Error = Aborted;
    type Future = HandlerFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        self.handle(req)
    }
}
