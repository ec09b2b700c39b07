//! Error injector: answers immediately with a configured HTTP status.

use std::future;

use axum::{
    http::{
        StatusCode,
        header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS},
    },
    response::{IntoResponse, Response},
};

use crate::{
    error::FaultError,
    handler::Handler,
    reporter::{InjectorState, NoopReporter, SharedReporter, dispatch},
};

/// Responds with a status code and its text, never calling the next handler
#[derive(Debug, Clone)]
pub struct ErrorInjector {
    status: StatusCode,
    status_text: String,
    reporter: SharedReporter,
}

impl ErrorInjector {
    /// Name used when reporting
    pub const NAME: &'static str = "ErrorInjector";

    /// Create an injector for `code`.
    ///
    /// The body defaults to the standard reason phrase; codes without one are
    /// rejected.
    pub fn new(code: u16) -> Result<Self, FaultError> {
        let status = StatusCode::from_u16(code).map_err(|_| FaultError::InvalidStatusCode(code))?;
        let reason = status
            .canonical_reason()
            .ok_or(FaultError::InvalidStatusCode(code))?;

        Ok(Self {
            status,
            status_text: reason.to_owned(),
            reporter: NoopReporter::shared(),
        })
    }

    /// Override the response body text
    #[must_use]
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    /// Set the lifecycle reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: SharedReporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    fn response(&self) -> Response {
        (
            self.status,
            [
                (CONTENT_TYPE, "text/plain; charset=utf-8"),
                (X_CONTENT_TYPE_OPTIONS, "nosniff"),
            ],
            self.status_text.clone(),
        )
            .into_response()
    }

    /// Wrap `next`; the returned handler never calls it
    pub fn handler(&self, _next: Handler) -> Handler {
        let injector = self.clone();
        Handler::new(move |_req| {
            dispatch(&injector.reporter, Self::NAME, InjectorState::Started);
            let response = injector.response();
            dispatch(&injector.reporter, Self::NAME, InjectorState::Finished);
            future::ready(Ok(response))
        })
    }
}
