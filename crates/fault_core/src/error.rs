//! Construction errors
//!
//! Every error here is raised while building a [`Fault`](crate::Fault) or an
//! [`Injector`](crate::Injector). Nothing is returned half-built: a failed
//! constructor leaves no usable value behind.

use thiserror::Error;

/// Errors raised while validating fault and injector configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FaultError {
    /// A required injector was not provided
    #[error("injector cannot be nil")]
    NilInjector,

    /// A composite injector list contained an empty entry
    #[error("injector list entry {index} is nil")]
    NilInjectorEntry { index: usize },

    /// Participation outside of `0.0..=1.0`
    #[error("participation must be 0.0 <= participation <= 1.0, got {0}")]
    InvalidParticipation(f64),

    /// Status code without a standard reason phrase
    #[error("not a valid http status code: {0}")]
    InvalidStatusCode(u16),

    /// A composite injector was declared without any entries
    #[error("{kind} injector requires at least one entry")]
    EmptyInjectorList { kind: &'static str },

    /// Header allow/block list key is not a valid header name
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),
}
