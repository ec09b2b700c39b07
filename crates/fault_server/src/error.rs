//! API and startup errors

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fault_core::FaultError;
use serde::Serialize;
use thiserror::Error;

/// Admin API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<FaultError> for ApiError {
    fn from(err: FaultError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// Errors raised while assembling the fault stack from configuration
#[derive(Debug, Error)]
pub enum StackError {
    #[error("fault #{index} is invalid: {source}")]
    InvalidFault {
        index: usize,
        #[source]
        source: FaultError,
    },

    #[error("duplicate fault name: {0}")]
    DuplicateName(String),

    #[error("fault name '{0}' is reserved by the admin API")]
    ReservedName(String),
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn api_error_messages() {
        assert_eq!(
            ApiError::BadRequest("bad".to_string()).to_string(),
            "Bad request: bad"
        );
        assert_eq!(
            ApiError::NotFound("fault x".to_string()).to_string(),
            "Not found: fault x"
        );
    }

    #[tokio::test]
    async fn not_found_renders_json() {
        let response = ApiError::NotFound("fault 'x'".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["code"], "not_found");
        assert_eq!(body["error"], "Not found: fault 'x'");
    }

    #[tokio::test]
    async fn fault_error_maps_to_bad_request() {
        let response = ApiError::from(FaultError::InvalidParticipation(2.0)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "bad_request");
    }

    #[test]
    fn stack_error_names_index() {
        let err = StackError::InvalidFault {
            index: 2,
            source: FaultError::NilInjector,
        };
        assert_eq!(err.to_string(), "fault #2 is invalid: injector cannot be nil");
    }

    #[test]
    fn reserved_name_message() {
        let err = StackError::ReservedName("metrics".to_string());
        assert_eq!(
            err.to_string(),
            "fault name 'metrics' is reserved by the admin API"
        );
    }
}
