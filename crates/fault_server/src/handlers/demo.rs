//! Sample routes that sit behind the fault stack

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Body returned by the sample root route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// `GET /`
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "OK".to_string(),
    })
}

/// `GET /health`
pub async fn health() -> StatusCode {
    StatusCode::OK
}
