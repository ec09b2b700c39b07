//! Admin API for inspecting and toggling faults at runtime

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use fault_core::Fault;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::ApiError, state::AppState};

/// Current state of one fault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultStatus {
    pub name: String,
    pub injector: String,
    pub enabled: bool,
    pub participation: f64,
}

impl From<&Fault> for FaultStatus {
    fn from(fault: &Fault) -> Self {
        Self {
            name: fault.name().to_string(),
            injector: fault.injector().name().to_string(),
            enabled: fault.is_enabled(),
            participation: fault.participation(),
        }
    }
}

/// Body of `PUT /_faults/{name}/enabled`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnabledRequest {
    pub enabled: bool,
}

/// Body of `PUT /_faults/{name}/participation`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParticipationRequest {
    pub participation: f64,
}

fn find<'a>(state: &'a AppState, name: &str) -> Result<&'a Fault, ApiError> {
    state
        .faults
        .get(name)
        .ok_or_else(|| ApiError::NotFound(format!("fault '{name}'")))
}

/// `GET /_faults`
pub async fn list_faults(State(state): State<AppState>) -> Json<Vec<FaultStatus>> {
    Json(state.faults.iter().map(FaultStatus::from).collect())
}

/// `GET /_faults/{name}`
pub async fn get_fault(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<FaultStatus>, ApiError> {
    find(&state, &name).map(|fault| Json(fault.into()))
}

/// `PUT /_faults/{name}/enabled`
pub async fn set_enabled(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<EnabledRequest>,
) -> Result<Json<FaultStatus>, ApiError> {
    let fault = find(&state, &name)?;
    fault.set_enabled(request.enabled);
    info!(fault = %name, enabled = request.enabled, "Fault toggled");
    Ok(Json(fault.into()))
}

/// `PUT /_faults/{name}/participation`
pub async fn set_participation(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(request): Json<ParticipationRequest>,
) -> Result<Json<FaultStatus>, ApiError> {
    let fault = find(&state, &name)?;
    fault.set_participation(request.participation)?;
    info!(
        fault = %name,
        participation = request.participation,
        "Fault participation changed"
    );
    Ok(Json(fault.into()))
}

/// `GET /_faults/metrics`, Prometheus text format
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("metrics are disabled".to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}
