//! Handlers for the cached metric results.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{Map, Value, json};

use super::{ApiError, ApiState};
use crate::{models::MetricKind, scheduler::MetricSlot};

fn parse_kind(kind: &str) -> Result<MetricKind, ApiError> {
    kind.parse().map_err(|_| ApiError::NotFound(format!("Unknown metric kind '{kind}'")))
}

/// The cached result of a slot, or a pending marker before the first fetch.
fn slot_entry(slot: &MetricSlot) -> Result<Value, ApiError> {
    match slot.result() {
        Some(result) => Ok(serde_json::to_value(result.as_ref())?),
        None => Ok(json!({ "status": "pending", "fetching": slot.is_fetching() })),
    }
}

/// Retrieves every cached result keyed by aggregator kind.
pub async fn get_metrics(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let mut metrics = Map::new();
    for slot in state.dashboard.slots() {
        metrics.insert(slot.kind().to_string(), slot_entry(slot)?);
    }
    Ok((StatusCode::OK, Json(json!({ "metrics": metrics }))))
}

/// Retrieves the cached result of one aggregator.
pub async fn get_metric(
    State(state): State<ApiState>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    let entry = slot_entry(state.dashboard.slot(kind))?;
    Ok((StatusCode::OK, Json(entry)))
}

/// Clears the cached result of one aggregator so the next tick re-fetches it.
pub async fn retry_metric(
    State(state): State<ApiState>,
    Path(kind): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = parse_kind(&kind)?;
    state.dashboard.slot(kind).reset();
    tracing::info!(%kind, "Manual retry requested.");
    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "Retry scheduled", "kind": kind }))))
}
