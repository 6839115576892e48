//! Represents the `/status` endpoint handler and response structure.
//! Provides application status and per-aggregator refresh state.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;

use super::{ApiError, ApiState};
use crate::{
    config::RefreshMode,
    models::WindowMode,
    scheduler::{SlotStatus, WindowStatus},
};

/// Represents the response from the `/status` endpoint.
#[derive(Debug, Serialize, Clone)]
pub struct StatusResponse {
    /// The version of the application.
    pub version: String,
    /// The shop the dashboard reports on.
    pub shop: String,
    /// Campaign window and the upper bound of the next query.
    pub window: WindowStatus,
    /// Whether the window is fixed or grows with the clock.
    pub window_mode: WindowMode,
    /// The uptime of the application in seconds.
    pub uptime_secs: u64,
    /// Whether cached results are refreshed on their interval.
    pub auto_refresh: bool,
    /// Scheduling strategy.
    pub refresh_mode: RefreshMode,
    /// Refresh state of every aggregator in evaluation order.
    pub aggregators: Vec<SlotStatus>,
}

/// Retrieves application status and refresh state.
pub async fn status(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let dashboard = &state.dashboard;
    let response = StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        shop: state.config.shop.name.clone(),
        window: dashboard.window_status(),
        window_mode: dashboard.window().mode(),
        uptime_secs: dashboard.uptime().as_secs(),
        auto_refresh: dashboard.auto_refresh(),
        refresh_mode: state.config.refresh.mode,
        aggregators: dashboard.statuses(),
    };
    Ok((StatusCode::OK, Json(response)))
}
