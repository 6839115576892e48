//! HTTP server module
//!
//! A read-only view over the cached aggregate results, plus a manual retry
//! endpoint that resets a slot so the scheduler re-fetches it.

mod auth;
mod dashboard;
mod error;
mod metrics;
mod status;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, post},
};
pub use dashboard::{DashboardView, Panel, PanelStatus, Stat, build_view};
pub use error::{ApiError, HttpServerError};
use serde_json::json;

use crate::{config::AppConfig, scheduler::DashboardState};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Cached results maintained by the scheduler.
    pub dashboard: Arc<DashboardState>,
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Builds the API router.
pub fn router(state: ApiState) -> Router {
    let protected = Router::new()
        .route("/metrics/{kind}/retry", post(metrics::retry_metric))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::auth));

    Router::new()
        .route("/health", get(health))
        .route("/status", get(status::status))
        .route("/metrics", get(metrics::get_metrics))
        .route("/metrics/{kind}", get(metrics::get_metric))
        .route("/dashboard", get(dashboard::dashboard))
        .merge(protected)
        .with_state(state)
}

/// Runs the HTTP server based on the provided application configuration.
pub async fn run_server_from_config(
    config: Arc<AppConfig>,
    dashboard: Arc<DashboardState>,
) -> Result<(), HttpServerError> {
    let addr: SocketAddr = config.server.listen_address.parse()?;
    let app = router(ApiState { config, dashboard });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(address = %addr, "HTTP server listening.");

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
