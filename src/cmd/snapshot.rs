//! Fetches every aggregator once and prints the results as JSON.

use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;

use crate::{
    aggregators::{Aggregator, build_aggregators},
    config::{AppConfig, AppConfigError},
    http_client::{HttpClientError, create_http_client},
    models::{AggregateResult, MetricKind},
    providers::{OrderPaginator, ShopifyClient, SourceError},
    scheduler::{DashboardState, WindowStatus, refresh_slot},
};

/// Errors that abort a snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The configuration failed validation.
    #[error("Config error: {0}")]
    Config(#[from] AppConfigError),
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] HttpClientError),
    /// The upstream client could not be created.
    #[error("Order source error: {0}")]
    Source(#[from] SourceError),
    /// The report could not be serialized.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Arguments of the `snapshot` subcommand.
#[derive(Parser, Debug, Default)]
pub struct SnapshotArgs {
    /// Only fetch this aggregator (main, sku, map, customer, state).
    #[arg(short, long)]
    pub kind: Option<MetricKind>,
    /// Print single-line JSON.
    #[arg(long)]
    pub compact: bool,
}

/// One aggregator's outcome in the report.
#[derive(Debug, Serialize)]
pub struct SnapshotEntry {
    /// Aggregator kind.
    pub kind: MetricKind,
    /// The fetched result.
    pub result: Arc<AggregateResult>,
}

/// The printed report.
#[derive(Debug, Serialize)]
pub struct SnapshotReport {
    /// Campaign window the results cover.
    pub window: WindowStatus,
    /// Results in evaluation order.
    pub results: Vec<SnapshotEntry>,
}

/// Runs the selected aggregators once, in evaluation order.
pub async fn collect(
    state: &DashboardState,
    aggregators: &[Arc<dyn Aggregator>],
    only: Option<MetricKind>,
) -> SnapshotReport {
    let mut results = Vec::new();
    for aggregator in aggregators {
        let kind = aggregator.kind();
        if only.is_some_and(|only| only != kind) {
            continue;
        }
        if let Some(result) = refresh_slot(state.slot(kind), aggregator.as_ref(), state.window()).await
        {
            results.push(SnapshotEntry { kind, result });
        }
    }
    SnapshotReport { window: state.window_status(), results }
}

/// Executes the `snapshot` subcommand.
pub async fn execute(config: AppConfig, args: SnapshotArgs) -> Result<(), SnapshotError> {
    config.validate()?;
    let window = config.campaign.time_window()?;

    let client = Arc::new(create_http_client(&config.http_base_config)?);
    let source = Arc::new(ShopifyClient::new(&config.shop, client)?);
    let paginator = OrderPaginator::new(source, config.fetch.clone());
    let aggregators =
        build_aggregators(paginator, &config.campaign.target_tags, config.segmentation);
    let state = DashboardState::new(&config.refresh, window);

    tracing::info!(kind = ?args.kind, "Taking snapshot...");
    let report = collect(&state, &aggregators, args.kind).await;

    let output = if args.compact {
        serde_json::to_string(&report)?
    } else {
        serde_json::to_string_pretty(&report)?
    };
    println!("{}", output);

    Ok(())
}
