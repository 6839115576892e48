//! The long-running refresh loops.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{task::JoinSet, time::Instant};
use tokio_util::sync::CancellationToken;

use super::{DashboardState, MetricSlot};
use crate::{
    aggregators::Aggregator,
    config::{RefreshConfig, RefreshMode},
    models::{AggregateResult, TimeWindow},
};

/// Runs `aggregator` once and stores the outcome in `slot`.
///
/// Returns `None` without fetching when the slot already has a fetch in
/// flight. Aggregator errors are cached as failures and never propagate.
pub async fn refresh_slot(
    slot: &MetricSlot,
    aggregator: &dyn Aggregator,
    window: &TimeWindow,
) -> Option<Arc<AggregateResult>> {
    let guard = slot.try_begin()?;
    let kind = slot.kind();
    let range = window.resolve(Utc::now());

    tracing::debug!(%kind, start = %range.start_iso(), end = %range.end_iso(), "Refreshing aggregator.");
    let result = match aggregator.aggregate(&range).await {
        Ok(data) => {
            tracing::info!(%kind, "Aggregator refreshed.");
            AggregateResult::success(data, Utc::now())
        }
        Err(e) => {
            tracing::error!(%kind, error = %e, "Aggregator refresh failed.");
            AggregateResult::failure(e.to_string(), Utc::now())
        }
    };
    Some(guard.complete(result, Instant::now()))
}

/// Drives the aggregators according to the configured refresh mode.
pub struct RefreshScheduler {
    state: Arc<DashboardState>,
    aggregators: Vec<Arc<dyn Aggregator>>,
    refresh: RefreshConfig,
    cancellation_token: CancellationToken,
}

impl RefreshScheduler {
    /// Creates a new `RefreshScheduler`.
    pub fn new(
        state: Arc<DashboardState>,
        aggregators: Vec<Arc<dyn Aggregator>>,
        refresh: RefreshConfig,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self { state, aggregators, refresh, cancellation_token }
    }

    /// Refreshes `aggregator` if its slot is due.
    pub async fn refresh_if_due(&self, aggregator: &dyn Aggregator) -> bool {
        let slot = self.state.slot(aggregator.kind());
        if !slot.is_due_at(Instant::now(), self.state.auto_refresh()) {
            return false;
        }
        refresh_slot(slot, aggregator, self.state.window()).await.is_some()
    }

    /// Evaluates every aggregator once, in order, waiting for each fetch.
    pub async fn run_cycle(&self) {
        for aggregator in &self.aggregators {
            self.refresh_if_due(aggregator.as_ref()).await;
        }
    }

    /// Starts the long-running service loop.
    pub async fn run(self) {
        tracing::info!(mode = ?self.refresh.mode, auto_refresh = self.refresh.auto_refresh, "Refresh scheduler starting.");
        match self.refresh.mode {
            RefreshMode::ReloadCycle => self.run_reload_cycle().await,
            RefreshMode::Independent => self.run_independent().await,
        }
        tracing::info!("Refresh scheduler stopped.");
    }

    /// One loop evaluating every aggregator in order, then pausing.
    async fn run_reload_cycle(self) {
        let pause = self.refresh.cycle_interval_secs;
        loop {
            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Refresh cycle cancellation signal received, shutting down...");
                    break;
                }

                _ = self.run_cycle() => {}
            }

            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    /// One timer task per aggregator, so a slow aggregator never delays
    /// another.
    async fn run_independent(self) {
        let check_every = self.refresh.cycle_interval_secs;
        let mut tasks = JoinSet::new();

        for aggregator in self.aggregators {
            let slot = Arc::clone(self.state.slot(aggregator.kind()));
            let state = Arc::clone(&self.state);
            let token = self.cancellation_token.clone();
            tasks.spawn(async move {
                run_aggregator_loop(slot, aggregator, state, check_every, token).await;
            });
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Aggregator task terminated unexpectedly.");
            }
        }
    }
}

async fn run_aggregator_loop(
    slot: Arc<MetricSlot>,
    aggregator: Arc<dyn Aggregator>,
    state: Arc<DashboardState>,
    check_every: Duration,
    token: CancellationToken,
) {
    let kind = aggregator.kind();
    loop {
        if slot.is_due_at(Instant::now(), state.auto_refresh()) {
            tokio::select! {
                biased;

                _ = token.cancelled() => break,
                _ = refresh_slot(&slot, aggregator.as_ref(), state.window()) => {}
            }
        }

        tokio::select! {
            biased;

            _ = token.cancelled() => break,
            _ = tokio::time::sleep(check_every) => {}
        }
    }
    tracing::debug!(%kind, "Aggregator loop stopped.");
}
