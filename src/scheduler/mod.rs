//! The refresh scheduler and the dashboard state it maintains.
//!
//! `DashboardState` owns one [`MetricSlot`] per aggregator. The
//! [`RefreshScheduler`] is the only writer of the slots; the HTTP API and the
//! snapshot command only read them (and reset them on a manual retry).

mod runner;
mod slot;

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use serde::Serialize;
use tokio::time::Instant;

pub use runner::{RefreshScheduler, refresh_slot};
pub use slot::{FetchGuard, MetricSlot, SlotStatus};

use crate::{
    config::RefreshConfig,
    models::{MetricKind, QueryRange, TimeWindow, time_window::to_iso},
};

/// Cached results and refresh state of every aggregator.
#[derive(Debug)]
pub struct DashboardState {
    slots: Vec<Arc<MetricSlot>>,
    window: TimeWindow,
    auto_refresh: bool,
    started_at: Instant,
}

/// Campaign window as reported by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct WindowStatus {
    /// Campaign start, RFC 3339.
    pub start: String,
    /// Campaign end, RFC 3339.
    pub end: String,
    /// Upper bound used by the next fetch, RFC 3339.
    pub query_end: String,
}

impl DashboardState {
    /// Creates the state with empty slots in fixed evaluation order.
    pub fn new(refresh: &RefreshConfig, window: TimeWindow) -> Self {
        let slots = MetricKind::ALL
            .into_iter()
            .map(|kind| Arc::new(MetricSlot::new(kind, refresh.interval_for(kind))))
            .collect();
        Self { slots, window, auto_refresh: refresh.auto_refresh, started_at: Instant::now() }
    }

    /// The slot of the given aggregator.
    pub fn slot(&self, kind: MetricKind) -> &Arc<MetricSlot> {
        // Slots follow `MetricKind::ALL`, which matches declaration order.
        &self.slots[kind as usize]
    }

    /// All slots in evaluation order.
    pub fn slots(&self) -> &[Arc<MetricSlot>] {
        &self.slots
    }

    /// The campaign window.
    pub fn window(&self) -> &TimeWindow {
        &self.window
    }

    /// Whether slots with a result are refreshed on their interval.
    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    /// The range to query for a fetch starting now.
    pub fn query_range(&self) -> QueryRange {
        self.window.resolve(Utc::now())
    }

    /// Time since the state was created.
    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Campaign window for status reporting.
    pub fn window_status(&self) -> WindowStatus {
        let range = self.query_range();
        WindowStatus {
            start: range.start_iso(),
            end: to_iso(&self.window.end()),
            query_end: range.end_iso(),
        }
    }

    /// Status of every slot in evaluation order.
    pub fn statuses(&self) -> Vec<SlotStatus> {
        let now = Instant::now();
        self.slots.iter().map(|slot| slot.status(now)).collect()
    }
}
