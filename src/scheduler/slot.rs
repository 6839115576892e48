//! Per-aggregator cache and refresh bookkeeping.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use arc_swap::ArcSwapOption;
use serde::Serialize;
use tokio::time::Instant;

use crate::models::{AggregateResult, MetricKind};

/// Cached result and refresh state of one aggregator.
///
/// The result is replaced as a whole through an atomic swap, so readers
/// always observe either the previous or the new result. At most one fetch
/// per slot is in flight, guarded by [`FetchGuard`].
#[derive(Debug)]
pub struct MetricSlot {
    kind: MetricKind,
    interval: Duration,
    result: ArcSwapOption<AggregateResult>,
    last_attempt: ArcSwapOption<Instant>,
    in_flight: AtomicBool,
}

/// Marks a slot as fetching for as long as it is alive.
#[derive(Debug)]
pub struct FetchGuard<'a> {
    slot: &'a MetricSlot,
}

impl FetchGuard<'_> {
    /// Stores the outcome of the fetch and records the attempt time.
    pub fn complete(self, result: AggregateResult, at: Instant) -> Arc<AggregateResult> {
        let result = Arc::new(result);
        self.slot.result.store(Some(Arc::clone(&result)));
        self.slot.last_attempt.store(Some(Arc::new(at)));
        result
    }
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.slot.in_flight.store(false, Ordering::Release);
    }
}

/// Point-in-time view of a slot for status reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotStatus {
    /// Aggregator kind.
    pub kind: MetricKind,
    /// Configured refresh interval in seconds.
    pub interval_secs: u64,
    /// Whether a fetch is currently running.
    pub fetching: bool,
    /// Whether any result is cached.
    pub has_result: bool,
    /// Whether the cached result is a success, `None` without result.
    pub last_success: Option<bool>,
    /// Seconds since the last completed attempt.
    pub seconds_since_update: Option<u64>,
    /// Seconds until the slot is due again.
    pub next_refresh_in_secs: Option<u64>,
}

impl MetricSlot {
    /// Creates an empty slot.
    pub fn new(kind: MetricKind, interval: Duration) -> Self {
        Self {
            kind,
            interval,
            result: ArcSwapOption::empty(),
            last_attempt: ArcSwapOption::empty(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// The aggregator kind of this slot.
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// The configured refresh interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The cached result, if any.
    pub fn result(&self) -> Option<Arc<AggregateResult>> {
        self.result.load_full()
    }

    /// When the last fetch completed.
    pub fn last_attempt(&self) -> Option<Instant> {
        self.last_attempt.load_full().map(|at| *at)
    }

    /// Whether a fetch is in flight.
    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Whether the slot should be fetched at `now`.
    ///
    /// A slot in flight is never due. Otherwise it is due when it holds no
    /// result, or when auto refresh is on and the interval has elapsed since
    /// the last attempt.
    pub fn is_due_at(&self, now: Instant, auto_refresh: bool) -> bool {
        if self.is_fetching() {
            return false;
        }
        if self.result.load().is_none() {
            return true;
        }
        if !auto_refresh {
            return false;
        }
        match self.last_attempt() {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    /// Time left until the slot is due, zero once overdue.
    pub fn next_refresh_in(&self, now: Instant) -> Option<Duration> {
        self.last_attempt()
            .map(|last| self.interval.saturating_sub(now.saturating_duration_since(last)))
    }

    /// Marks the slot as fetching, unless a fetch is already in flight.
    pub fn try_begin(&self) -> Option<FetchGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FetchGuard { slot: self })
    }

    /// Clears the cached result and last attempt so the slot is due at once.
    pub fn reset(&self) {
        self.result.store(None);
        self.last_attempt.store(None);
    }

    /// Snapshot of the slot for status reporting.
    pub fn status(&self, now: Instant) -> SlotStatus {
        let result = self.result();
        SlotStatus {
            kind: self.kind,
            interval_secs: self.interval.as_secs(),
            fetching: self.is_fetching(),
            has_result: result.is_some(),
            last_success: result.as_ref().map(|r| r.is_success()),
            seconds_since_update: self
                .last_attempt()
                .map(|last| now.saturating_duration_since(last).as_secs()),
            next_refresh_in_secs: self.next_refresh_in(now).map(|d| d.as_secs()),
        }
    }
}
