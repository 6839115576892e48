//! The tagged success/failure value cached for each aggregator.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::metrics::{CustomerSegments, GeoRollup, MainMetrics, SkuRanking, StatePerformance};

/// Identifies one of the five metric aggregators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Orders and revenue totals.
    Main,
    /// Top-SKU ranking.
    Sku,
    /// Geographic rollup feeding the map.
    Map,
    /// Customer segmentation.
    Customer,
    /// State performance table.
    State,
}

impl MetricKind {
    /// All kinds in the order the scheduler evaluates them.
    pub const ALL: [MetricKind; 5] =
        [MetricKind::Main, MetricKind::Sku, MetricKind::Map, MetricKind::Customer, MetricKind::State];

    /// Stable lowercase name used in config keys, logs and URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Main => "main",
            MetricKind::Sku => "sku",
            MetricKind::Map => "map",
            MetricKind::Customer => "customer",
            MetricKind::State => "state",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown metric kind.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown metric kind: {0}")]
pub struct UnknownMetricKind(pub String);

impl FromStr for MetricKind {
    type Err = UnknownMetricKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownMetricKind(s.to_string()))
    }
}

/// The summary computed by one aggregator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum MetricData {
    /// Orders and revenue totals.
    Main(MainMetrics),
    /// Top-SKU ranking.
    Sku(SkuRanking),
    /// Geographic rollup.
    Map(GeoRollup),
    /// Customer segmentation.
    Customer(CustomerSegments),
    /// State performance.
    State(StatePerformance),
}

impl MetricData {
    /// The aggregator kind that produced this data.
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricData::Main(_) => MetricKind::Main,
            MetricData::Sku(_) => MetricKind::Sku,
            MetricData::Map(_) => MetricKind::Map,
            MetricData::Customer(_) => MetricKind::Customer,
            MetricData::State(_) => MetricKind::State,
        }
    }
}

/// Outcome of a single aggregator invocation.
///
/// A failure carries no partial data. Either variant replaces the previously
/// cached result of the same aggregator as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AggregateResult {
    /// The aggregator completed.
    Success {
        /// The computed summary.
        data: MetricData,
        /// When the summary was computed.
        as_of: DateTime<Utc>,
    },
    /// The aggregator failed.
    Failure {
        /// Human-readable error message.
        error: String,
        /// When the failure was recorded.
        as_of: DateTime<Utc>,
    },
}

impl AggregateResult {
    /// Builds a success stamped with `as_of`.
    pub fn success(data: MetricData, as_of: DateTime<Utc>) -> Self {
        AggregateResult::Success { data, as_of }
    }

    /// Builds a failure stamped with `as_of`.
    pub fn failure(error: impl Into<String>, as_of: DateTime<Utc>) -> Self {
        AggregateResult::Failure { error: error.into(), as_of }
    }

    /// Whether the result is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, AggregateResult::Success { .. })
    }

    /// The computed data, if any.
    pub fn data(&self) -> Option<&MetricData> {
        match self {
            AggregateResult::Success { data, .. } => Some(data),
            AggregateResult::Failure { .. } => None,
        }
    }

    /// The error message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            AggregateResult::Success { .. } => None,
            AggregateResult::Failure { error, .. } => Some(error),
        }
    }

    /// When the result was produced.
    pub fn as_of(&self) -> DateTime<Utc> {
        match self {
            AggregateResult::Success { as_of, .. } | AggregateResult::Failure { as_of, .. } => *as_of,
        }
    }
}
