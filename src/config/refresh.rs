use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{deserialize_duration_from_seconds, serialize_duration_to_seconds};
use crate::models::MetricKind;

fn default_auto_refresh() -> bool {
    true
}

fn default_cycle_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_main_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_sku_interval() -> Duration {
    Duration::from_secs(300)
}

fn default_map_interval() -> Duration {
    Duration::from_secs(600)
}

fn default_customer_interval() -> Duration {
    Duration::from_secs(300)
}

fn default_state_interval() -> Duration {
    Duration::from_secs(600)
}

/// How refresh work is scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshMode {
    /// One timer task per aggregator; a slow aggregator never delays another.
    #[default]
    Independent,
    /// A single loop evaluating all aggregators in fixed order, then pausing.
    ReloadCycle,
}

/// Refresh cadence for each aggregator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshConfig {
    /// When disabled, aggregators are only fetched while they have no result.
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh: bool,

    /// Scheduling strategy.
    #[serde(default)]
    pub mode: RefreshMode,

    /// Pause between due-checks (the reload cadence).
    #[serde(
        default = "default_cycle_interval",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub cycle_interval_secs: Duration,

    /// Orders/revenue totals interval.
    #[serde(
        default = "default_main_interval",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub main_interval_secs: Duration,

    /// Top-SKU ranking interval.
    #[serde(
        default = "default_sku_interval",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub sku_interval_secs: Duration,

    /// Geographic rollup interval.
    #[serde(
        default = "default_map_interval",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub map_interval_secs: Duration,

    /// Customer segmentation interval.
    #[serde(
        default = "default_customer_interval",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub customer_interval_secs: Duration,

    /// State performance interval.
    #[serde(
        default = "default_state_interval",
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds"
    )]
    pub state_interval_secs: Duration,
}

impl RefreshConfig {
    /// The configured interval of the given aggregator.
    pub fn interval_for(&self, kind: MetricKind) -> Duration {
        match kind {
            MetricKind::Main => self.main_interval_secs,
            MetricKind::Sku => self.sku_interval_secs,
            MetricKind::Map => self.map_interval_secs,
            MetricKind::Customer => self.customer_interval_secs,
            MetricKind::State => self.state_interval_secs,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            auto_refresh: default_auto_refresh(),
            mode: RefreshMode::default(),
            cycle_interval_secs: default_cycle_interval(),
            main_interval_secs: default_main_interval(),
            sku_interval_secs: default_sku_interval(),
            map_interval_secs: default_map_interval(),
            customer_interval_secs: default_customer_interval(),
            state_interval_secs: default_state_interval(),
        }
    }
}
