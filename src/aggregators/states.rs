use async_trait::async_trait;

use super::{Aggregator, AggregatorError, geo::GeoAggregator};
use crate::{
    models::{GeoRollup, MetricData, MetricKind, QueryRange, StatePerformance},
    providers::OrderPaginator,
};

/// Number of states kept in the performance table.
pub const TOP_STATE_LIMIT: usize = 10;

/// Ranks the states of a geographic rollup by revenue.
pub fn state_performance(rollup: &GeoRollup) -> StatePerformance {
    StatePerformance {
        top_states: rollup.top_states(TOP_STATE_LIMIT),
        total_states: rollup.states.len(),
        total_revenue: rollup.total_revenue,
        total_quantity: rollup.total_quantity,
    }
}

/// State performance table, computed from the same rollup as the map.
pub struct StateAggregator {
    paginator: OrderPaginator,
    target_tags: Vec<String>,
}

impl StateAggregator {
    /// Creates a new `StateAggregator`.
    pub fn new(paginator: OrderPaginator, target_tags: Vec<String>) -> Self {
        Self { paginator, target_tags }
    }
}

#[async_trait]
impl Aggregator for StateAggregator {
    fn kind(&self) -> MetricKind {
        MetricKind::State
    }

    #[tracing::instrument(skip(self, range), level = "debug")]
    async fn aggregate(&self, range: &QueryRange) -> Result<MetricData, AggregatorError> {
        let rollup = GeoAggregator::rollup(&self.paginator, &self.target_tags, range).await?;
        let performance = state_performance(&rollup);
        tracing::debug!(total_states = performance.total_states, "State performance computed.");
        Ok(MetricData::State(performance))
    }
}
