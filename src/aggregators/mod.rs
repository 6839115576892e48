//! Metric aggregators.
//!
//! Each aggregator runs one or more paginated order queries for a time range
//! and reduces the orders into a summary. Reductions are plain functions over
//! order slices so they can be tested without an upstream.

mod customers;
mod geo;
mod sku;
mod states;
mod totals;

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

pub use customers::{CustomerSegmentAggregator, SegmentationPolicy, segment_customers};
pub use geo::{GeoAggregator, rollup_geography, within_bounds};
pub use sku::{SkuAggregator, TOP_SKU_LIMIT, rank_skus};
pub use states::{StateAggregator, TOP_STATE_LIMIT, state_performance};
pub use totals::{MainMetricsAggregator, OrderTotals, compute_main_metrics};

use crate::{
    models::{MetricData, MetricKind, QueryRange},
    providers::{FetchError, OrderPaginator},
};

/// Custom error type for aggregator runs.
#[derive(Error, Debug)]
pub enum AggregatorError {
    /// A primary paginated query failed.
    #[error("Failed to fetch orders: {0}")]
    Fetch(#[from] FetchError),
}

/// A unit that fetches orders and reduces them into one summary.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Aggregator: Send + Sync {
    /// The kind of summary this aggregator produces.
    fn kind(&self) -> MetricKind;

    /// Fetches and reduces the orders of `range`.
    async fn aggregate(&self, range: &QueryRange) -> Result<MetricData, AggregatorError>;
}

/// Builds the five aggregators in their fixed evaluation order.
pub fn build_aggregators(
    paginator: OrderPaginator,
    target_tags: &[String],
    segmentation: SegmentationPolicy,
) -> Vec<Arc<dyn Aggregator>> {
    vec![
        Arc::new(MainMetricsAggregator::new(paginator.clone(), target_tags.to_vec())),
        Arc::new(SkuAggregator::new(paginator.clone(), target_tags.to_vec())),
        Arc::new(GeoAggregator::new(paginator.clone(), target_tags.to_vec())),
        Arc::new(CustomerSegmentAggregator::new(paginator.clone(), segmentation)),
        Arc::new(StateAggregator::new(paginator, target_tags.to_vec())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::FetchConfig, providers::traits::MockOrderSource};

    #[test]
    fn test_build_aggregators_in_fixed_order() {
        let paginator =
            OrderPaginator::new(Arc::new(MockOrderSource::new()), FetchConfig::default());
        let aggregators =
            build_aggregators(paginator, &["sale".to_string()], SegmentationPolicy::default());
        let kinds: Vec<MetricKind> = aggregators.iter().map(|a| a.kind()).collect();
        assert_eq!(kinds, MetricKind::ALL.to_vec());
    }
}
