use std::collections::HashMap;

use async_trait::async_trait;

use super::{Aggregator, AggregatorError};
use crate::{
    models::{MetricData, MetricKind, Order, QueryRange, SkuRanking, SkuSales},
    providers::{OrderFilter, OrderPaginator, OrderSelection},
};

/// Number of SKUs kept in the ranking.
pub const TOP_SKU_LIMIT: usize = 10;

/// Bucket for line items without a SKU.
const UNKNOWN_SKU: &str = "UNKNOWN";

/// Accumulates quantity and revenue per SKU and ranks the SKUs by revenue.
///
/// Equal revenues keep first-encountered order.
pub fn rank_skus(orders: &[Order]) -> SkuRanking {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skus: Vec<SkuSales> = Vec::new();

    for item in orders.iter().flat_map(|o| &o.line_items) {
        let sku = item.sku.as_deref().filter(|s| !s.is_empty()).unwrap_or(UNKNOWN_SKU);
        let slot = *index.entry(sku.to_string()).or_insert_with(|| {
            skus.push(SkuSales { sku: sku.to_string(), quantity: 0, revenue: 0.0 });
            skus.len() - 1
        });
        skus[slot].quantity += item.quantity;
        skus[slot].revenue += item.revenue;
    }

    let total_quantity = skus.iter().map(|s| s.quantity).sum();
    let total_revenue = skus.iter().map(|s| s.revenue).sum();
    let distinct_skus = skus.len();

    // `sort_by` is stable.
    skus.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    skus.truncate(TOP_SKU_LIMIT);

    SkuRanking { top: skus, distinct_skus, total_quantity, total_revenue }
}

/// Top SKUs of tagged orders.
pub struct SkuAggregator {
    paginator: OrderPaginator,
    target_tags: Vec<String>,
}

impl SkuAggregator {
    /// Creates a new `SkuAggregator`.
    pub fn new(paginator: OrderPaginator, target_tags: Vec<String>) -> Self {
        Self { paginator, target_tags }
    }
}

#[async_trait]
impl Aggregator for SkuAggregator {
    fn kind(&self) -> MetricKind {
        MetricKind::Sku
    }

    #[tracing::instrument(skip(self, range), level = "debug")]
    async fn aggregate(&self, range: &QueryRange) -> Result<MetricData, AggregatorError> {
        let filter = OrderFilter::paid(range).tagged(self.target_tags.iter().cloned());
        let orders = self.paginator.fetch_all(&filter, OrderSelection::LineItems).await?;
        let ranking = rank_skus(&orders);
        tracing::debug!(distinct_skus = ranking.distinct_skus, "SKU ranking computed.");
        Ok(MetricData::Sku(ranking))
    }
}
