use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use super::{Aggregator, AggregatorError};
use crate::{
    models::{MainMetrics, MetricData, MetricKind, Order, QueryRange},
    providers::{OrderFilter, OrderPaginator, OrderSelection},
};

/// Lookback of the recent-cart count.
const RECENT_CART_WINDOW_MINUTES: i64 = 30;

/// Order count and summed revenue of one query.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OrderTotals {
    /// Number of orders.
    pub orders: u64,
    /// Sum of current total prices.
    pub sales: f64,
}

impl OrderTotals {
    /// Totals over a slice of orders.
    pub fn from_orders(orders: &[Order]) -> Self {
        Self { orders: orders.len() as u64, sales: orders.iter().map(|o| o.total_price).sum() }
    }
}

/// Derives the main metrics from raw counts.
///
/// `unique_customers` is clamped to `overall.orders`.
pub fn compute_main_metrics(
    overall: OrderTotals,
    tagged: OrderTotals,
    unique_customers: u64,
    recent_carts: u64,
) -> MainMetrics {
    let unique_customers = unique_customers.min(overall.orders);
    let ratio = |num: f64, den: u64| if den == 0 { 0.0 } else { num / den as f64 };

    MainMetrics {
        total_orders: overall.orders,
        total_sales: overall.sales,
        tagged_orders: tagged.orders,
        tagged_sales: tagged.sales,
        recent_carts,
        avg_order_value: ratio(overall.sales, overall.orders),
        unique_customers,
        orders_per_customer: ratio(overall.orders as f64, unique_customers),
        conversion_rate: ratio(tagged.orders as f64, overall.orders) * 100.0,
    }
}

fn count_unique_customers(orders: &[Order]) -> u64 {
    orders.iter().filter_map(Order::customer_id).collect::<HashSet<_>>().len() as u64
}

/// Orders and revenue totals, overall and for tagged orders.
pub struct MainMetricsAggregator {
    paginator: OrderPaginator,
    target_tags: Vec<String>,
}

impl MainMetricsAggregator {
    /// Creates a new `MainMetricsAggregator`.
    pub fn new(paginator: OrderPaginator, target_tags: Vec<String>) -> Self {
        Self { paginator, target_tags }
    }

    /// Distinct customers with a paid order in the range, 0 on failure.
    async fn unique_customers(&self, filter: &OrderFilter) -> u64 {
        match self.paginator.fetch_all(filter, OrderSelection::CustomerIds).await {
            Ok(orders) => count_unique_customers(&orders),
            Err(e) => {
                tracing::warn!(error = %e, "Unique customer count unavailable, using 0.");
                0
            }
        }
    }

    /// Open checkouts created in the last 30 minutes, 0 on failure.
    async fn recent_carts(&self) -> u64 {
        let now = Utc::now();
        let since = now - Duration::minutes(RECENT_CART_WINDOW_MINUTES);
        match self.paginator.source().fetch_checkouts(since, now).await {
            Ok(checkouts) => checkouts.iter().filter(|c| c.is_open()).count() as u64,
            Err(e) => {
                tracing::warn!(error = %e, "Recent cart count unavailable, using 0.");
                0
            }
        }
    }
}

#[async_trait]
impl Aggregator for MainMetricsAggregator {
    fn kind(&self) -> MetricKind {
        MetricKind::Main
    }

    #[tracing::instrument(skip(self, range), level = "debug")]
    async fn aggregate(&self, range: &QueryRange) -> Result<MetricData, AggregatorError> {
        let overall_filter = OrderFilter::paid(range);
        let tagged_filter = overall_filter.clone().tagged(self.target_tags.iter().cloned());

        let (overall, tagged) = tokio::try_join!(
            self.paginator.fetch_all(&overall_filter, OrderSelection::Totals),
            self.paginator.fetch_all(&tagged_filter, OrderSelection::Totals),
        )?;
        let (unique_customers, recent_carts) =
            tokio::join!(self.unique_customers(&overall_filter), self.recent_carts());

        let metrics = compute_main_metrics(
            OrderTotals::from_orders(&overall),
            OrderTotals::from_orders(&tagged),
            unique_customers,
            recent_carts,
        );
        tracing::debug!(
            total_orders = metrics.total_orders,
            tagged_orders = metrics.tagged_orders,
            "Main metrics computed."
        );
        Ok(MetricData::Main(metrics))
    }
}
