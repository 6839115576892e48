use std::collections::HashMap;

use async_trait::async_trait;

use super::{Aggregator, AggregatorError};
use crate::{
    models::{GeoRollup, MetricData, MetricKind, Order, OrderLocation, QueryRange, StateStats},
    providers::{OrderFilter, OrderPaginator, OrderSelection},
};

const MIN_LATITUDE: f64 = 6.0;
const MAX_LATITUDE: f64 = 37.0;
const MIN_LONGITUDE: f64 = 68.0;
const MAX_LONGITUDE: f64 = 97.0;

const UNKNOWN: &str = "Unknown";

/// Whether a coordinate lies inside the plotted region (bounds inclusive).
pub fn within_bounds(lat: f64, lon: f64) -> bool {
    (MIN_LATITUDE..=MAX_LATITUDE).contains(&lat) && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&lon)
}

fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 { part / total * 100.0 } else { 0.0 }
}

/// Rolls orders with a shipping address up per state and collects plottable
/// order locations.
///
/// An order counts toward its state whenever the province is present, even
/// if its coordinates are missing or out of bounds. Totals and percentages
/// cover state-attributed orders only.
pub fn rollup_geography(orders: &[Order]) -> GeoRollup {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut states: Vec<StateStats> = Vec::new();
    let mut locations = Vec::new();
    let mut total_revenue = 0.0;
    let mut total_quantity = 0;

    for order in orders {
        let Some(address) = &order.shipping_address else { continue };
        let revenue = order.total_price;
        let quantity = order.total_quantity();
        let province = address.province.as_deref().filter(|p| !p.is_empty());

        if let (Some(lat), Some(lon)) = (address.latitude, address.longitude) {
            if within_bounds(lat, lon) {
                locations.push(OrderLocation {
                    lat,
                    lon,
                    order_name: order.name.clone().unwrap_or_default(),
                    city: address.city.clone().filter(|c| !c.is_empty()).unwrap_or(UNKNOWN.into()),
                    state: province.unwrap_or(UNKNOWN).to_string(),
                    revenue,
                    quantity,
                });
            }
        }

        if let Some(province) = province {
            let slot = *index.entry(province.to_string()).or_insert_with(|| {
                states.push(StateStats { state: province.to_string(), ..Default::default() });
                states.len() - 1
            });
            let stats = &mut states[slot];
            stats.revenue += revenue;
            stats.quantity += quantity;
            stats.orders += 1;
            total_revenue += revenue;
            total_quantity += quantity;
        }
    }

    for stats in &mut states {
        stats.revenue_percentage = percentage(stats.revenue, total_revenue);
        stats.quantity_percentage = percentage(stats.quantity as f64, total_quantity as f64);
    }

    GeoRollup { states, locations, total_revenue, total_quantity }
}

/// Per-state rollup and order locations of tagged orders.
pub struct GeoAggregator {
    paginator: OrderPaginator,
    target_tags: Vec<String>,
}

impl GeoAggregator {
    /// Creates a new `GeoAggregator`.
    pub fn new(paginator: OrderPaginator, target_tags: Vec<String>) -> Self {
        Self { paginator, target_tags }
    }

    /// Fetches and rolls up tagged orders; shared with the state aggregator.
    pub(super) async fn rollup(
        paginator: &OrderPaginator,
        target_tags: &[String],
        range: &QueryRange,
    ) -> Result<GeoRollup, AggregatorError> {
        let filter = OrderFilter::paid(range).tagged(target_tags.iter().cloned());
        let orders = paginator.fetch_all(&filter, OrderSelection::Geography).await?;
        Ok(rollup_geography(&orders))
    }
}

#[async_trait]
impl Aggregator for GeoAggregator {
    fn kind(&self) -> MetricKind {
        MetricKind::Map
    }

    #[tracing::instrument(skip(self, range), level = "debug")]
    async fn aggregate(&self, range: &QueryRange) -> Result<MetricData, AggregatorError> {
        let rollup = Self::rollup(&self.paginator, &self.target_tags, range).await?;
        tracing::debug!(
            states = rollup.states.len(),
            locations = rollup.locations.len(),
            "Geographic rollup computed."
        );
        Ok(MetricData::Map(rollup))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{
        config::FetchConfig,
        models::LineItem,
        providers::{OrderPage, traits::MockOrderSource},
        test_helpers::OrderBuilder,
    };

    fn order(province: Option<&str>, coords: Option<(f64, f64)>, revenue: f64, qty: u64) -> Order {
        OrderBuilder::new()
            .name("#1")
            .total_price(revenue)
            .shipping(province, Some("Pune"), coords)
            .line_item(LineItem { sku: None, quantity: qty, revenue })
            .build()
    }

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(within_bounds(6.0, 68.0));
        assert!(within_bounds(37.0, 97.0));
        assert!(!within_bounds(5.99, 75.0));
        assert!(!within_bounds(20.0, 97.01));
    }

    #[test]
    fn test_rollup_groups_by_state() {
        let orders = vec![
            order(Some("Maharashtra"), Some((18.5, 73.8)), 300.0, 3),
            order(Some("Karnataka"), Some((12.9, 77.6)), 100.0, 1),
            order(Some("Maharashtra"), None, 100.0, 1),
        ];
        let rollup = rollup_geography(&orders);

        assert_eq!(rollup.states.len(), 2);
        assert_eq!(rollup.states[0].state, "Maharashtra");
        assert_eq!(rollup.states[0].orders, 2);
        assert_eq!(rollup.states[0].revenue, 400.0);
        assert_eq!(rollup.states[0].quantity, 4);
        assert_eq!(rollup.states[0].revenue_percentage, 80.0);
        assert_eq!(rollup.states[1].quantity_percentage, 20.0);
        assert_eq!(rollup.total_revenue, 500.0);
        assert_eq!(rollup.locations.len(), 2);
    }

    #[test]
    fn test_out_of_bounds_location_still_counts_for_state() {
        let orders = vec![order(Some("Nevada"), Some((36.1, -115.1)), 50.0, 1)];
        let rollup = rollup_geography(&orders);
        assert!(rollup.locations.is_empty());
        assert_eq!(rollup.states.len(), 1);
        assert_eq!(rollup.states[0].revenue_percentage, 100.0);
    }

    #[test]
    fn test_location_without_state_is_plotted_as_unknown() {
        let orders = vec![order(None, Some((28.6, 77.2)), 70.0, 2)];
        let rollup = rollup_geography(&orders);
        assert!(rollup.states.is_empty());
        assert_eq!(rollup.total_revenue, 0.0);
        assert_eq!(rollup.locations.len(), 1);
        assert_eq!(rollup.locations[0].state, "Unknown");
        assert_eq!(rollup.locations[0].quantity, 2);
    }

    #[test]
    fn test_orders_without_address_are_ignored() {
        let orders = vec![OrderBuilder::new().total_price(10.0).build()];
        let rollup = rollup_geography(&orders);
        assert!(rollup.states.is_empty());
        assert!(rollup.locations.is_empty());
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let orders = vec![
            order(Some("A"), None, 33.3, 1),
            order(Some("B"), None, 33.3, 2),
            order(Some("C"), None, 33.4, 4),
        ];
        let rollup = rollup_geography(&orders);
        let revenue: f64 = rollup.states.iter().map(|s| s.revenue_percentage).sum();
        let quantity: f64 = rollup.states.iter().map(|s| s.quantity_percentage).sum();
        assert!((revenue - 100.0).abs() < 1e-9);
        assert!((quantity - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentages_are_zero_without_revenue() {
        let orders = vec![order(Some("A"), None, 0.0, 0), order(Some("B"), None, 0.0, 0)];
        let rollup = rollup_geography(&orders);
        assert!(rollup.states.iter().all(|s| s.revenue_percentage == 0.0));
        assert!(rollup.states.iter().all(|s| s.quantity_percentage == 0.0));
    }

    #[tokio::test]
    async fn test_aggregate_fetches_tagged_orders_with_geography_shape() {
        let mut source = MockOrderSource::new();
        source
            .expect_fetch_orders_page()
            .withf(|r| {
                r.selection == OrderSelection::Geography
                    && r.filter.starts_with("(tag:sale OR tag:diwali) AND ")
            })
            .times(1)
            .returning(|_| {
                Ok(OrderPage {
                    orders: vec![order(Some("Goa"), Some((15.5, 73.8)), 40.0, 2)],
                    has_next_page: false,
                    end_cursor: None,
                })
            });

        let aggregator = GeoAggregator::new(
            OrderPaginator::new(Arc::new(source), FetchConfig::default()),
            vec!["sale".into(), "diwali".into()],
        );
        assert_eq!(aggregator.kind(), MetricKind::Map);

        let range = QueryRange {
            start: Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 10, 2, 0, 0, 0).unwrap(),
        };
        let MetricData::Map(rollup) = aggregator.aggregate(&range).await.unwrap() else {
            panic!("unexpected data kind")
        };
        assert_eq!(rollup.states.len(), 1);
        assert_eq!(rollup.states[0].state, "Goa");
        assert_eq!(rollup.locations.len(), 1);
    }
}
