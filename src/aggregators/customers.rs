use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Aggregator, AggregatorError};
use crate::{
    models::{CustomerSegments, MetricData, MetricKind, Order, QueryRange},
    providers::{OrderFilter, OrderPaginator, OrderSelection},
};

/// Maximum gap between account creation and order for a "new" customer.
const NEW_CUSTOMER_THRESHOLD_HOURS: i64 = 1;

/// Which order decides whether a customer is new or returning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationPolicy {
    /// The first order of the customer in upstream page order.
    #[default]
    FirstSeen,
    /// The customer's earliest order inside the window.
    EarliestOrder,
}

struct CustomerEntry {
    classified_at: DateTime<Utc>,
    is_new: bool,
    orders: u64,
}

fn is_new_customer(order_created: DateTime<Utc>, customer_created: DateTime<Utc>) -> bool {
    order_created - customer_created <= Duration::hours(NEW_CUSTOMER_THRESHOLD_HOURS)
}

/// Splits the customers of `orders` into new and returning.
///
/// Orders lacking a customer id, an order timestamp, or a customer creation
/// timestamp are skipped entirely.
pub fn segment_customers(orders: &[Order], policy: SegmentationPolicy) -> CustomerSegments {
    let mut customers: HashMap<&str, CustomerEntry> = HashMap::new();

    for order in orders {
        let Some(customer) = &order.customer else { continue };
        let (Some(order_created), Some(customer_created)) = (order.created_at, customer.created_at)
        else {
            continue;
        };
        if customer.id.is_empty() {
            continue;
        }

        let is_new = is_new_customer(order_created, customer_created);
        let entry = customers.entry(customer.id.as_str()).or_insert(CustomerEntry {
            classified_at: order_created,
            is_new,
            orders: 0,
        });
        if policy == SegmentationPolicy::EarliestOrder && order_created < entry.classified_at {
            entry.classified_at = order_created;
            entry.is_new = is_new;
        }
        entry.orders += 1;
    }

    let mut segments = CustomerSegments::default();
    for entry in customers.values() {
        if entry.is_new {
            segments.new_customers += 1;
            segments.new_customer_orders += entry.orders;
        } else {
            segments.returning_customers += 1;
            segments.returning_customer_orders += entry.orders;
        }
    }
    segments.total_customers = customers.len() as u64;
    segments
}

/// New versus returning split across all paid orders.
pub struct CustomerSegmentAggregator {
    paginator: OrderPaginator,
    policy: SegmentationPolicy,
}

impl CustomerSegmentAggregator {
    /// Creates a new `CustomerSegmentAggregator`.
    pub fn new(paginator: OrderPaginator, policy: SegmentationPolicy) -> Self {
        Self { paginator, policy }
    }
}

#[async_trait]
impl Aggregator for CustomerSegmentAggregator {
    fn kind(&self) -> MetricKind {
        MetricKind::Customer
    }

    #[tracing::instrument(skip(self, range), level = "debug")]
    async fn aggregate(&self, range: &QueryRange) -> Result<MetricData, AggregatorError> {
        let filter = OrderFilter::paid(range);
        let orders = self.paginator.fetch_all(&filter, OrderSelection::Segmentation).await?;
        let segments = segment_customers(&orders, self.policy);
        tracing::debug!(
            total_customers = segments.total_customers,
            new_customers = segments.new_customers,
            policy = ?self.policy,
            "Customer segmentation computed."
        );
        Ok(MetricData::Customer(segments))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::{
        config::FetchConfig,
        providers::{OrderPage, traits::MockOrderSource},
        test_helpers::OrderBuilder,
    };

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, 1, hour, minute, 0).unwrap()
    }

    fn order(customer: &str, created: DateTime<Utc>, customer_created: DateTime<Utc>) -> Order {
        OrderBuilder::new().created_at(created).customer(customer, Some(customer_created)).build()
    }

    #[test]
    fn test_customer_created_within_an_hour_is_new() {
        let orders = vec![
            order("new", at(10, 0), at(9, 0)),
            order("returning", at(10, 0), at(8, 59)),
        ];
        let segments = segment_customers(&orders, SegmentationPolicy::FirstSeen);
        assert_eq!(segments.new_customers, 1);
        assert_eq!(segments.returning_customers, 1);
        assert_eq!(segments.total_customers, 2);
    }

    #[test]
    fn test_account_created_after_order_is_new() {
        let orders = vec![order("late", at(10, 0), at(15, 0))];
        let segments = segment_customers(&orders, SegmentationPolicy::FirstSeen);
        assert_eq!(segments.new_customers, 1);
        assert_eq!(segments.new_customer_orders, 1);
        assert_eq!(segments.returning_customers, 0);
    }

    #[test]
    fn test_repeat_orders_increment_order_counts() {
        let orders = vec![
            order("c1", at(10, 0), at(9, 30)),
            order("c1", at(12, 0), at(9, 30)),
            order("c2", at(11, 0), at(1, 0)),
        ];
        let segments = segment_customers(&orders, SegmentationPolicy::FirstSeen);
        assert_eq!(segments.new_customers, 1);
        assert_eq!(segments.new_customer_orders, 2);
        assert_eq!(segments.returning_customer_orders, 1);
    }

    #[test]
    fn test_incomplete_orders_are_skipped() {
        let orders = vec![
            OrderBuilder::new().created_at(at(10, 0)).customer("c1", None).build(),
            OrderBuilder::new().customer("c2", Some(at(9, 0))).build(),
            OrderBuilder::new().created_at(at(10, 0)).build(),
        ];
        let segments = segment_customers(&orders, SegmentationPolicy::FirstSeen);
        assert_eq!(segments, CustomerSegments::default());
    }

    #[test]
    fn test_first_seen_depends_on_arrival_order() {
        // Page order lists the later order first.
        let orders = vec![order("c1", at(14, 0), at(9, 30)), order("c1", at(10, 0), at(9, 30))];

        let first_seen = segment_customers(&orders, SegmentationPolicy::FirstSeen);
        assert_eq!(first_seen.returning_customers, 1);
        assert_eq!(first_seen.returning_customer_orders, 2);

        let earliest = segment_customers(&orders, SegmentationPolicy::EarliestOrder);
        assert_eq!(earliest.new_customers, 1);
        assert_eq!(earliest.new_customer_orders, 2);
    }

    #[test]
    fn test_policy_deserializes_from_snake_case() {
        let policy: SegmentationPolicy = serde_json::from_str("\"earliest_order\"").unwrap();
        assert_eq!(policy, SegmentationPolicy::EarliestOrder);
        assert_eq!(SegmentationPolicy::default(), SegmentationPolicy::FirstSeen);
    }

    #[tokio::test]
    async fn test_aggregate_covers_all_paid_orders() {
        let mut source = MockOrderSource::new();
        source
            .expect_fetch_orders_page()
            .withf(|r| {
                r.selection == OrderSelection::Segmentation
                    && !r.filter.contains("tag:")
                    && r.filter.ends_with("financial_status:paid")
            })
            .times(1)
            .returning(|_| {
                Ok(OrderPage {
                    orders: vec![
                        order("c1", at(10, 0), at(9, 30)),
                        order("c2", at(11, 0), at(2, 0)),
                    ],
                    has_next_page: false,
                    end_cursor: None,
                })
            });

        let aggregator = CustomerSegmentAggregator::new(
            OrderPaginator::new(Arc::new(source), FetchConfig::default()),
            SegmentationPolicy::FirstSeen,
        );
        assert_eq!(aggregator.kind(), MetricKind::Customer);

        let range = QueryRange {
            start: Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 10, 2, 0, 0, 0).unwrap(),
        };
        let MetricData::Customer(segments) = aggregator.aggregate(&range).await.unwrap() else {
            panic!("unexpected data kind")
        };
        assert_eq!(segments.total_customers, 2);
        assert_eq!(segments.new_customers, 1);
        assert_eq!(segments.returning_customers, 1);
    }
}
