//! Summary structures produced by the metric aggregators.

use serde::{Deserialize, Serialize};

/// Orders/revenue totals for the campaign window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MainMetrics {
    /// Paid orders in the window.
    pub total_orders: u64,
    /// Summed current total price of those orders.
    pub total_sales: f64,
    /// Paid orders carrying a campaign tag.
    pub tagged_orders: u64,
    /// Summed current total price of tagged orders.
    pub tagged_sales: f64,
    /// Checkouts created in the last 30 minutes without a completion.
    pub recent_carts: u64,
    /// `total_sales / total_orders`, 0 without orders.
    pub avg_order_value: f64,
    /// Distinct customers with a paid order in the window.
    pub unique_customers: u64,
    /// `total_orders / unique_customers`, 0 without customers.
    pub orders_per_customer: f64,
    /// `tagged_orders / total_orders * 100`, 0 without orders.
    pub conversion_rate: f64,
}

/// Units and revenue sold for one SKU.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkuSales {
    /// SKU identifier, `UNKNOWN` for line items without one.
    pub sku: String,
    /// Units sold.
    pub quantity: u64,
    /// Line revenue.
    pub revenue: f64,
}

/// Best-selling SKUs ranked by revenue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkuRanking {
    /// At most ten SKUs, revenue descending.
    pub top: Vec<SkuSales>,
    /// Number of distinct SKUs seen, including the `UNKNOWN` bucket.
    pub distinct_skus: usize,
    /// Units across every SKU, not just the top ten.
    pub total_quantity: u64,
    /// Revenue across every SKU, not just the top ten.
    pub total_revenue: f64,
}

impl SkuRanking {
    /// Units across the ranked SKUs.
    pub fn top_quantity(&self) -> u64 {
        self.top.iter().map(|s| s.quantity).sum()
    }

    /// Revenue across the ranked SKUs.
    pub fn top_revenue(&self) -> f64 {
        self.top.iter().map(|s| s.revenue).sum()
    }
}

/// Per-state aggregate of tagged orders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateStats {
    /// State or province name as reported by the shipping address.
    pub state: String,
    /// Summed order totals.
    pub revenue: f64,
    /// Summed line-item units.
    pub quantity: u64,
    /// Number of orders.
    pub orders: u64,
    /// Share of the rollup's total revenue, in percent.
    pub revenue_percentage: f64,
    /// Share of the rollup's total quantity, in percent.
    pub quantity_percentage: f64,
}

/// A single order plotted on the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderLocation {
    /// Latitude within the national bounding box.
    pub lat: f64,
    /// Longitude within the national bounding box.
    pub lon: f64,
    /// Order name.
    pub order_name: String,
    /// City, `Unknown` when missing.
    pub city: String,
    /// State, `Unknown` when missing.
    pub state: String,
    /// Order total.
    pub revenue: f64,
    /// Order units.
    pub quantity: u64,
}

/// Aggregate view of the plotted order locations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapSummary {
    /// Distinct city names among plotted orders.
    pub distinct_cities: usize,
    /// Number of plotted orders.
    pub plotted_orders: usize,
    /// Revenue of plotted orders.
    pub plotted_revenue: f64,
}

/// Geographic rollup of tagged orders with a shipping address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoRollup {
    /// Per-state aggregates in first-seen order.
    pub states: Vec<StateStats>,
    /// Orders with valid coordinates inside the bounding box.
    pub locations: Vec<OrderLocation>,
    /// Revenue across all states.
    pub total_revenue: f64,
    /// Units across all states.
    pub total_quantity: u64,
}

impl GeoRollup {
    /// Summary of the plotted locations.
    pub fn map_summary(&self) -> MapSummary {
        let mut cities: Vec<&str> = self.locations.iter().map(|l| l.city.as_str()).collect();
        cities.sort_unstable();
        cities.dedup();
        MapSummary {
            distinct_cities: cities.len(),
            plotted_orders: self.locations.len(),
            plotted_revenue: self.locations.iter().map(|l| l.revenue).sum(),
        }
    }

    /// The `limit` best states by revenue, ties keeping first-seen order.
    pub fn top_states(&self, limit: usize) -> Vec<StateStats> {
        let mut ranked = self.states.clone();
        ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
        ranked.truncate(limit);
        ranked
    }
}

/// Top-performing states derived from a geographic rollup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatePerformance {
    /// At most ten states, revenue descending.
    pub top_states: Vec<StateStats>,
    /// Number of states with at least one order.
    pub total_states: usize,
    /// Revenue across all states.
    pub total_revenue: f64,
    /// Units across all states.
    pub total_quantity: u64,
}

impl StatePerformance {
    /// The best state by revenue.
    pub fn top_state(&self) -> Option<&StateStats> {
        self.top_states.first()
    }
}

/// New versus returning customer split.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSegments {
    /// Customers classified as new.
    pub new_customers: u64,
    /// Customers classified as returning.
    pub returning_customers: u64,
    /// Orders placed by new customers.
    pub new_customer_orders: u64,
    /// Orders placed by returning customers.
    pub returning_customer_orders: u64,
    /// Distinct classified customers.
    pub total_customers: u64,
}

impl CustomerSegments {
    /// Share of new customers in percent, 0 without customers.
    pub fn new_customer_percentage(&self) -> f64 {
        if self.total_customers == 0 {
            return 0.0;
        }
        self.new_customers as f64 / self.total_customers as f64 * 100.0
    }
}
