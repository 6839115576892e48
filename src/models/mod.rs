//! This module contains the data models for the dashboard.

pub mod aggregate;
pub mod metrics;
pub mod order;
pub mod time_window;

pub use aggregate::{AggregateResult, MetricData, MetricKind, UnknownMetricKind};
pub use metrics::{
    CustomerSegments, GeoRollup, MainMetrics, MapSummary, OrderLocation, SkuRanking, SkuSales,
    StatePerformance, StateStats,
};
pub use order::{Checkout, CustomerRef, LineItem, Order, ShippingAddress};
pub use time_window::{QueryRange, TimeWindow, TimeWindowError, WindowMode};
