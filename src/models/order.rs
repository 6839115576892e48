//! Order records as consumed from the upstream order API.
//!
//! These are read-only views: nothing here is persisted, and every field that
//! a particular query shape does not select is left at its default.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single order returned by a paginated order query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Upstream global identifier.
    pub id: Option<String>,
    /// Human-facing order name, e.g. `#1042`.
    pub name: Option<String>,
    /// When the order was created.
    pub created_at: Option<DateTime<Utc>>,
    /// Current total price in shop currency.
    pub total_price: f64,
    /// The ordering customer, when the order is attached to one.
    pub customer: Option<CustomerRef>,
    /// Shipping destination.
    pub shipping_address: Option<ShippingAddress>,
    /// Line items of the order.
    pub line_items: Vec<LineItem>,
}

/// Reference to the customer that placed an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRef {
    /// Upstream customer identifier.
    pub id: String,
    /// When the customer account was created.
    pub created_at: Option<DateTime<Utc>>,
}

/// The shipping address of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// State or province name.
    pub province: Option<String>,
    /// City name.
    pub city: Option<String>,
    /// Latitude, when the upstream geocoded the address.
    pub latitude: Option<f64>,
    /// Longitude, when the upstream geocoded the address.
    pub longitude: Option<f64>,
}

/// One line of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Stock keeping unit; `None` or empty when the product has no SKU.
    pub sku: Option<String>,
    /// Units ordered.
    pub quantity: u64,
    /// Original line revenue (before order-level adjustments).
    pub revenue: f64,
}

/// A checkout (cart) object from the abandoned-checkout endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkout {
    /// Upstream identifier.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// Completion timestamp; absent while the cart is still open.
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl Order {
    /// Total units across all line items.
    pub fn total_quantity(&self) -> u64 {
        self.line_items.iter().map(|item| item.quantity).sum()
    }

    /// The customer identifier, if any.
    pub fn customer_id(&self) -> Option<&str> {
        self.customer.as_ref().map(|c| c.id.as_str()).filter(|id| !id.is_empty())
    }
}

impl Checkout {
    /// Whether the checkout has not been completed.
    pub fn is_open(&self) -> bool {
        self.completed_at.as_deref().is_none_or(str::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_quantity_sums_line_items() {
        let order = Order {
            line_items: vec![
                LineItem { sku: Some("A".into()), quantity: 2, revenue: 10.0 },
                LineItem { sku: None, quantity: 3, revenue: 5.0 },
            ],
            ..Default::default()
        };
        assert_eq!(order.total_quantity(), 5);
    }

    #[test]
    fn test_customer_id_ignores_blank_ids() {
        let mut order = Order::default();
        assert_eq!(order.customer_id(), None);

        order.customer = Some(CustomerRef { id: String::new(), created_at: None });
        assert_eq!(order.customer_id(), None);

        order.customer = Some(CustomerRef { id: "gid://shop/Customer/1".into(), created_at: None });
        assert_eq!(order.customer_id(), Some("gid://shop/Customer/1"));
    }

    #[test]
    fn test_checkout_is_open_without_completion() {
        assert!(Checkout::default().is_open());
        assert!(Checkout { completed_at: Some(String::new()), ..Default::default() }.is_open());
        assert!(
            !Checkout { completed_at: Some("2024-10-01T10:00:00Z".into()), ..Default::default() }
                .is_open()
        );
    }
}
