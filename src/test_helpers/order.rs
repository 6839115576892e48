//! A builder for creating `Order` instances for testing.

use chrono::{DateTime, Utc};

use crate::models::{CustomerRef, LineItem, Order, ShippingAddress};

/// A builder for creating `Order` instances for testing.
#[derive(Debug, Clone, Default)]
pub struct OrderBuilder {
    order: Order,
}

impl OrderBuilder {
    /// Creates a new `OrderBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the order id.
    pub fn id(mut self, id: &str) -> Self {
        self.order.id = Some(id.to_string());
        self
    }

    /// Sets the order name.
    pub fn name(mut self, name: &str) -> Self {
        self.order.name = Some(name.to_string());
        self
    }

    /// Sets the creation timestamp.
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.order.created_at = Some(created_at);
        self
    }

    /// Sets the current total price.
    pub fn total_price(mut self, total_price: f64) -> Self {
        self.order.total_price = total_price;
        self
    }

    /// Attaches a customer.
    pub fn customer(mut self, id: &str, created_at: Option<DateTime<Utc>>) -> Self {
        self.order.customer = Some(CustomerRef { id: id.to_string(), created_at });
        self
    }

    /// Sets the shipping address.
    pub fn shipping(
        mut self,
        province: Option<&str>,
        city: Option<&str>,
        coordinates: Option<(f64, f64)>,
    ) -> Self {
        self.order.shipping_address = Some(ShippingAddress {
            province: province.map(str::to_string),
            city: city.map(str::to_string),
            latitude: coordinates.map(|(lat, _)| lat),
            longitude: coordinates.map(|(_, lon)| lon),
        });
        self
    }

    /// Adds a line item.
    pub fn line_item(mut self, item: LineItem) -> Self {
        self.order.line_items.push(item);
        self
    }

    /// Builds the `Order`.
    pub fn build(self) -> Order {
        self.order
    }
}
