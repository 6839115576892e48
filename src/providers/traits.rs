//! This module defines the interface for fetching order data from the
//! upstream shop.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::models::{Checkout, Order};

/// Custom error type for a single upstream call.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Error when building an endpoint URL.
    #[error("Failed to parse endpoint URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The request could not be sent or the connection failed.
    #[error("Request error: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// The response body could not be read or decoded.
    #[error("Response decode error: {0}")]
    Decode(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("Upstream returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The query was rejected by the upstream GraphQL layer.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// The response was well-formed JSON but lacked expected content.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// The subset of order fields a query selects.
///
/// Each aggregator asks for the smallest shape it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderSelection {
    /// Current total price only.
    Totals,
    /// Customer identifiers only.
    CustomerIds,
    /// Line items with SKU, quantity and line revenue.
    LineItems,
    /// Name, total price, shipping address and line item quantities.
    Geography,
    /// Order and customer creation timestamps.
    Segmentation,
}

/// A request for a single page of orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Filter expression in the upstream query language.
    pub filter: String,
    /// Fields to select for each order.
    pub selection: OrderSelection,
    /// Continuation cursor, `None` for the first page.
    pub cursor: Option<String>,
    /// Maximum number of orders per page.
    pub page_size: u32,
}

/// A single page of orders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPage {
    /// Orders on this page.
    pub orders: Vec<Order>,
    /// Whether another page follows.
    pub has_next_page: bool,
    /// Cursor of the last order on this page.
    pub end_cursor: Option<String>,
}

/// A trait for a data source that can fetch orders and checkouts.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Fetches a single page of orders matching the request.
    async fn fetch_orders_page(&self, request: &PageRequest) -> Result<OrderPage, SourceError>;

    /// Fetches checkouts created within `[created_min, created_max]`.
    async fn fetch_checkouts(
        &self,
        created_min: DateTime<Utc>,
        created_max: DateTime<Utc>,
    ) -> Result<Vec<Checkout>, SourceError>;
}
