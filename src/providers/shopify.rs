//! An `OrderSource` backed by the Shopify Admin API.
//!
//! Orders are read through the GraphQL endpoint, checkouts through the REST
//! endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::traits::{OrderPage, OrderSelection, OrderSource, PageRequest, SourceError};
use crate::{
    config::ShopConfig,
    models::{Checkout, CustomerRef, LineItem, Order, ShippingAddress, time_window::to_iso},
};

const ACCESS_TOKEN_HEADER: &str = "x-shopify-access-token";

/// Upper bound on line items selected per order.
const LINE_ITEMS_PER_ORDER: u32 = 50;

/// Upper bound on checkouts returned by one REST call.
const CHECKOUT_LIMIT: u32 = 250;

/// Maximum number of body bytes kept in a status error.
const ERROR_BODY_LIMIT: usize = 512;

/// Shopify Admin API client.
#[derive(Debug, Clone)]
pub struct ShopifyClient {
    client: Arc<ClientWithMiddleware>,
    graphql_url: Url,
    checkouts_url: Url,
    access_token: String,
}

impl ShopifyClient {
    /// Creates a new `ShopifyClient` for the configured shop.
    pub fn new(shop: &ShopConfig, client: Arc<ClientWithMiddleware>) -> Result<Self, SourceError> {
        Ok(Self {
            client,
            graphql_url: shop.graphql_endpoint()?,
            checkouts_url: shop.checkouts_endpoint()?,
            access_token: shop.access_token.clone(),
        })
    }

    fn headers(&self) -> Result<HeaderMap, SourceError> {
        let mut headers = HeaderMap::new();
        let token = HeaderValue::from_str(&self.access_token)
            .map_err(|e| SourceError::MalformedResponse(format!("Invalid access token: {e}")))?;
        headers.insert(HeaderName::from_static(ACCESS_TOKEN_HEADER), token);
        Ok(headers)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SourceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > ERROR_BODY_LIMIT {
            let mut cut = ERROR_BODY_LIMIT;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(SourceError::Status { status: status.as_u16(), body })
    }
}

/// Builds the GraphQL document for an orders page with the given selection.
pub fn orders_query(selection: OrderSelection) -> String {
    let money = "{ shopMoney { amount } }";
    let fields = match selection {
        OrderSelection::Totals => format!("id currentTotalPriceSet {money}"),
        OrderSelection::CustomerIds => "id customer { id }".to_string(),
        OrderSelection::LineItems => format!(
            "id lineItems(first: {LINE_ITEMS_PER_ORDER}) {{ edges {{ node {{ sku quantity \
             originalTotalSet {money} }} }} }}"
        ),
        OrderSelection::Geography => format!(
            "id name currentTotalPriceSet {money} \
             shippingAddress {{ city province latitude longitude }} \
             lineItems(first: {LINE_ITEMS_PER_ORDER}) {{ edges {{ node {{ quantity }} }} }}"
        ),
        OrderSelection::Segmentation => "id createdAt customer { id createdAt }".to_string(),
    };
    format!(
        "query ($cursor: String, $first: Int!, $query: String!) {{ \
         orders(first: $first, after: $cursor, query: $query, sortKey: CREATED_AT) {{ \
         pageInfo {{ hasNextPage endCursor }} \
         edges {{ node {{ {fields} }} }} }} }}"
    )
}

#[async_trait]
impl OrderSource for ShopifyClient {
    #[tracing::instrument(skip(self, request), fields(selection = ?request.selection), level = "debug")]
    async fn fetch_orders_page(&self, request: &PageRequest) -> Result<OrderPage, SourceError> {
        let payload = json!({
            "query": orders_query(request.selection),
            "variables": {
                "cursor": request.cursor,
                "first": request.page_size,
                "query": request.filter,
            }
        });

        let response = self
            .client
            .post(self.graphql_url.clone())
            .headers(self.headers()?)
            .json(&payload)
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let body: GraphQlResponse = response.json().await?;

        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(SourceError::GraphQl(messages.join("; ")));
        }

        let connection = body
            .data
            .and_then(|d| d.orders)
            .ok_or_else(|| SourceError::MalformedResponse("missing data.orders".into()))?;

        let orders = connection
            .edges
            .into_iter()
            .map(|edge| Order::try_from(edge.node))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            order_count = orders.len(),
            has_next_page = connection.page_info.has_next_page,
            "Fetched orders page."
        );

        Ok(OrderPage {
            orders,
            has_next_page: connection.page_info.has_next_page,
            end_cursor: connection.page_info.end_cursor,
        })
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn fetch_checkouts(
        &self,
        created_min: DateTime<Utc>,
        created_max: DateTime<Utc>,
    ) -> Result<Vec<Checkout>, SourceError> {
        let response = self
            .client
            .get(self.checkouts_url.clone())
            .headers(self.headers()?)
            .query(&[
                ("created_at_min", to_iso(&created_min)),
                ("created_at_max", to_iso(&created_max)),
                ("limit", CHECKOUT_LIMIT.to_string()),
            ])
            .send()
            .await?;
        let response = Self::check_status(response).await?;
        let body: CheckoutsResponse = response.json().await?;
        tracing::debug!(checkout_count = body.checkouts.len(), "Fetched checkouts.");
        Ok(body.checkouts)
    }
}

// --- Wire format ---

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<OrdersData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct OrdersData {
    orders: Option<Connection<OrderNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
struct Connection<T> {
    #[serde(default)]
    page_info: PageInfo,
    #[serde(default)]
    edges: Vec<Edge<T>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    #[serde(default)]
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderNode {
    id: Option<String>,
    name: Option<String>,
    created_at: Option<String>,
    current_total_price_set: Option<MoneyBag>,
    customer: Option<CustomerNode>,
    shipping_address: Option<AddressNode>,
    line_items: Option<Connection<LineItemNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoneyBag {
    shop_money: Money,
}

#[derive(Debug, Deserialize)]
struct Money {
    amount: Numeric,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerNode {
    id: Option<String>,
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddressNode {
    city: Option<String>,
    province: Option<String>,
    latitude: Option<Numeric>,
    longitude: Option<Numeric>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineItemNode {
    sku: Option<String>,
    quantity: Option<u64>,
    original_total_set: Option<MoneyBag>,
}

/// A number that may arrive either as JSON number or as decimal string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn value(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) => Some(*n),
            Numeric::Text(s) => s.trim().parse::<f64>().ok(),
        }
        .filter(|v| v.is_finite())
    }
}

#[derive(Debug, Deserialize)]
struct CheckoutsResponse {
    #[serde(default)]
    checkouts: Vec<Checkout>,
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok()).map(|dt| dt.with_timezone(&Utc))
}

fn money_amount(bag: Option<&MoneyBag>, field: &str) -> Result<f64, SourceError> {
    match bag {
        None => Ok(0.0),
        Some(bag) => bag.shop_money.amount.value().ok_or_else(|| {
            SourceError::MalformedResponse(format!("{field} is not a decimal amount"))
        }),
    }
}

impl TryFrom<OrderNode> for Order {
    type Error = SourceError;

    fn try_from(node: OrderNode) -> Result<Self, Self::Error> {
        let total_price = money_amount(node.current_total_price_set.as_ref(), "currentTotalPriceSet")?;

        let line_items = node
            .line_items
            .map(|conn| conn.edges)
            .unwrap_or_default()
            .into_iter()
            .map(|edge| {
                let item = edge.node;
                Ok(LineItem {
                    sku: item.sku.filter(|s| !s.is_empty()),
                    quantity: item.quantity.unwrap_or(1),
                    revenue: money_amount(item.original_total_set.as_ref(), "originalTotalSet")?,
                })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;

        let customer = node.customer.and_then(|c| {
            c.id.map(|id| CustomerRef { id, created_at: parse_timestamp(c.created_at.as_deref()) })
        });

        let shipping_address = node.shipping_address.map(|a| ShippingAddress {
            province: a.province,
            city: a.city,
            latitude: a.latitude.as_ref().and_then(Numeric::value),
            longitude: a.longitude.as_ref().and_then(Numeric::value),
        });

        Ok(Order {
            id: node.id,
            name: node.name,
            created_at: parse_timestamp(node.created_at.as_deref()),
            total_price,
            customer,
            shipping_address,
            line_items,
        })
    }
}
