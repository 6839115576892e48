//! Builders for upstream response bodies.

use serde_json::{Value, json};

/// Builds a GraphQL orders page body holding `count` orders of `amount` each.
///
/// Every order carries one line item and a shipping address in Maharashtra.
pub fn orders_page_body(count: usize, amount: &str, end_cursor: Option<&str>) -> Value {
    let edges: Vec<Value> = (0..count)
        .map(|i| {
            json!({ "node": {
                "id": format!("gid://shopify/Order/{i}"),
                "name": format!("#{}", 1000 + i),
                "createdAt": "2024-10-01T10:00:00Z",
                "currentTotalPriceSet": { "shopMoney": { "amount": amount } },
                "customer": {
                    "id": format!("gid://shopify/Customer/{}", i % 7),
                    "createdAt": "2024-10-01T09:30:00Z"
                },
                "shippingAddress": {
                    "city": "Pune",
                    "province": "Maharashtra",
                    "latitude": 18.52,
                    "longitude": 73.85
                },
                "lineItems": { "edges": [
                    { "node": {
                        "sku": "TEE-1",
                        "quantity": 1,
                        "originalTotalSet": { "shopMoney": { "amount": amount } }
                    } }
                ] }
            } })
        })
        .collect();

    json!({ "data": { "orders": {
        "pageInfo": { "hasNextPage": end_cursor.is_some(), "endCursor": end_cursor },
        "edges": edges
    } } })
}
