use chrono::Utc;
use salewatch::models::{AggregateResult, MetricKind};

use crate::helpers::*;

#[tokio::test]
async fn metrics_are_pending_before_the_first_fetch() {
    let server = TestServer::new(None).await;

    let resp = server.get("/metrics").await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    for kind in MetricKind::ALL {
        assert_eq!(body["metrics"][kind.as_str()]["status"], "pending");
    }

    server.cleanup();
}

#[tokio::test]
async fn metric_endpoint_returns_cached_result() {
    let server = TestServer::new(None).await;
    store_result(&server.dashboard, MetricKind::Main, main_success());

    let resp = server.get("/metrics/main").await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["kind"], "main");
    assert_eq!(body["data"]["data"]["total_orders"], 4);
    assert_eq!(body["data"]["data"]["recent_carts"], 1);

    server.cleanup();
}

#[tokio::test]
async fn metric_endpoint_returns_cached_failure() {
    let server = TestServer::new(None).await;
    store_result(
        &server.dashboard,
        MetricKind::Sku,
        AggregateResult::failure("Failed to fetch orders", Utc::now()),
    );

    let body: serde_json::Value =
        server.get("/metrics/sku").await.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "failure");
    assert_eq!(body["error"], "Failed to fetch orders");

    server.cleanup();
}

#[tokio::test]
async fn unknown_metric_kind_returns_not_found() {
    let server = TestServer::new(None).await;

    let resp = server.get("/metrics/weather").await;
    assert_eq!(resp.status(), 404);

    let resp = (server.post("/metrics/weather/retry").await).send().await.unwrap();
    assert_eq!(resp.status(), 404);

    server.cleanup();
}

#[tokio::test]
async fn retry_clears_the_cached_result() {
    let server = TestServer::new(None).await;
    store_result(
        &server.dashboard,
        MetricKind::Customer,
        AggregateResult::failure("Throttled", Utc::now()),
    );

    let resp = (server.post("/metrics/customer/retry").await).send().await.unwrap();

    assert_eq!(resp.status(), 202);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["kind"], "customer");
    assert!(server.dashboard.slot(MetricKind::Customer).result().is_none());
    assert!(server.dashboard.slot(MetricKind::Customer).last_attempt().is_none());

    server.cleanup();
}

#[tokio::test]
async fn retry_requires_api_key_when_configured() {
    let server = TestServer::new(Some("test-key")).await;
    store_result(&server.dashboard, MetricKind::Main, main_success());

    let resp = (server.post("/metrics/main/retry").await).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    let resp = (server.post("/metrics/main/retry").await)
        .bearer_auth("wrong-key")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    assert!(server.dashboard.slot(MetricKind::Main).result().is_some());

    let resp =
        (server.post("/metrics/main/retry").await).bearer_auth("test-key").send().await.unwrap();
    assert_eq!(resp.status(), 202);
    assert!(server.dashboard.slot(MetricKind::Main).result().is_none());

    // Reads stay public.
    assert_eq!(server.get("/metrics").await.status(), 200);

    server.cleanup();
}
