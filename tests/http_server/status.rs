use salewatch::models::MetricKind;

use crate::helpers::*;

#[tokio::test]
async fn status_endpoint_returns_status_json() {
    let server = TestServer::new(None).await;

    let resp = server.get("/status").await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["shop"], "acme");
    assert_eq!(body["window"]["start"], "2024-09-30T18:30:00+00:00");
    assert_eq!(body["window"]["end"], "2024-10-01T12:30:00+00:00");
    assert_eq!(body["window_mode"], "fixed");
    assert_eq!(body["auto_refresh"], true);
    assert_eq!(body["refresh_mode"], "independent");
    assert!(body["uptime_secs"].as_u64().is_some());

    let aggregators = body["aggregators"].as_array().expect("aggregators array");
    assert_eq!(aggregators.len(), 5);
    assert_eq!(aggregators[0]["kind"], "main");
    assert_eq!(aggregators[0]["interval_secs"], 30);
    assert_eq!(aggregators[0]["has_result"], false);
    assert!(aggregators[0]["seconds_since_update"].is_null());

    server.cleanup();
}

#[tokio::test]
async fn status_reports_refresh_timing_after_a_fetch() {
    let server = TestServer::new(None).await;
    store_result(&server.dashboard, MetricKind::Main, main_success());

    let body: serde_json::Value =
        server.get("/status").await.json().await.expect("Failed to parse JSON");
    let main = &body["aggregators"][0];
    assert_eq!(main["has_result"], true);
    assert_eq!(main["last_success"], true);
    assert_eq!(main["fetching"], false);
    assert!(main["next_refresh_in_secs"].as_u64().is_some_and(|s| s <= 30));

    server.cleanup();
}
