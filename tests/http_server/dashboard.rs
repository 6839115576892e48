use chrono::Utc;
use salewatch::models::{AggregateResult, MetricKind};

use crate::helpers::*;

#[tokio::test]
async fn dashboard_renders_formatted_panels() {
    let server = TestServer::new(None).await;
    store_result(&server.dashboard, MetricKind::Main, main_success());
    store_result(
        &server.dashboard,
        MetricKind::State,
        AggregateResult::failure("Failed to fetch orders", Utc::now()),
    );

    let resp = server.get("/dashboard").await;

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    let panels = body["panels"].as_array().expect("panels array");
    assert_eq!(panels.len(), 5);

    let main = &panels[0];
    assert_eq!(main["status"], "ready");
    assert_eq!(main["stats"][1]["label"], "Total sales");
    assert_eq!(main["stats"][1]["value"], "₹2,50,000.00");
    assert_eq!(main["stats"][6]["value"], "1.33");
    assert_eq!(main["stats"][7]["value"], "50.0%");

    assert_eq!(panels[1]["status"], "pending");

    let state = &panels[4];
    assert_eq!(state["status"], "error");
    assert_eq!(state["error"], "Failed to fetch orders");

    server.cleanup();
}
