use std::{net::SocketAddr, sync::Arc};

use chrono::Utc;
use reqwest::Client;
use salewatch::{
    config::AppConfig,
    http_server,
    models::{AggregateResult, MainMetrics, MetricData, MetricKind},
    scheduler::DashboardState,
    test_helpers::create_test_config,
};
use tokio::{task, time::Instant};

pub fn create_test_dashboard(config: &AppConfig) -> Arc<DashboardState> {
    let window = config.campaign.time_window().expect("Invalid test window");
    Arc::new(DashboardState::new(&config.refresh, window))
}

pub fn store_result(dashboard: &DashboardState, kind: MetricKind, result: AggregateResult) {
    dashboard
        .slot(kind)
        .try_begin()
        .expect("Slot is already fetching")
        .complete(result, Instant::now());
}

pub fn main_success() -> AggregateResult {
    AggregateResult::success(
        MetricData::Main(MainMetrics {
            total_orders: 4,
            total_sales: 250_000.0,
            tagged_orders: 2,
            tagged_sales: 125_000.0,
            avg_order_value: 62_500.0,
            unique_customers: 3,
            orders_per_customer: 4.0 / 3.0,
            conversion_rate: 50.0,
            recent_carts: 1,
        }),
        Utc::now(),
    )
}

pub struct TestServer {
    pub address: SocketAddr,
    pub server_handle: task::JoinHandle<()>,
    pub client: Client,
    pub dashboard: Arc<DashboardState>,
}

impl TestServer {
    pub async fn new(api_key: Option<&str>) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get address");
        drop(listener); // Release port for the app to use

        let mut config = create_test_config("http://127.0.0.1:1");
        config.server.listen_address = addr.to_string();
        config.server.api_key = api_key.map(String::from);
        let config = Arc::new(config);
        let dashboard = create_test_dashboard(&config);

        let server_dashboard = Arc::clone(&dashboard);
        let server_handle = task::spawn(async move {
            http_server::run_server_from_config(config, server_dashboard)
                .await
                .expect("Server failed");
        });

        // Wait for server to start
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;

        Self { address: addr, server_handle, client: Client::new(), dashboard }
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        let url = format!("http://{}{}", self.address, path);
        self.client.get(&url).send().await.expect("Request failed")
    }

    pub async fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("http://{}{}", self.address, path);
        self.client.post(&url)
    }

    pub fn cleanup(self) {
        self.server_handle.abort();
    }
}
