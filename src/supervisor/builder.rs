//! This module provides the `SupervisorBuilder` for constructing a `Supervisor`.

use std::sync::Arc;

use super::{Supervisor, SupervisorError};
use crate::{
    aggregators::build_aggregators,
    config::AppConfig,
    http_client::create_http_client,
    providers::{OrderPaginator, OrderSource, ShopifyClient},
    scheduler::DashboardState,
};

/// A builder for creating a `Supervisor` instance.
#[derive(Default)]
pub struct SupervisorBuilder {
    config: Option<AppConfig>,
    order_source: Option<Arc<dyn OrderSource>>,
}

impl SupervisorBuilder {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application configuration for the `Supervisor`.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the upstream order source. Defaults to a `ShopifyClient` built
    /// from the configuration.
    pub fn order_source(mut self, order_source: Arc<dyn OrderSource>) -> Self {
        self.order_source = Some(order_source);
        self
    }

    /// Validates the configuration and wires the services together.
    pub fn build(self) -> Result<Supervisor, SupervisorError> {
        let config = self.config.ok_or(SupervisorError::MissingConfig)?;
        config.validate()?;
        let window = config.campaign.time_window()?;

        let order_source = match self.order_source {
            Some(source) => source,
            None => {
                let client = create_http_client(&config.http_base_config)?;
                Arc::new(ShopifyClient::new(&config.shop, Arc::new(client))?)
            }
        };

        let paginator = OrderPaginator::new(order_source, config.fetch.clone());
        let aggregators =
            build_aggregators(paginator, &config.campaign.target_tags, config.segmentation);

        tracing::info!(
            shop = %config.shop.name,
            tags = ?config.campaign.target_tags,
            start = %window.start(),
            end = %window.end(),
            mode = ?window.mode(),
            "Campaign window resolved."
        );

        let dashboard = Arc::new(DashboardState::new(&config.refresh, window));
        Ok(Supervisor::new(config, dashboard, aggregators))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        aggregators::Aggregator,
        config::AppConfigError,
        models::MetricKind,
        providers::{OrderPage, traits::MockOrderSource},
        test_helpers::create_test_config,
    };

    fn empty_source() -> Arc<dyn OrderSource> {
        let mut source = MockOrderSource::new();
        source.expect_fetch_orders_page().returning(|_| {
            Ok(OrderPage { orders: vec![], has_next_page: false, end_cursor: None })
        });
        source.expect_fetch_checkouts().returning(|_, _| Ok(vec![]));
        Arc::new(source)
    }

    #[test]
    fn build_succeeds_with_valid_config() {
        let supervisor = SupervisorBuilder::new()
            .config(create_test_config("http://127.0.0.1:1"))
            .order_source(empty_source())
            .build()
            .unwrap();
        assert_eq!(supervisor.dashboard().slots().len(), 5);
        let kinds: Vec<MetricKind> = supervisor.aggregators.iter().map(|a| a.kind()).collect();
        assert_eq!(kinds, MetricKind::ALL);
        assert!(supervisor.dashboard().slots().iter().all(|s| s.result().is_none()));
    }

    #[test]
    fn build_creates_shopify_client_by_default() {
        let result =
            SupervisorBuilder::new().config(create_test_config("http://127.0.0.1:1")).build();
        assert!(result.is_ok());
    }

    #[test]
    fn build_fails_if_config_is_missing() {
        let result = SupervisorBuilder::new().order_source(empty_source()).build();
        assert!(matches!(result, Err(SupervisorError::MissingConfig)));
    }

    #[test]
    fn build_fails_on_invalid_config() {
        let mut config = create_test_config("http://127.0.0.1:1");
        config.shop.access_token = String::new();
        let result = SupervisorBuilder::new().config(config).order_source(empty_source()).build();
        assert!(matches!(
            result,
            Err(SupervisorError::Config(AppConfigError::Missing("shop.access_token")))
        ));
    }

    #[test]
    fn build_fails_on_reversed_window() {
        let mut config = create_test_config("http://127.0.0.1:1");
        config.campaign.end_date = "2024-09-30".into();
        let result = SupervisorBuilder::new().config(config).order_source(empty_source()).build();
        assert!(matches!(result, Err(SupervisorError::Config(AppConfigError::Window(_)))));
    }

    #[tokio::test]
    async fn run_returns_after_cancellation() {
        let mut config = create_test_config("http://127.0.0.1:1");
        config.server.enabled = false;
        config.shutdown_timeout = Duration::from_secs(5);
        let supervisor =
            SupervisorBuilder::new().config(config).order_source(empty_source()).build().unwrap();

        let dashboard = Arc::clone(supervisor.dashboard());
        let token = supervisor.cancellation_token();
        let handle = tokio::spawn(supervisor.run());

        // Every aggregator completes against the empty source.
        for _ in 0..50 {
            if dashboard.slots().iter().all(|s| s.result().is_some()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(dashboard.slots().iter().all(|s| s.result().is_some_and(|r| r.is_success())));

        token.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await.unwrap().unwrap();
        assert!(result.is_ok());
    }
}
