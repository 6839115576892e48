use std::time::Duration;

use config::{Config, Environment, File};
use serde::Deserialize;

use super::{
    AppConfigError, BaseHttpClientConfig, CampaignConfig, FetchConfig, RefreshConfig,
    ServerConfig, ShopConfig, deserialize_duration_from_seconds, serialize_duration_to_seconds,
};
use crate::{aggregators::SegmentationPolicy, models::MetricKind};

/// Provides the default value for shutdown_timeout.
fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Application configuration for the dashboard.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Upstream shop connection.
    pub shop: ShopConfig,

    /// Campaign tags and sale period.
    pub campaign: CampaignConfig,

    /// Per-aggregator refresh cadence.
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Page retry policy for paginated walks.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// New-versus-returning classification policy.
    #[serde(default)]
    pub segmentation: SegmentationPolicy,

    /// Configuration for the base HTTP client.
    #[serde(default)]
    pub http_base_config: BaseHttpClientConfig,

    /// HTTP API configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// The maximum time in seconds to wait for graceful shutdown.
    #[serde(
        deserialize_with = "deserialize_duration_from_seconds",
        serialize_with = "serialize_duration_to_seconds",
        default = "default_shutdown_timeout"
    )]
    pub shutdown_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shop: ShopConfig::default(),
            campaign: CampaignConfig::default(),
            refresh: RefreshConfig::default(),
            fetch: FetchConfig::default(),
            segmentation: SegmentationPolicy::default(),
            http_base_config: BaseHttpClientConfig::default(),
            server: ServerConfig::default(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl AppConfig {
    /// Creates a new `AppConfig` by reading `app.yaml` from the configuration
    /// directory, layering `SALEWATCH__*` environment variables on top, and
    /// validating the result.
    pub fn new(config_dir: Option<&str>) -> Result<Self, AppConfigError> {
        let config_dir_str = config_dir.unwrap_or("configs");
        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/app.yaml", config_dir_str)))
            .add_source(Environment::with_prefix("SALEWATCH").separator("__"))
            .build()?;
        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the rest of the application relies on.
    pub fn validate(&self) -> Result<(), AppConfigError> {
        if self.shop.access_token.trim().is_empty() {
            return Err(AppConfigError::Missing("shop.access_token"));
        }
        if self.shop.name.trim().is_empty() && self.shop.base_url.is_none() {
            return Err(AppConfigError::Missing("shop.name"));
        }
        if self.campaign.target_tags.is_empty() {
            return Err(AppConfigError::Missing("campaign.target_tags"));
        }

        self.shop.graphql_endpoint()?;
        self.campaign.time_window()?;

        if self.refresh.cycle_interval_secs.is_zero() {
            return Err(AppConfigError::ZeroInterval("cycle"));
        }
        for kind in MetricKind::ALL {
            if self.refresh.interval_for(kind).is_zero() {
                return Err(AppConfigError::ZeroInterval(kind.as_str()));
            }
        }

        Ok(())
    }

    /// Creates a new `AppConfigBuilder` for testing purposes.
    #[cfg(test)]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances for testing.
#[cfg(test)]
#[derive(Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn shop(mut self, name: &str, access_token: &str) -> Self {
        self.config.shop.name = name.to_string();
        self.config.shop.access_token = access_token.to_string();
        self
    }

    pub fn tags(mut self, tags: &[&str]) -> Self {
        self.config.campaign.target_tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn period(mut self, start: (&str, &str), end: (&str, &str)) -> Self {
        self.config.campaign.start_date = start.0.to_string();
        self.config.campaign.start_time = start.1.to_string();
        self.config.campaign.end_date = end.0.to_string();
        self.config.campaign.end_time = end.1.to_string();
        self
    }

    pub fn timezone(mut self, timezone: &str) -> Self {
        self.config.campaign.timezone = timezone.to_string();
        self
    }

    pub fn refresh(mut self, refresh: RefreshConfig) -> Self {
        self.config.refresh = refresh;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
