//! Configuration module for the dashboard.

mod app_config;
mod campaign;
mod error;
mod fetch;
mod helpers;
mod http_base;
mod refresh;
mod server;
mod shop;

pub use app_config::AppConfig;
pub use campaign::CampaignConfig;
pub use error::AppConfigError;
pub use fetch::FetchConfig;
pub use helpers::{
    deserialize_duration_from_ms, deserialize_duration_from_seconds, deserialize_tags,
    serialize_duration_to_ms, serialize_duration_to_seconds,
};
pub use http_base::BaseHttpClientConfig;
pub use refresh::{RefreshConfig, RefreshMode};
pub use server::ServerConfig;
pub use shop::ShopConfig;
