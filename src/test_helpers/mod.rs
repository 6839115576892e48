//! A set of helpers for testing

mod config;
mod graphql;
mod http_client;
mod order;

pub use config::create_test_config;
pub use graphql::orders_page_body;
pub use http_client::create_test_http_client;
pub use order::OrderBuilder;
