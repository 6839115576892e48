#![warn(missing_docs)]
//! Salewatch is a live sales dashboard for a promotional campaign on a
//! Shopify-style store. It polls the store's order API, reduces the orders
//! into five summaries and serves them over HTTP.

pub mod aggregators;
pub mod cmd;
pub mod config;
pub mod display;
pub mod http_client;
pub mod http_server;
pub mod models;
pub mod providers;
pub mod scheduler;
pub mod supervisor;
pub mod test_helpers;
