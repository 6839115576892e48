//! This module provides the HTTP client used for upstream shop requests.

mod client;

pub use client::{HttpClientError, create_http_client};
