use std::sync::Arc;

use reqwest_middleware::ClientWithMiddleware;

use crate::{config::BaseHttpClientConfig, http_client::create_http_client};

/// Creates a default HTTP client for testing purposes.
pub fn create_test_http_client() -> Arc<ClientWithMiddleware> {
    match create_http_client(&BaseHttpClientConfig::default()) {
        Ok(client) => Arc::new(client),
        Err(e) => panic!("failed to build test HTTP client: {e}"),
    }
}
