//! Construction of the shared HTTP client used against the upstream shop.
//!
//! Page-level retries are handled by the paginator, so the client itself
//! carries no retry middleware.

use reqwest::Client as ReqwestClient;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use thiserror::Error;

use crate::config::BaseHttpClientConfig;

/// Errors that can occur while building the HTTP client.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// An error occurred while building the underlying `reqwest::Client`.
    #[error("Failed to create HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Creates the HTTP client shared by every upstream call.
///
/// # Parameters:
/// - `config`: Connection pool and timeout settings
///
/// # Returns
/// A `ClientWithMiddleware` whose requests time out after
/// `config.request_timeout`
pub fn create_http_client(
    config: &BaseHttpClientConfig,
) -> Result<ClientWithMiddleware, HttpClientError> {
    let base_client = ReqwestClient::builder()
        .pool_max_idle_per_host(config.max_idle_per_host)
        .pool_idle_timeout(Some(config.idle_timeout))
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .build()?;

    Ok(ClientBuilder::new(base_client).build())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_create_http_client_with_defaults() {
        let client = create_http_client(&BaseHttpClientConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_client_reaches_server() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/ping").with_status(200).create_async().await;

        let config = BaseHttpClientConfig {
            request_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let client = create_http_client(&config).unwrap();
        let response = client.get(format!("{}/ping", server.url())).send().await.unwrap();

        assert!(response.status().is_success());
        mock.assert_async().await;
    }
}
