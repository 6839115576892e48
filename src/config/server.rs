use serde::Deserialize;

/// Configuration for the dashboard HTTP API.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Whether the HTTP API is started alongside the refresh tasks.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Address and port for the HTTP server to listen on.
    #[serde(default = "default_api_server_listen_address")]
    pub listen_address: String,

    /// Optional API key protecting the manual retry endpoint.
    /// If not set in config, falls back to `SALEWATCH_API_KEY` env var.
    #[serde(rename = "api_key", default = "default_api_key_from_env")]
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { enabled: default_enabled(), listen_address: default_api_server_listen_address(), api_key: None }
    }
}

fn default_enabled() -> bool {
    true
}

/// Provides the default value for the listen address.
fn default_api_server_listen_address() -> String {
    "0.0.0.0:8080".to_string()
}

/// Loads the API key from the `SALEWATCH_API_KEY` environment variable.
fn default_api_key_from_env() -> Option<String> {
    std::env::var("SALEWATCH_API_KEY").ok()
}
