use serde::Deserialize;
use url::Url;

fn default_api_version() -> String {
    "2024-10".to_string()
}

/// Connection details of the upstream shop.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ShopConfig {
    /// Shop handle, i.e. the `<name>` in `<name>.myshopify.com`.
    pub name: String,

    /// Admin API access token.
    #[serde(default)]
    pub access_token: String,

    /// Admin API version, e.g. `2024-10`.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Overrides `https://<name>.myshopify.com`, e.g. for a proxy.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl ShopConfig {
    /// The shop origin without a trailing slash.
    fn origin(&self) -> String {
        match &self.base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}.myshopify.com", self.name),
        }
    }

    /// The GraphQL Admin API endpoint.
    pub fn graphql_endpoint(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}/admin/api/{}/graphql.json", self.origin(), self.api_version))
    }

    /// The REST endpoint listing checkouts.
    pub fn checkouts_endpoint(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}/admin/api/{}/checkouts.json", self.origin(), self.api_version))
    }
}
