//! HTTP client for the Pingboard profile endpoint.
//!
//! Implements [`ProfileFetcher`] over `GET {base}/plugins/{plugin_id}/user`,
//! so it plugs straight into [`pingboard_core::fetch_and_store`].
//!
//! # Example
//! ```rust,no_run
//! use pingboard_client::{ClientOptions, ProfileClient};
//! use pingboard_core::{fetch_and_store, ProfileStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ProfileClient::new(ClientOptions {
//!         base_url: "http://localhost:8065".into(),
//!         ..Default::default()
//!     }
//!     .with_header("Mattermost-User-ID", "cli"))?;
//!
//!     let store = ProfileStore::new();
//!     let result = fetch_and_store(&client, &store, "jsmith").await?;
//!     println!("found: {}", result.profile.is_some());
//!     Ok(())
//! }
//! ```
use async_trait::async_trait;
use log::debug;
use pingboard_core::{FetchError, IdentifierKind, ProfileFetcher, ProfileRecord};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use std::time::Duration;

/// Plugin id the profile endpoint is mounted under.
pub const DEFAULT_PLUGIN_ID: &str = "com.imc.mattermost-plugin-pingboard";

/// Connection settings for a [`ProfileClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Server root, e.g. `"http://localhost:8065"`.
    pub base_url: String,
    pub plugin_id: String,
    pub identifier_kind: IdentifierKind,
    pub timeout: Duration,
    /// Sent with every request (session or user headers supplied by the host).
    pub headers: Vec<(String, String)>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8065".to_string(),
            plugin_id: DEFAULT_PLUGIN_ID.to_string(),
            identifier_kind: IdentifierKind::Username,
            timeout: Duration::from_secs(10),
            headers: Vec::new(),
        }
    }
}

impl ClientOptions {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_bearer_token(self, token: &str) -> Self {
        self.with_header("Authorization", format!("Bearer {}", token))
    }
}

/// Fetches profiles from a running directory service.
#[derive(Debug, Clone)]
pub struct ProfileClient {
    http: reqwest::Client,
    user_url: String,
    identifier_kind: IdentifierKind,
}

impl ProfileClient {
    pub fn new(options: ClientOptions) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| anyhow::anyhow!("Invalid header name '{}': {}", name, e))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| anyhow::anyhow!("Invalid value for header '{}': {}", name, e))?;
            headers.insert(name, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            http,
            user_url: format!(
                "{}/plugins/{}/user",
                options.base_url.trim_end_matches('/'),
                options.plugin_id
            ),
            identifier_kind: options.identifier_kind,
        })
    }

    pub fn user_url(&self) -> &str {
        &self.user_url
    }

    pub fn identifier_kind(&self) -> IdentifierKind {
        self.identifier_kind
    }
}

fn transport(err: reqwest::Error) -> FetchError {
    FetchError::Transport(err.to_string())
}

#[async_trait]
impl ProfileFetcher for ProfileClient {
    async fn fetch(&self, identifier: &str) -> pingboard_core::Result<Option<ProfileRecord>> {
        debug!("GET {} ({}={})", self.user_url, self.identifier_kind, identifier);

        let resp = self
            .http
            .get(&self.user_url)
            .query(&[(self.identifier_kind.as_param(), identifier)])
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(transport)?;
        let profile: ProfileRecord = serde_json::from_slice(&bytes)?;
        Ok(Some(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_url_joins_base_and_plugin() {
        let client = ProfileClient::new(ClientOptions {
            base_url: "http://chat.example.com/".into(),
            plugin_id: "com.example.pingboard".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.user_url(),
            "http://chat.example.com/plugins/com.example.pingboard/user"
        );
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let options = ClientOptions::default().with_header("bad header", "x");
        assert!(ProfileClient::new(options).is_err());
    }
}
