use pingboard_client::DEFAULT_PLUGIN_ID;
use pingboard_core::IdentifierKind;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Contents of `pingboard.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PingboardConfig {
    pub server: ServerConfig,
    pub pingboard: ApiConfig,
    pub security: SecurityConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listen address
    pub http_addr: SocketAddr,
    /// Profile routes are served under `/plugins/<plugin_id>/`
    pub plugin_id: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8065)),
            plugin_id: DEFAULT_PLUGIN_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub api_id: String,
    pub api_secret: String,
    pub base_url: String,
    pub page_size: u32,
    pub refresh_interval_secs: u64,
    /// Per-request timeout for Pingboard API calls
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_id: String::new(),
            api_secret: String::new(),
            base_url: "https://app.pingboard.com".to_string(),
            page_size: 200,
            refresh_interval_secs: 6 * 60 * 60,
            request_timeout_secs: 30,
        }
    }
}

/// Client credentials for the Pingboard API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"********")
            .finish()
    }
}

impl ApiConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Credentials from `PINGBOARD_API_ID` / `PINGBOARD_API_SECRET`, falling back to the file.
    pub fn resolved_credentials(&self) -> Option<Credentials> {
        self.credentials_with(
            std::env::var("PINGBOARD_API_ID").ok(),
            std::env::var("PINGBOARD_API_SECRET").ok(),
        )
    }

    /// Id and secret after applying the environment, either possibly empty.
    fn merged_with(&self, env_id: Option<String>, env_secret: Option<String>) -> (String, String) {
        let pick = |env: Option<String>, file: &str| {
            env.filter(|v| !v.is_empty())
                .unwrap_or_else(|| file.to_string())
        };
        (pick(env_id, &self.api_id), pick(env_secret, &self.api_secret))
    }

    fn credentials_with(
        &self,
        env_id: Option<String>,
        env_secret: Option<String>,
    ) -> Option<Credentials> {
        let (client_id, client_secret) = self.merged_with(env_id, env_secret);
        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }
        Some(Credentials {
            client_id,
            client_secret,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Reject requests that lack the authenticated-user header
    pub require_user_header: bool,
    pub user_header: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            require_user_header: true,
            user_header: "Mattermost-User-ID".to_string(),
        }
    }
}

/// Settings for the `lookup` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub identifier_kind: IdentifierKind,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            identifier_kind: IdentifierKind::Username,
            timeout_secs: 10,
        }
    }
}

impl PingboardConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load `path` if it exists; a missing file means defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Listen address, overridable with `PINGBOARD_HTTP_ADDR`.
    pub fn http_addr(&self) -> SocketAddr {
        std::env::var("PINGBOARD_HTTP_ADDR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.server.http_addr)
    }

    /// Human-readable problems; empty when the config is usable.
    /// Credentials are checked after the environment overrides apply.
    pub fn validate(&self) -> Vec<String> {
        self.validate_with(
            std::env::var("PINGBOARD_API_ID").ok(),
            std::env::var("PINGBOARD_API_SECRET").ok(),
        )
    }

    fn validate_with(&self, env_id: Option<String>, env_secret: Option<String>) -> Vec<String> {
        let mut errors = Vec::new();

        if self.server.plugin_id.trim().is_empty() {
            errors.push("[server] plugin_id must not be empty".to_string());
        }
        if self.server.plugin_id.contains('/') {
            errors.push("[server] plugin_id must not contain '/'".to_string());
        }

        let api = &self.pingboard;
        if api.page_size == 0 {
            errors.push("[pingboard] page_size must be greater than 0".to_string());
        }
        if api.refresh_interval_secs == 0 {
            errors.push("[pingboard] refresh_interval_secs must be greater than 0".to_string());
        }
        if !(api.base_url.starts_with("http://") || api.base_url.starts_with("https://")) {
            errors.push(format!(
                "[pingboard] base_url '{}' must start with http:// or https://",
                api.base_url
            ));
        }
        if api.request_timeout_secs == 0 {
            errors.push("[pingboard] request_timeout_secs must be greater than 0".to_string());
        }
        let (client_id, client_secret) = api.merged_with(env_id, env_secret);
        if client_id.is_empty() != client_secret.is_empty() {
            errors.push("[pingboard] api_id and api_secret must be set together".to_string());
        }

        if self.security.require_user_header && self.security.user_header.trim().is_empty() {
            errors.push(
                "[security] user_header must not be empty when require_user_header = true"
                    .to_string(),
            );
        }

        if self.client.timeout_secs == 0 {
            errors.push("[client] timeout_secs must be greater than 0".to_string());
        }

        errors
    }

    /// Copy safe to print: the API secret is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.pingboard.api_secret.is_empty() {
            copy.pingboard.api_secret = "********".to_string();
        }
        copy
    }
}
