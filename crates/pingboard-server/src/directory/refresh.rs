use super::pingboard::{ApiResult, PingboardApiError, PingboardClient};
use super::{Directory, SharedDirectory};
use crate::config::{ApiConfig, Credentials};
use std::time::Duration;
use tracing::{error, info, warn};

/// Background task: rebuilds the directory from Pingboard on a fixed interval.
pub struct DirectoryRefresher {
    http: reqwest::Client,
    base_url: String,
    page_size: u32,
    interval: Duration,
    credentials: Option<Credentials>,
    directory: SharedDirectory,
}

impl DirectoryRefresher {
    pub fn new(config: &ApiConfig, directory: SharedDirectory) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|source| PingboardApiError::Request {
                what: "HTTP client".into(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            page_size: config.page_size,
            interval: config.refresh_interval(),
            credentials: config.resolved_credentials(),
            directory,
        })
    }

    #[cfg(test)]
    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    /// Pull the whole directory once and swap it in. On failure the previous
    /// snapshot stays in place. Returns the number of indexed users.
    pub async fn refresh_once(&self) -> ApiResult<usize> {
        let Some(credentials) = &self.credentials else {
            return Ok(0);
        };

        info!("Refreshing data...");
        let client =
            PingboardClient::authenticate(self.http.clone(), &self.base_url, credentials).await?;
        let company = client.fetch_company().await?;
        let users = client.fetch_users(self.page_size).await?;

        let directory = Directory::build(company, users);
        if directory.is_empty() {
            warn!("Pingboard returned no usable users for {}", directory.company.name);
        }
        let count = directory.len();
        self.directory.replace(directory).await;
        info!("Directory refreshed: {} users", count);
        Ok(count)
    }

    /// Refresh now and then every interval. Call via `tokio::spawn`.
    pub async fn run(self) {
        if !self.is_configured() {
            info!("No Pingboard client configuration; directory refresh disabled");
            return;
        }

        info!(
            "DirectoryRefresher started (interval: {}s)",
            self.interval.as_secs()
        );
        loop {
            if let Err(e) = self.refresh_once().await {
                error!("Directory refresh failed: {}", e);
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::pingboard::tests::{credentials, spawn, FakePingboard};
    use pingboard_core::IdentifierKind;

    fn config(base_url: String) -> ApiConfig {
        ApiConfig {
            base_url,
            page_size: 2,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_once_populates_directory() {
        let addr = spawn(FakePingboard::default()).await;
        let shared = SharedDirectory::new();
        let refresher = DirectoryRefresher::new(&config(format!("http://{}", addr)), shared.clone())
            .unwrap()
            .with_credentials(Some(credentials()));

        assert_eq!(refresher.refresh_once().await.unwrap(), 3);

        let directory = shared.current().await.unwrap();
        let trader = directory.lookup(IdentifierKind::Username, "trader").unwrap();
        assert_eq!(trader.manager.as_deref(), Some("boss"));
        assert_eq!(trader.url, "https://acme.pingboard.com/users/2");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let good = spawn(FakePingboard::default()).await;
        let bad = spawn(FakePingboard {
            bad_page_number: true,
            ..Default::default()
        })
        .await;
        let shared = SharedDirectory::new();

        DirectoryRefresher::new(&config(format!("http://{}", good)), shared.clone())
            .unwrap()
            .with_credentials(Some(credentials()))
            .refresh_once()
            .await
            .unwrap();

        let failing = DirectoryRefresher::new(&config(format!("http://{}", bad)), shared.clone())
            .unwrap()
            .with_credentials(Some(credentials()));
        assert!(failing.refresh_once().await.is_err());
        assert_eq!(shared.current().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unconfigured_refresher_does_nothing() {
        let shared = SharedDirectory::new();
        let refresher = DirectoryRefresher::new(&config("http://127.0.0.1:1".into()), shared.clone())
            .unwrap()
            .with_credentials(None);

        assert!(!refresher.is_configured());
        assert_eq!(refresher.refresh_once().await.unwrap(), 0);
        refresher.run().await;
        assert!(shared.current().await.is_none());
    }

    #[tokio::test]
    async fn test_mismatched_department_does_not_abort_refresh() {
        let addr = spawn(FakePingboard {
            mismatched_group: true,
            ..Default::default()
        })
        .await;
        let shared = SharedDirectory::new();
        let refresher = DirectoryRefresher::new(&config(format!("http://{}", addr)), shared.clone())
            .unwrap()
            .with_credentials(Some(credentials()));

        assert_eq!(refresher.refresh_once().await.unwrap(), 3);
        let directory = shared.current().await.unwrap();
        let boss = directory.lookup(IdentifierKind::Username, "boss").unwrap();
        assert_eq!(boss.department, None);
    }

    #[tokio::test]
    async fn test_stalled_api_times_out() {
        let addr = spawn(FakePingboard {
            stall_company: true,
            ..Default::default()
        })
        .await;
        let api = ApiConfig {
            request_timeout_secs: 1,
            ..config(format!("http://{}", addr))
        };
        let shared = SharedDirectory::new();
        let refresher = DirectoryRefresher::new(&api, shared.clone())
            .unwrap()
            .with_credentials(Some(credentials()));

        let result = tokio::time::timeout(Duration::from_secs(10), refresher.refresh_once())
            .await
            .expect("request timeout should end the refresh");
        let err = result.unwrap_err();
        assert!(matches!(err, PingboardApiError::Request { .. }), "{}", err);
        assert!(shared.current().await.is_none());
    }
}
