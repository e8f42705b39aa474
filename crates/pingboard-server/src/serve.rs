use crate::config::PingboardConfig;
use crate::directory::{DirectoryRefresher, SharedDirectory};
use tracing::{info, warn};

pub async fn run(config: PingboardConfig) -> anyhow::Result<()> {
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(anyhow::anyhow!(
            "Invalid configuration:\n  - {}",
            errors.join("\n  - ")
        ));
    }

    let addr = config.http_addr();
    info!("Starting Pingboard directory service v{}", env!("CARGO_PKG_VERSION"));
    info!("HTTP: {}", addr);
    info!("Profile endpoint: /plugins/{}/user", config.server.plugin_id);
    info!("Pingboard API: {}", config.pingboard.base_url);

    if config.security.require_user_header {
        info!("User header check: {}", config.security.user_header);
    } else {
        warn!("User header check disabled; profiles are open to all connections on {}", addr);
    }

    let directory = SharedDirectory::new();

    // Start directory refresh task
    let refresh_task = {
        let refresher = DirectoryRefresher::new(&config.pingboard, directory.clone())?;
        tokio::spawn(refresher.run())
    };

    // Start HTTP server
    let http_task = {
        let app_state = crate::http::AppState {
            directory: directory.clone(),
            plugin_id: config.server.plugin_id.clone(),
            start_time: std::time::Instant::now(),
        };
        let app = crate::http::build_app(app_state, &config.security);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind HTTP server on {}: {}", addr, e))?;

        tokio::spawn(async move {
            info!("Starting HTTP server on {}", addr);
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("HTTP server failed: {}", e);
            }
        })
    };

    info!("Pingboard directory service ready");

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, terminating...");

    http_task.abort();
    refresh_task.abort();

    Ok(())
}
