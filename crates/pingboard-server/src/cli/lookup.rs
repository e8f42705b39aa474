use crate::cli::LookupArgs;
use crate::config::PingboardConfig;
use anyhow::Result;
use pingboard_client::{ClientOptions, ProfileClient};
use pingboard_core::{ProfileAttributeView, ProfileStore};
use std::time::Duration;

pub async fn run(args: LookupArgs, server: &str, config: &PingboardConfig) -> Result<()> {
    let kind = args.by.unwrap_or(config.client.identifier_kind);
    let mut options = ClientOptions {
        base_url: server.to_string(),
        plugin_id: config.server.plugin_id.clone(),
        identifier_kind: kind,
        timeout: Duration::from_secs(config.client.timeout_secs),
        headers: Vec::new(),
    };
    if !config.security.user_header.trim().is_empty() {
        options = options.with_header(config.security.user_header.trim(), args.user_id.clone());
    }
    let client = ProfileClient::new(options)?;

    let store = ProfileStore::new();
    let mut view = ProfileAttributeView::new(args.identifier.clone());
    view.on_display(&client, &store).await.map_err(|e| {
        anyhow::anyhow!(
            "Lookup failed: {}. Is `pingboard serve` running at {}?",
            e,
            server
        )
    })?;

    match view.render(&store, chrono::Local::now().date_naive()) {
        Some(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        None => println!("No directory record for {}", args.identifier),
    }
    Ok(())
}
