mod cli;
mod config;
mod directory;
mod http;
mod serve;

use clap::Parser;
use cli::{Cli, Commands};
use config::PingboardConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let config = PingboardConfig::load_or_default(&cli.config);
            serve::run(config).await
        }
        Commands::Lookup(args) => {
            let config = PingboardConfig::load_or_default(&cli.config);
            cli::lookup::run(args, &cli.server, &config).await
        }
        Commands::Tenure(args) => cli::tenure::run(args).await,
        Commands::Config(cmd) => cli::config_cmd::run(cmd, &cli.config).await,
    }
}
