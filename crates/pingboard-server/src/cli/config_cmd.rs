use crate::cli::ConfigCommands;
use crate::config::PingboardConfig;
use anyhow::Result;
use std::path::Path;

pub async fn run(cmd: ConfigCommands, config_path: &Path) -> Result<()> {
    match cmd {
        ConfigCommands::Validate => validate(config_path),
        ConfigCommands::Show => show(config_path),
    }
}

fn validate(config_path: &Path) -> Result<()> {
    let config = PingboardConfig::load(config_path)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", config_path.display(), e))?;

    let errors = config.validate();
    if errors.is_empty() {
        println!("✅ {} is valid.", config_path.display());
        return Ok(());
    }

    println!("❌ Validation errors in {}:", config_path.display());
    for e in &errors {
        println!("  - {}", e);
    }
    anyhow::bail!("{} validation error(s)", errors.len())
}

fn show(config_path: &Path) -> Result<()> {
    let config = PingboardConfig::load_or_default(config_path);
    match toml::to_string_pretty(&config.redacted()) {
        Ok(s) => println!("{}", s),
        Err(e) => anyhow::bail!("Failed to serialize config: {}", e),
    }
    Ok(())
}
