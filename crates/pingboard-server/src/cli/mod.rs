pub mod config_cmd;
pub mod lookup;
pub mod tenure;

use clap::{Args, Parser, Subcommand};
use pingboard_core::IdentifierKind;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pingboard")]
#[command(version, about = "Pingboard directory profiles for chat user popovers")]
pub struct Cli {
    /// Path to pingboard.toml
    #[arg(
        long,
        global = true,
        env = "PINGBOARD_CONFIG",
        default_value = "pingboard.toml"
    )]
    pub config: PathBuf,

    /// Directory service address for client commands
    #[arg(
        long,
        global = true,
        env = "PINGBOARD_ADDR",
        default_value = "http://localhost:8065"
    )]
    pub server: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the directory service
    Serve,
    /// Fetch a user's profile and print the popover lines
    Lookup(LookupArgs),
    /// Describe the tenure between two dates
    Tenure(TenureArgs),
    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Username or email, depending on --by
    pub identifier: String,
    /// Identifier kind (defaults to [client] identifier_kind)
    #[arg(long)]
    pub by: Option<IdentifierKind>,
    /// Value sent in the authenticated-user header
    #[arg(long, env = "PINGBOARD_USER_ID", default_value = "pingboard-cli")]
    pub user_id: String,
}

#[derive(Args, Debug)]
pub struct TenureArgs {
    /// Start date (YYYY-MM-DD)
    pub start: String,
    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub on: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    Validate,
    Show,
}
