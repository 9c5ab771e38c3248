//! Slate Remote CLI — drive a running Slate remote endpoint.
//!
//! # Usage
//!
//! ```text
//! slate-remote sync
//! slate-remote notify <message> [--title <title>]
//! slate-remote status
//! slate-remote --identity <tool-id> <command>
//! ```

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::notify::NotifyArgs;
use slate_core::types::{ToolId, REMOTE_TOOL_ID};

#[derive(Parser, Debug)]
#[command(
    name = "slate-remote",
    version,
    about = "Remote-control a running Slate desktop app",
    long_about = None,
)]
struct Cli {
    /// Tool identity the endpoint is registered under.
    #[arg(long, default_value = REMOTE_TOOL_ID)]
    identity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask the host to pull settings from the driver and apply them.
    Sync,

    /// Show a desktop notification in the host app.
    Notify(NotifyArgs),

    /// Report whether the remote endpoint is listening.
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let home = dirs::home_dir().context("could not determine home directory")?;
    let identity = ToolId::from(cli.identity);

    match cli.command {
        Commands::Sync => commands::sync::run(&home, &identity),
        Commands::Notify(args) => commands::notify::run(&home, &identity, args),
        Commands::Status => commands::status::run(&home, &identity),
    }
}
