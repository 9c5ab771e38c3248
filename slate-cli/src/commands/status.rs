//! `slate-remote status` — is the endpoint socket present?

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use slate_core::paths::socket_path;
use slate_core::types::ToolId;

pub fn run(home: &Path, identity: &ToolId) -> Result<()> {
    let socket = socket_path(home, identity);
    if socket.exists() {
        println!(
            "{} remote endpoint listening at {}",
            "●".green(),
            socket.display()
        );
    } else {
        println!(
            "{} remote endpoint is not running (socket missing: {})",
            "○".red(),
            socket.display()
        );
    }
    Ok(())
}
