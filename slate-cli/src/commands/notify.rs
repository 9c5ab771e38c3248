//! `slate-remote notify` — show a notification in the host app.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use slate_core::types::ToolId;
use slate_rpc::{request_notify, RpcError};

#[derive(Args, Debug)]
pub struct NotifyArgs {
    /// Notification body.
    pub message: String,

    /// Optional title; the host substitutes its app name when omitted.
    #[arg(long)]
    pub title: Option<String>,
}

pub fn run(home: &Path, identity: &ToolId, args: NotifyArgs) -> Result<()> {
    match request_notify(home, identity, args.title, &args.message) {
        Ok(()) => println!("notification sent"),
        Err(RpcError::EndpointNotRunning { .. }) => {
            println!("remote endpoint is not running");
        }
        Err(err) => return Err(err).context("failed to send notification"),
    }
    Ok(())
}
