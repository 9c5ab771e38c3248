//! `slate-remote sync` — request settings synchronization.

use std::path::Path;

use anyhow::{Context, Result};

use slate_core::types::ToolId;
use slate_rpc::{request_synchronize, RpcError};

pub fn run(home: &Path, identity: &ToolId) -> Result<()> {
    match request_synchronize(home, identity) {
        Ok(()) => println!("synchronize requested"),
        Err(RpcError::EndpointNotRunning { .. }) => {
            println!("remote endpoint is not running");
        }
        Err(err) => return Err(err).context("failed to request synchronization"),
    }
    Ok(())
}
