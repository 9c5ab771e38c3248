//! Decides whether the remote endpoint should be running.

use slate_core::types::{Settings, ToolId};

/// True when `settings` carries a tool entry registered under `identity`
/// with its enabled flag set. A missing entry or a cleared flag means
/// disabled. Pure; callers skip evaluation entirely when no snapshot is
/// loaded yet.
pub fn is_enabled(settings: &Settings, identity: &ToolId) -> bool {
    settings
        .tool(identity)
        .map(|tool| tool.enabled)
        .unwrap_or(false)
}
