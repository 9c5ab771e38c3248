use std::path::{Path, PathBuf};

use crate::types::ToolId;

pub const SETTINGS_FILE: &str = "settings.yaml";

pub fn slate_root(home: &Path) -> PathBuf {
    home.join(".slate")
}

pub fn settings_path(home: &Path) -> PathBuf {
    slate_root(home).join(SETTINGS_FILE)
}

pub fn run_dir(home: &Path) -> PathBuf {
    slate_root(home).join("run")
}

/// `<home>/.slate/run/<identity>.sock` — one endpoint socket per tool identity.
pub fn socket_path(home: &Path, identity: &ToolId) -> PathBuf {
    run_dir(home).join(format!("{identity}.sock"))
}
