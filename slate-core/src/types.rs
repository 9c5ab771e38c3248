//! Domain types for Slate configuration snapshots.
//!
//! A [`Settings`] value is an immutable point-in-time read of the host
//! configuration. Consumers clone it out of the store and never mutate it
//! in place; applying a new snapshot goes through
//! [`crate::store::SettingsStore::apply`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity the remote-control tool is registered under in the
/// configuration store.
pub const REMOTE_TOOL_ID: &str = "slate.remote";

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed identity for a pluggable tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolId(pub String);

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ToolId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ToolId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A pluggable feature registered in the configuration store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEntry {
    pub identity: ToolId,
    #[serde(default)]
    pub enabled: bool,
    /// Tool-specific options, passed through untouched.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, serde_yaml::Value>,
}

/// A per-device output profile assignment. Opaque to the remote controller
/// beyond pass-through into the profile panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub device: String,
    pub output_mode: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, serde_yaml::Value>,
}

/// An immutable snapshot of the host configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub tools: Vec<ToolEntry>,
    #[serde(default)]
    pub profiles: Vec<ProfileEntry>,
}

impl Settings {
    /// First tool entry registered under `identity`, if any.
    pub fn tool(&self, identity: &ToolId) -> Option<&ToolEntry> {
        self.tools.iter().find(|tool| &tool.identity == identity)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
