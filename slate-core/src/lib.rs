//! Slate core library — configuration snapshot types, the settings store,
//! and filesystem paths.
//!
//! Public API surface:
//! - [`types`] — newtypes and the [`types::Settings`] snapshot
//! - [`error`] — [`StoreError`]
//! - [`store`] — the settings accessor with change events
//! - [`paths`] — `~/.slate/` layout helpers

pub mod error;
pub mod paths;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use store::{SettingsDoc, SettingsStore};
pub use types::{ProfileEntry, Settings, ToolEntry, ToolId, REMOTE_TOOL_ID};
