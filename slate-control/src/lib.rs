//! Slate remote control — the in-process controller that exposes the host
//! configuration to an external process over RPC and reacts to
//! configuration changes by starting, stopping, or restarting the channel.
//!
//! Public API surface:
//! - [`context`] — [`RemoteContext`], the process-scoped attach/terminate object
//! - [`ui`] — the UI command queue and presentation seams
//! - [`driver`] — connection to the Slate driver daemon
//! - [`sync`] / [`notify`] — the handlers behind the RPC surface
//! - [`enablement`] — "should the endpoint be running" evaluation

pub mod context;
pub mod driver;
pub mod enablement;
mod lifecycle;
pub mod notify;
mod service;
pub mod sync;
pub mod ui;

pub use context::RemoteContext;
pub use driver::{DriverClient, SocketDriverClient};
pub use notify::{NotificationDispatcher, NotifyOutcome};
pub use slate_core::types::REMOTE_TOOL_ID;
pub use sync::{SyncOutcome, Synchronizer};
pub use ui::{
    Notification, NotificationSink, ProfilePane, ProfilePanel, UiCommand, UiContext, UiHandle,
};
