//! Glue between the RPC endpoint surface and the local handlers.

use slate_rpc::RemoteHandler;

use crate::notify::{NotificationDispatcher, NotifyOutcome};
use crate::sync::Synchronizer;

/// Implements the endpoint surface by delegating to the synchronizer and
/// the notification dispatcher. Both paths return immediately.
pub(crate) struct RemoteService {
    synchronizer: Synchronizer,
    notifications: NotificationDispatcher,
}

impl RemoteService {
    pub(crate) fn new(synchronizer: Synchronizer, notifications: NotificationDispatcher) -> Self {
        Self {
            synchronizer,
            notifications,
        }
    }
}

impl RemoteHandler for RemoteService {
    fn synchronize(&self) {
        self.synchronizer.synchronize();
    }

    fn notify(&self, title: Option<String>, message: String) {
        if self.notifications.notify(title, message) == NotifyOutcome::UiUnavailable {
            tracing::debug!("notification dropped: no ui context");
        }
    }
}
