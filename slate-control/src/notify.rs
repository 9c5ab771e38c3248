//! Inbound notification requests from the remote peer.

use crate::ui::{Notification, UiCommand, UiHandle};

/// Title used when the remote peer omits one.
pub const DEFAULT_TITLE: &str = "Slate";

/// Stable notification id; lets the presentation layer coalesce repeats.
pub const NOTIFICATION_ID: &str = "remote-log-message";

/// Where a notification request ended up. Logged, never surfaced to the
/// remote peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Posted,
    UiUnavailable,
}

/// Builds notification records and posts them to the UI context.
#[derive(Clone)]
pub struct NotificationDispatcher {
    ui: Option<UiHandle>,
}

impl NotificationDispatcher {
    pub fn new(ui: Option<UiHandle>) -> Self {
        Self { ui }
    }

    /// Returns immediately; the on-screen lifetime is the presentation
    /// layer's concern. Without a UI context this is a silent no-op.
    pub fn notify(&self, title: Option<String>, message: impl Into<String>) -> NotifyOutcome {
        let Some(ui) = self.ui.as_ref() else {
            return NotifyOutcome::UiUnavailable;
        };

        let notification = Notification {
            title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            message: message.into(),
            id: NOTIFICATION_ID,
        };
        if ui.post(UiCommand::ShowNotification(notification)) {
            NotifyOutcome::Posted
        } else {
            NotifyOutcome::UiUnavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use slate_core::store::SettingsStore;
    use tokio_util::sync::CancellationToken;

    use crate::ui::{NotificationSink, UiContext};

    use super::*;

    struct RecordingSink {
        seen: Arc<Mutex<Vec<Notification>>>,
    }

    impl NotificationSink for RecordingSink {
        fn show(&mut self, notification: Notification) {
            self.seen.lock().expect("lock").push(notification);
        }
    }

    #[tokio::test]
    async fn without_ui_context_is_a_silent_no_op() {
        let dispatcher = NotificationDispatcher::new(None);
        assert_eq!(
            dispatcher.notify(Some("T".to_string()), "M"),
            NotifyOutcome::UiUnavailable
        );
    }

    #[tokio::test]
    async fn title_and_message_pass_through_verbatim() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::new(SettingsStore::in_memory());
        let ui = UiContext::new(store).with_notifier(Box::new(RecordingSink {
            seen: Arc::clone(&seen),
        }));
        let handle = ui.handle();
        let ui_task = tokio::spawn(ui.run(CancellationToken::new()));

        let dispatcher = NotificationDispatcher::new(Some(handle));
        assert_eq!(
            dispatcher.notify(Some("T".to_string()), "M"),
            NotifyOutcome::Posted
        );

        drop(dispatcher);
        ui_task.await.expect("ui loop");

        let seen = seen.lock().expect("lock");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].title, "T");
        assert_eq!(seen[0].message, "M");
        assert_eq!(seen[0].id, NOTIFICATION_ID);
    }

    #[tokio::test]
    async fn missing_title_defaults_to_app_name() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let store = Arc::new(SettingsStore::in_memory());
        let ui = UiContext::new(store).with_notifier(Box::new(RecordingSink {
            seen: Arc::clone(&seen),
        }));
        let handle = ui.handle();
        let ui_task = tokio::spawn(ui.run(CancellationToken::new()));

        let dispatcher = NotificationDispatcher::new(Some(handle));
        dispatcher.notify(None, "M");

        drop(dispatcher);
        ui_task.await.expect("ui loop");

        assert_eq!(seen.lock().expect("lock")[0].title, DEFAULT_TITLE);
    }
}
