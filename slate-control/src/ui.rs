//! UI execution context: a command queue owned by the single task that is
//! allowed to mutate UI-owned state.
//!
//! Components never touch the settings store or widgets directly. They
//! post [`UiCommand`]s through a [`UiHandle`]; the context applies them in
//! posting order on its own task, which is the only writer of the store
//! and the profile panel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use slate_core::store::SettingsStore;
use slate_core::types::{ProfileEntry, Settings};

/// A notification record handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    /// Stable identifier so the presentation layer can coalesce repeats.
    pub id: &'static str,
}

/// Presentation seam for on-screen notifications.
pub trait NotificationSink: Send {
    fn show(&mut self, notification: Notification);
}

/// A UI component that displays per-device profile assignments.
pub trait ProfilePanel: Send {
    fn set_profiles(&mut self, profiles: Vec<ProfileEntry>);
}

/// Default in-tree profile panel state.
#[derive(Debug, Default)]
pub struct ProfilePane {
    profiles: Vec<ProfileEntry>,
}

impl ProfilePane {
    pub fn profiles(&self) -> &[ProfileEntry] {
        &self.profiles
    }
}

impl ProfilePanel for ProfilePane {
    fn set_profiles(&mut self, profiles: Vec<ProfileEntry>) {
        self.profiles = profiles;
    }
}

/// Commands applied on the UI task, in posting order.
#[derive(Debug)]
pub enum UiCommand {
    ApplySettings(Settings),
    SetProfiles(Vec<ProfileEntry>),
    ShowNotification(Notification),
}

/// Cloneable posting side of the UI command queue.
#[derive(Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiCommand>,
    has_panel: bool,
}

impl UiHandle {
    /// Post a command for the UI task. `false` when the UI loop is gone.
    pub fn post(&self, command: UiCommand) -> bool {
        self.tx.send(command).is_ok()
    }

    /// Whether the context was built with a profile panel installed.
    pub fn has_profile_panel(&self) -> bool {
        self.has_panel
    }
}

/// The consuming side: owns the store write path, the profile panel, and
/// the notification sink.
pub struct UiContext {
    tx: mpsc::UnboundedSender<UiCommand>,
    rx: mpsc::UnboundedReceiver<UiCommand>,
    store: Arc<SettingsStore>,
    panel: Option<Box<dyn ProfilePanel>>,
    notifier: Option<Box<dyn NotificationSink>>,
}

impl UiContext {
    pub fn new(store: Arc<SettingsStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx,
            store,
            panel: None,
            notifier: None,
        }
    }

    pub fn with_panel(mut self, panel: Box<dyn ProfilePanel>) -> Self {
        self.panel = Some(panel);
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Posting handle for other components. Take handles before calling
    /// [`run`](Self::run).
    pub fn handle(&self) -> UiHandle {
        UiHandle {
            tx: self.tx.clone(),
            has_panel: self.panel.is_some(),
        }
    }

    /// Consume commands until every handle is dropped or the scope
    /// cancels.
    pub async fn run(self, cancel: CancellationToken) {
        let Self {
            tx,
            mut rx,
            store,
            mut panel,
            mut notifier,
        } = self;
        drop(tx);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                command = rx.recv() => {
                    let Some(command) = command else { break };
                    apply(&store, &mut panel, &mut notifier, command);
                }
            }
        }
    }
}

fn apply(
    store: &SettingsStore,
    panel: &mut Option<Box<dyn ProfilePanel>>,
    notifier: &mut Option<Box<dyn NotificationSink>>,
    command: UiCommand,
) {
    match command {
        UiCommand::ApplySettings(settings) => {
            if let Err(err) = store.apply(settings) {
                tracing::error!(error = %err, "failed to apply synchronized settings");
            }
        }
        UiCommand::SetProfiles(profiles) => {
            if let Some(panel) = panel.as_mut() {
                panel.set_profiles(profiles);
            }
        }
        UiCommand::ShowNotification(notification) => match notifier.as_mut() {
            Some(sink) => sink.show(notification),
            None => tracing::debug!("notification dropped: no sink installed"),
        },
    }
}
