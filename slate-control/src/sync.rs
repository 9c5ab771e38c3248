//! Settings synchronization: pull the authoritative snapshot from the
//! driver and apply it through the UI execution context.

use std::sync::Arc;

use crate::driver::DriverClient;
use crate::ui::{UiCommand, UiHandle};

/// Result of one synchronization pass. Reported to the log sink; never
/// propagated across the RPC boundary (the protocol has no way to carry
/// it back to the peer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Snapshot fetched and posted to the UI context. `profiles_forwarded`
    /// reports whether the profile-panel write was posted as well.
    Applied { profiles_forwarded: bool },
    /// No driver connection configured.
    DriverUnavailable,
    /// Driver answered but had no settings loaded.
    NoSnapshot,
    /// Snapshot fetched but no UI context is available to apply it.
    UiUnavailable,
}

/// Services inbound `synchronize` requests.
#[derive(Clone)]
pub struct Synchronizer {
    driver: Option<Arc<dyn DriverClient>>,
    ui: Option<UiHandle>,
}

impl Synchronizer {
    pub fn new(driver: Option<Arc<dyn DriverClient>>, ui: Option<UiHandle>) -> Self {
        Self { driver, ui }
    }

    /// Fire-and-forget: spawns the pass and returns to the caller
    /// immediately, so the RPC response path never blocks on the driver.
    pub fn synchronize(&self) {
        let sync = self.clone();
        tokio::spawn(async move {
            match sync.synchronize_now().await {
                SyncOutcome::Applied { profiles_forwarded } => {
                    tracing::info!(profiles_forwarded, "settings synchronized from driver");
                }
                outcome => {
                    tracing::debug!(?outcome, "synchronization skipped");
                }
            }
        });
    }

    /// One synchronization pass. The settings write and the profile-panel
    /// write are posted to the UI queue, never performed on this task.
    pub async fn synchronize_now(&self) -> SyncOutcome {
        let Some(driver) = self.driver.as_ref() else {
            return SyncOutcome::DriverUnavailable;
        };
        let Some(settings) = driver.get_settings().await else {
            return SyncOutcome::NoSnapshot;
        };
        let Some(ui) = self.ui.as_ref() else {
            return SyncOutcome::UiUnavailable;
        };

        let profiles = settings.profiles.clone();
        if !ui.post(UiCommand::ApplySettings(settings)) {
            return SyncOutcome::UiUnavailable;
        }

        let profiles_forwarded =
            ui.has_profile_panel() && ui.post(UiCommand::SetProfiles(profiles));
        SyncOutcome::Applied { profiles_forwarded }
    }
}
