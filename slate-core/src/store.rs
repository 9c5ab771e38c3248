//! Settings accessor: current snapshot, persistence, change events.
//!
//! # Storage layout
//!
//! ```text
//! ~/.slate/
//!   settings.yaml   (mode 0600, written atomically)
//! ```
//!
//! # API pattern
//!
//! The store comes in two flavors:
//! - [`SettingsStore::in_memory`] — no persistence; tests and embedded hosts
//! - [`SettingsStore::open_at`] — file-backed under an explicit home; the
//!   no-arg [`SettingsStore::open`] derives home from `dirs::home_dir()`
//!
//! Tests must NEVER call `open`; always use `open_at` with a `TempDir`.
//!
//! Reads are allowed from any thread. Writes belong to the host UI
//! execution context: in this system the UI command loop is the only
//! caller of [`SettingsStore::apply`] and [`SettingsStore::clear`].

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::StoreError;
use crate::paths::settings_path;
use crate::types::Settings;

pub const SETTINGS_DOC_VERSION: u32 = 1;

/// Capacity of the change-event channel. A subscriber that falls further
/// behind than this observes a `Lagged` error on its receiver.
const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Persisted settings document. `updated_at` is stamped on every save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsDoc {
    pub version: u32,
    pub updated_at: DateTime<Utc>,
    pub settings: Settings,
}

/// The host settings accessor.
///
/// Change events deliver the new snapshot (or `None` after [`clear`]) to
/// every subscriber, in emission order.
///
/// [`clear`]: SettingsStore::clear
#[derive(Debug)]
pub struct SettingsStore {
    current: RwLock<Option<Settings>>,
    path: Option<PathBuf>,
    changes: broadcast::Sender<Option<Settings>>,
}

impl SettingsStore {
    /// Store with no backing file.
    pub fn in_memory() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            current: RwLock::new(None),
            path: None,
            changes,
        }
    }

    /// File-backed store under `<home>/.slate/settings.yaml`.
    ///
    /// An absent file is not an error — the store starts with no snapshot.
    /// Malformed YAML surfaces as [`StoreError::Parse`] with path context.
    pub fn open_at(home: &Path) -> Result<Self, StoreError> {
        let path = settings_path(home);
        let current = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            let doc: SettingsDoc = serde_yaml::from_str(&contents).map_err(|e| {
                StoreError::Parse {
                    path: path.clone(),
                    source: e,
                }
            })?;
            Some(doc.settings)
        } else {
            None
        };

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            current: RwLock::new(current),
            path: Some(path),
            changes,
        })
    }

    /// `open_at` convenience wrapper.
    pub fn open() -> Result<Self, StoreError> {
        open_home().and_then(|home| Self::open_at(&home))
    }

    /// Clone of the current snapshot, callable from any thread.
    pub fn current(&self) -> Option<Settings> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<Option<Settings>> {
        self.changes.subscribe()
    }

    /// Replace the snapshot, persist it when file-backed, then emit a
    /// change event carrying the new snapshot.
    pub fn apply(&self, settings: Settings) -> Result<(), StoreError> {
        if let Some(path) = self.path.as_ref() {
            persist(path, &settings)?;
        }
        {
            let mut guard = self
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *guard = Some(settings.clone());
        }
        let _ = self.changes.send(Some(settings));
        Ok(())
    }

    /// Drop the snapshot and emit a `None` change event. The backing file
    /// is left untouched.
    pub fn clear(&self) {
        {
            let mut guard = self
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *guard = None;
        }
        let _ = self.changes.send(None);
    }
}

/// Atomic save: serialize → `.tmp` sibling → `chmod 0600` → `rename`.
fn persist(path: &Path, settings: &Settings) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
            set_dir_permissions(dir)?;
        }
    }

    let doc = SettingsDoc {
        version: SETTINGS_DOC_VERSION,
        updated_at: Utc::now(),
        settings: settings.clone(),
    };
    let yaml = serde_yaml::to_string(&doc)?;
    let tmp = path.with_extension("yaml.tmp");
    std::fs::write(&tmp, yaml)?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

fn open_home() -> Result<PathBuf, StoreError> {
    dirs::home_dir().ok_or(StoreError::HomeNotFound)
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::types::{ToolEntry, ToolId};

    use super::*;

    fn sample_settings() -> Settings {
        Settings {
            tools: vec![ToolEntry {
                identity: ToolId::from("slate.remote"),
                enabled: true,
                options: Default::default(),
            }],
            profiles: vec![],
        }
    }

    #[test]
    fn in_memory_apply_updates_current() {
        let store = SettingsStore::in_memory();
        assert!(store.current().is_none());

        store.apply(sample_settings()).expect("apply");
        let current = store.current().expect("snapshot");
        assert_eq!(current.tools.len(), 1);
    }

    #[tokio::test]
    async fn apply_emits_change_event_with_new_snapshot() {
        let store = SettingsStore::in_memory();
        let mut rx = store.subscribe();

        store.apply(sample_settings()).expect("apply");

        let event = rx.recv().await.expect("change event");
        let settings = event.expect("snapshot payload");
        assert_eq!(settings.tools[0].identity, ToolId::from("slate.remote"));
    }

    #[tokio::test]
    async fn clear_emits_none_event() {
        let store = SettingsStore::in_memory();
        store.apply(sample_settings()).expect("apply");

        let mut rx = store.subscribe();
        store.clear();

        let event = rx.recv().await.expect("change event");
        assert!(event.is_none());
        assert!(store.current().is_none());
    }

    #[test]
    fn open_at_missing_file_starts_empty() {
        let home = TempDir::new().expect("home");
        let store = SettingsStore::open_at(home.path()).expect("open");
        assert!(store.current().is_none());
    }

    #[test]
    fn apply_persists_and_reload_sees_snapshot() {
        let home = TempDir::new().expect("home");
        let store = SettingsStore::open_at(home.path()).expect("open");
        store.apply(sample_settings()).expect("apply");

        let reopened = SettingsStore::open_at(home.path()).expect("reopen");
        let current = reopened.current().expect("persisted snapshot");
        assert_eq!(current.tools[0].identity, ToolId::from("slate.remote"));
    }

    #[test]
    fn open_at_malformed_yaml_is_parse_error() {
        let home = TempDir::new().expect("home");
        let path = settings_path(home.path());
        std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        std::fs::write(&path, "version: [not-a-doc").expect("write");

        let err = SettingsStore::open_at(home.path()).expect_err("parse failure");
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[test]
    fn events_arrive_in_apply_order() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime");
        runtime.block_on(async {
            let store = SettingsStore::in_memory();
            let mut rx = store.subscribe();

            store.apply(sample_settings()).expect("apply");
            store.clear();
            store.apply(sample_settings()).expect("apply again");

            assert!(rx.recv().await.expect("first").is_some());
            assert!(rx.recv().await.expect("second").is_none());
            assert!(rx.recv().await.expect("third").is_some());
        });
    }
}
