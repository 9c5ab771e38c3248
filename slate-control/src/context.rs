//! Process-scoped remote-control context.
//!
//! Exactly one of these exists per host process. Modules that need to
//! query or drive the remote control receive it explicitly; there is no
//! global instance.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use slate_core::store::SettingsStore;
use slate_core::types::{ToolId, REMOTE_TOOL_ID};
use slate_rpc::RemoteHandler;

use crate::driver::DriverClient;
use crate::lifecycle::LifecycleController;
use crate::notify::NotificationDispatcher;
use crate::service::RemoteService;
use crate::sync::Synchronizer;
use crate::ui::UiHandle;

/// Owns the cancellation scope and the one-shot attach/terminate flags
/// for the controller.
///
/// Construction wires collaborators; [`attach`](Self::attach) starts the
/// controller event loop. The scope token is the single source of truth
/// for "is this controller still allowed to run work".
pub struct RemoteContext {
    home: PathBuf,
    identity: ToolId,
    scope: CancellationToken,
    store: Arc<SettingsStore>,
    ui: Option<UiHandle>,
    driver: Option<Arc<dyn DriverClient>>,
    attached: AtomicBool,
    terminated: AtomicBool,
    running: Arc<AtomicBool>,
}

impl RemoteContext {
    pub fn new(home: impl Into<PathBuf>, store: Arc<SettingsStore>) -> Self {
        Self {
            home: home.into(),
            identity: ToolId::from(REMOTE_TOOL_ID),
            scope: CancellationToken::new(),
            store,
            ui: None,
            driver: None,
            attached: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_identity(mut self, identity: impl Into<ToolId>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn with_ui(mut self, ui: UiHandle) -> Self {
        self.ui = Some(ui);
        self
    }

    pub fn with_driver(mut self, driver: Arc<dyn DriverClient>) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn identity(&self) -> &ToolId {
        &self.identity
    }

    /// The process cancellation scope. The host UI loop runs under it too.
    pub fn scope(&self) -> &CancellationToken {
        &self.scope
    }

    /// Whether the endpoint is currently held live by the controller.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Handler for local explicit synchronization requests.
    pub fn synchronizer(&self) -> Synchronizer {
        Synchronizer::new(self.driver.clone(), self.ui.clone())
    }

    /// One-shot: wires the controller and spawns its event loop inside
    /// the current tokio runtime, then evaluates the snapshot already in
    /// the store (skipped when none is loaded). Returns `false` on any
    /// attach after the first.
    pub fn attach(&self) -> bool {
        if self.attached.swap(true, Ordering::SeqCst) {
            return false;
        }
        init_tracing();

        let synchronizer = self.synchronizer();
        let notifications = NotificationDispatcher::new(self.ui.clone());
        let handler: Arc<dyn RemoteHandler> =
            Arc::new(RemoteService::new(synchronizer, notifications.clone()));

        let changes = self.store.subscribe();
        let initial = self.store.current();
        let controller = LifecycleController::new(
            self.home.clone(),
            self.identity.clone(),
            self.scope.clone(),
            handler,
            notifications,
            Arc::clone(&self.running),
        );
        tokio::spawn(controller.run(changes, initial));

        tracing::info!(identity = %self.identity, "remote control attached");
        true
    }

    /// Process-termination hook: cancels the scope exactly once. Safe to
    /// call whether or not the controller ever attached, and safe to
    /// call again.
    pub fn terminate(&self) {
        if self.terminated.swap(true, Ordering::SeqCst) {
            tracing::debug!("terminate called again; scope already cancelled");
            return;
        }
        self.scope.cancel();
        tracing::info!("remote control scope cancelled");
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
