//! Endpoint lifecycle: reacts to configuration changes by starting,
//! restarting, or releasing the RPC endpoint.
//!
//! One task owns the endpoint slot and processes change events in
//! emission order, so no two transition evaluations ever run
//! concurrently for the same identity.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use slate_core::types::{Settings, ToolId};
use slate_rpc::{RemoteHandler, RpcServer};

use crate::enablement::is_enabled;
use crate::notify::NotificationDispatcher;

/// Transition decided from (enabled, endpoint exists). `None` when there
/// is nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Start,
    Restart,
    Release,
}

pub(crate) fn decide(enabled: bool, endpoint_live: bool) -> Option<Action> {
    match (enabled, endpoint_live) {
        (true, false) => Some(Action::Start),
        (true, true) => Some(Action::Restart),
        (false, true) => Some(Action::Release),
        (false, false) => None,
    }
}

/// The one live endpoint instance and the child token gating its run loop.
struct EndpointSlot {
    server: Arc<RpcServer>,
    cancel: CancellationToken,
}

pub(crate) struct LifecycleController {
    home: PathBuf,
    identity: ToolId,
    scope: CancellationToken,
    handler: Arc<dyn RemoteHandler>,
    notifications: NotificationDispatcher,
    running: Arc<AtomicBool>,
    endpoint: Option<EndpointSlot>,
}

impl LifecycleController {
    pub(crate) fn new(
        home: PathBuf,
        identity: ToolId,
        scope: CancellationToken,
        handler: Arc<dyn RemoteHandler>,
        notifications: NotificationDispatcher,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            home,
            identity,
            scope,
            handler,
            notifications,
            running,
            endpoint: None,
        }
    }

    /// Event loop. `initial` is the snapshot present at attach time;
    /// absence means configuration is not loaded yet and no decision is
    /// made until the first change event.
    pub(crate) async fn run(
        mut self,
        mut changes: broadcast::Receiver<Option<Settings>>,
        initial: Option<Settings>,
    ) {
        if let Some(settings) = initial {
            self.evaluate(&settings);
        }

        loop {
            tokio::select! {
                _ = self.scope.cancelled() => break,
                event = changes.recv() => match event {
                    Ok(Some(settings)) => self.evaluate(&settings),
                    Ok(None) => {}
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "configuration events lagged; continuing with next");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        self.release();
    }

    fn evaluate(&mut self, settings: &Settings) {
        let enabled = is_enabled(settings, &self.identity);
        match decide(enabled, self.endpoint.is_some()) {
            Some(Action::Start) => self.start(),
            Some(Action::Restart) => self.restart(),
            Some(Action::Release) => self.release(),
            None => {}
        }
    }

    fn start(&mut self) {
        let server = Arc::new(RpcServer::new(
            &self.home,
            self.identity.clone(),
            Arc::clone(&self.handler),
        ));
        let cancel = self.scope.child_token();
        spawn_connection_logger(&server, cancel.clone(), self.identity.clone());

        if server.spawn(cancel.clone()) {
            tracing::info!(identity = %self.identity, "rpc server started");
            self.notifications.notify(None, "RPC server started.");
        }
        self.endpoint = Some(EndpointSlot { server, cancel });
        self.running.store(true, Ordering::SeqCst);
    }

    fn restart(&mut self) {
        if let Some(slot) = self.endpoint.as_ref() {
            let respawned = slot.server.spawn(slot.cancel.clone());
            tracing::debug!(identity = %self.identity, respawned, "re-issued endpoint start");
        }
    }

    fn release(&mut self) {
        if let Some(slot) = self.endpoint.take() {
            slot.cancel.cancel();
            self.running.store(false, Ordering::SeqCst);
            tracing::info!(identity = %self.identity, "rpc server released");
        }
    }
}

/// Connection-state observability; the task dies with the endpoint's
/// child token.
fn spawn_connection_logger(server: &RpcServer, cancel: CancellationToken, identity: ToolId) {
    let mut connection_rx = server.subscribe_connection_state();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                state = connection_rx.recv() => match state {
                    Ok(true) => tracing::debug!(identity = %identity, "remote peer connected"),
                    Ok(false) => tracing::debug!(identity = %identity, "remote peer disconnected"),
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    });
}
