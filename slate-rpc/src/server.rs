//! The RPC endpoint: an accept/serve loop bound to one tool identity.
//!
//! Exactly one peer is served at a time; a second connect attempt waits in
//! the listener backlog until the current peer disconnects. The loop runs
//! until its cancellation token fires, then removes the socket file.

use std::fs;
use std::io::ErrorKind;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use slate_core::paths::{run_dir, socket_path};
use slate_core::types::ToolId;

use crate::error::{io_err, RpcError};
use crate::protocol::{RemoteRequest, RemoteResponse};

/// Surface the endpoint exposes to its remote peer.
///
/// Both calls return to the RPC layer immediately; implementations spawn
/// whatever work the request triggers.
pub trait RemoteHandler: Send + Sync {
    fn synchronize(&self);
    fn notify(&self, title: Option<String>, message: String);
}

const CONNECTION_CHANNEL_CAPACITY: usize = 16;

/// The endpoint listener/session object for one tool identity.
pub struct RpcServer {
    identity: ToolId,
    run_dir: PathBuf,
    socket: PathBuf,
    handler: Arc<dyn RemoteHandler>,
    connection_tx: broadcast::Sender<bool>,
    running: AtomicBool,
}

impl RpcServer {
    pub fn new(home: &Path, identity: ToolId, handler: Arc<dyn RemoteHandler>) -> Self {
        let (connection_tx, _) = broadcast::channel(CONNECTION_CHANNEL_CAPACITY);
        Self {
            socket: socket_path(home, &identity),
            run_dir: run_dir(home),
            identity,
            handler,
            connection_tx,
            running: AtomicBool::new(false),
        }
    }

    pub fn identity(&self) -> &ToolId {
        &self.identity
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Connection-state events: `true` on peer connect, `false` on
    /// disconnect. Observability only.
    pub fn subscribe_connection_state(&self) -> broadcast::Receiver<bool> {
        self.connection_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start the accept/serve loop on a background task.
    ///
    /// Idempotent: returns `false` without spawning anything when the loop
    /// is already live, so re-issuing start on a running endpoint cannot
    /// duplicate listeners. Cancelling `cancel` exits the loop, removes
    /// the socket file, and clears the running guard.
    pub fn spawn(self: &Arc<Self>, cancel: CancellationToken) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            return false;
        }

        let server = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = server.serve(cancel).await {
                tracing::error!(
                    identity = %server.identity,
                    error = %err,
                    "rpc endpoint terminated with error",
                );
            }
            server.running.store(false, Ordering::SeqCst);
        });
        true
    }

    async fn serve(&self, cancel: CancellationToken) -> Result<(), RpcError> {
        if !self.run_dir.exists() {
            fs::create_dir_all(&self.run_dir).map_err(|e| io_err(&self.run_dir, e))?;
        }
        prepare_socket_for_bind(&self.socket)?;

        let listener = UnixListener::bind(&self.socket).map_err(|e| io_err(&self.socket, e))?;
        set_socket_permissions(&self.socket)?;
        tracing::info!(
            identity = %self.identity,
            socket = %self.socket.display(),
            "rpc endpoint listening",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                accepted = listener.accept() => {
                    let (stream, _) = accepted.map_err(|e| io_err(&self.socket, e))?;
                    let _ = self.connection_tx.send(true);
                    if let Err(err) = self.serve_peer(stream, &cancel).await {
                        tracing::warn!(identity = %self.identity, error = %err, "rpc peer session error");
                    }
                    let _ = self.connection_tx.send(false);
                }
            }
        }

        if self.socket.exists() {
            let _ = fs::remove_file(&self.socket);
        }
        Ok(())
    }

    async fn serve_peer(
        &self,
        stream: UnixStream,
        cancel: &CancellationToken,
    ) -> Result<(), RpcError> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                line = lines.next_line() => {
                    let Some(line) = line.map_err(|e| io_err("rpc socket read", e))? else {
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    let response = match serde_json::from_str::<RemoteRequest>(&line) {
                        Ok(request) => self.dispatch(request),
                        Err(err) => RemoteResponse::error(format!("invalid request JSON: {err}")),
                    };
                    write_response(&mut writer, &response).await?;
                }
            }
        }

        Ok(())
    }

    fn dispatch(&self, request: RemoteRequest) -> RemoteResponse {
        match request.cmd.as_str() {
            "synchronize" => {
                self.handler.synchronize();
                RemoteResponse::ok(json!({ "accepted": true }))
            }
            "notify" => match request.message {
                Some(message) => {
                    self.handler.notify(request.title, message);
                    RemoteResponse::ok(json!({ "accepted": true }))
                }
                None => RemoteResponse::error("notify requires a message"),
            },
            other => RemoteResponse::error(format!("unknown command '{other}'")),
        }
    }
}

/// Refuse to bind over a live socket; remove a stale one.
fn prepare_socket_for_bind(socket: &Path) -> Result<(), RpcError> {
    if !socket.exists() {
        return Ok(());
    }

    match StdUnixStream::connect(socket) {
        Ok(_) => {
            return Err(RpcError::SocketInUse {
                path: socket.to_path_buf(),
            });
        }
        Err(err) => {
            tracing::warn!(
                socket = %socket.display(),
                error = %err,
                "removing stale endpoint socket before bind",
            );
        }
    }

    match fs::remove_file(socket) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(socket, err)),
    }
}

async fn write_response(
    writer: &mut OwnedWriteHalf,
    response: &RemoteResponse,
) -> Result<(), RpcError> {
    let payload = serde_json::to_string(response)?;
    writer
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| io_err("rpc socket write", e))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| io_err("rpc socket write", e))?;
    writer
        .flush()
        .await
        .map_err(|e| io_err("rpc socket flush", e))?;
    Ok(())
}

#[cfg(unix)]
fn set_socket_permissions(path: &Path) -> Result<(), RpcError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_socket_permissions(_path: &Path) -> Result<(), RpcError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tempfile::TempDir;

    use super::*;

    #[derive(Default)]
    struct RecordingHandler {
        synchronize_calls: Mutex<usize>,
        notifications: Mutex<Vec<(Option<String>, String)>>,
    }

    impl RemoteHandler for RecordingHandler {
        fn synchronize(&self) {
            *self.synchronize_calls.lock().expect("lock") += 1;
        }

        fn notify(&self, title: Option<String>, message: String) {
            self.notifications.lock().expect("lock").push((title, message));
        }
    }

    fn server_with_handler(home: &Path) -> (Arc<RpcServer>, Arc<RecordingHandler>) {
        let handler = Arc::new(RecordingHandler::default());
        let server = Arc::new(RpcServer::new(
            home,
            ToolId::from("slate.remote"),
            Arc::clone(&handler) as Arc<dyn RemoteHandler>,
        ));
        (server, handler)
    }

    #[test]
    fn dispatch_synchronize_invokes_handler_once() {
        let home = TempDir::new().expect("home");
        let (server, handler) = server_with_handler(home.path());

        let response = server.dispatch(RemoteRequest::synchronize());

        assert!(response.ok);
        assert_eq!(*handler.synchronize_calls.lock().expect("lock"), 1);
    }

    #[test]
    fn dispatch_notify_passes_title_and_message() {
        let home = TempDir::new().expect("home");
        let (server, handler) = server_with_handler(home.path());

        let request = RemoteRequest::notify(Some("T".to_string()), "M");
        let response = server.dispatch(request);

        assert!(response.ok);
        let notifications = handler.notifications.lock().expect("lock");
        assert_eq!(notifications.as_slice(), &[(Some("T".to_string()), "M".to_string())]);
    }

    #[test]
    fn dispatch_notify_without_message_is_error() {
        let home = TempDir::new().expect("home");
        let (server, _) = server_with_handler(home.path());

        let request = RemoteRequest {
            cmd: "notify".to_string(),
            title: None,
            message: None,
        };
        let response = server.dispatch(request);

        assert!(!response.ok);
    }

    #[test]
    fn dispatch_unknown_command_is_error() {
        let home = TempDir::new().expect("home");
        let (server, _) = server_with_handler(home.path());

        let request = RemoteRequest {
            cmd: "reboot".to_string(),
            title: None,
            message: None,
        };
        let response = server.dispatch(request);

        assert!(!response.ok);
        assert!(response.error.expect("error text").contains("reboot"));
    }
}
