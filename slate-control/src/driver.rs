//! Connection to the Slate driver daemon.
//!
//! The driver holds the authoritative settings; synchronization pulls them
//! from here. The daemon may simply not be running — that is an expected
//! state, not an error.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use slate_core::types::Settings;
use slate_rpc::{RemoteResponse, RpcError};

/// The driver daemon surface this controller consumes.
#[async_trait]
pub trait DriverClient: Send + Sync {
    /// Current authoritative settings; `None` when the driver is not
    /// running or has no settings loaded.
    async fn get_settings(&self) -> Option<Settings>;
}

/// JSON-line client for the driver daemon's Unix socket.
pub struct SocketDriverClient {
    socket: PathBuf,
}

impl SocketDriverClient {
    pub fn new(socket: impl Into<PathBuf>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    async fn fetch(&self) -> Result<Option<Settings>, RpcError> {
        let stream = UnixStream::connect(&self.socket)
            .await
            .map_err(|source| RpcError::Io {
                path: self.socket.clone(),
                source,
            })?;
        let (reader, mut writer) = stream.into_split();

        let request = serde_json::json!({ "cmd": "get_settings" }).to_string();
        writer
            .write_all(request.as_bytes())
            .await
            .map_err(|source| RpcError::Io {
                path: self.socket.clone(),
                source,
            })?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|source| RpcError::Io {
                path: self.socket.clone(),
                source,
            })?;
        writer.flush().await.map_err(|source| RpcError::Io {
            path: self.socket.clone(),
            source,
        })?;

        let mut lines = BufReader::new(reader).lines();
        let line = lines
            .next_line()
            .await
            .map_err(|source| RpcError::Io {
                path: self.socket.clone(),
                source,
            })?
            .ok_or_else(|| {
                RpcError::Protocol("driver closed connection before responding".to_string())
            })?;

        let response: RemoteResponse = serde_json::from_str(line.trim_end())?;
        if !response.ok {
            return Err(RpcError::Protocol(
                response
                    .error
                    .unwrap_or_else(|| "unknown driver error".to_string()),
            ));
        }
        match response.data {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DriverClient for SocketDriverClient {
    async fn get_settings(&self) -> Option<Settings> {
        match self.fetch().await {
            Ok(settings) => settings,
            Err(err) => {
                tracing::debug!(
                    socket = %self.socket.display(),
                    error = %err,
                    "driver settings fetch failed",
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use tokio::net::UnixListener;

    use slate_core::types::{ToolEntry, ToolId};

    use super::*;

    async fn fake_driver(listener: UnixListener, response: String) {
        let (stream, _) = listener.accept().await.expect("accept");
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();
        let _request = lines.next_line().await.expect("read request");
        writer
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        writer.write_all(b"\n").await.expect("write newline");
        writer.flush().await.expect("flush");
    }

    #[tokio::test]
    async fn get_settings_returns_driver_snapshot() {
        let dir = TempDir::new().expect("dir");
        let socket = dir.path().join("driver.sock");
        let listener = UnixListener::bind(&socket).expect("bind");

        let settings = Settings {
            tools: vec![ToolEntry {
                identity: ToolId::from("slate.remote"),
                enabled: true,
                options: Default::default(),
            }],
            profiles: vec![],
        };
        let response = serde_json::to_string(&RemoteResponse::ok(
            serde_json::to_value(&settings).expect("encode settings"),
        ))
        .expect("encode response");
        let driver = tokio::spawn(fake_driver(listener, response));

        let client = SocketDriverClient::new(&socket);
        let fetched = client.get_settings().await.expect("snapshot");
        assert_eq!(fetched, settings);
        driver.await.expect("fake driver");
    }

    #[tokio::test]
    async fn get_settings_with_empty_data_is_none() {
        let dir = TempDir::new().expect("dir");
        let socket = dir.path().join("driver.sock");
        let listener = UnixListener::bind(&socket).expect("bind");

        let response = r#"{"ok":true}"#.to_string();
        let driver = tokio::spawn(fake_driver(listener, response));

        let client = SocketDriverClient::new(&socket);
        assert!(client.get_settings().await.is_none());
        driver.await.expect("fake driver");
    }

    #[tokio::test]
    async fn get_settings_without_driver_is_none() {
        let dir = TempDir::new().expect("dir");
        let client = SocketDriverClient::new(dir.path().join("driver.sock"));
        assert!(client.get_settings().await.is_none());
    }
}
