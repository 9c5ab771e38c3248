use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the endpoint server and the blocking client.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("endpoint socket already in use: {path}")]
    SocketInUse { path: PathBuf },

    #[error("remote endpoint is not running (socket missing: {socket})")]
    EndpointNotRunning { socket: PathBuf },

    #[error("rpc protocol error: {0}")]
    Protocol(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RpcError {
    RpcError::Io {
        path: path.into(),
        source,
    }
}
