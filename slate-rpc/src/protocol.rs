//! Wire types and the blocking client for the remote endpoint.
//!
//! One request per line, one response per line, both JSON. The client is
//! deliberately synchronous: external peers are short-lived processes that
//! send a single request and exit.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use slate_core::paths::socket_path;
use slate_core::types::ToolId;

use crate::error::{io_err, RpcError};

/// JSON newline-delimited request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteRequest {
    pub cmd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RemoteRequest {
    pub fn synchronize() -> Self {
        Self {
            cmd: "synchronize".to_string(),
            title: None,
            message: None,
        }
    }

    pub fn notify(title: Option<String>, message: impl Into<String>) -> Self {
        Self {
            cmd: "notify".to_string(),
            title,
            message: Some(message.into()),
        }
    }
}

/// JSON newline-delimited response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoteResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Send one JSON request to the endpoint socket and return one response.
pub fn send_request(
    home: &Path,
    identity: &ToolId,
    request: &RemoteRequest,
) -> Result<RemoteResponse, RpcError> {
    let socket = socket_path(home, identity);
    if !socket.exists() {
        return Err(RpcError::EndpointNotRunning { socket });
    }

    let mut stream = UnixStream::connect(&socket).map_err(|err| {
        if matches!(
            err.kind(),
            std::io::ErrorKind::NotFound
                | std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
        ) {
            RpcError::EndpointNotRunning {
                socket: socket.clone(),
            }
        } else {
            io_err(&socket, err)
        }
    })?;

    let payload = serde_json::to_string(request)?;
    stream
        .write_all(payload.as_bytes())
        .map_err(|e| io_err(&socket, e))?;
    stream.write_all(b"\n").map_err(|e| io_err(&socket, e))?;
    stream.flush().map_err(|e| io_err(&socket, e))?;

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .map_err(|e| io_err(&socket, e))?;
    if read == 0 {
        return Err(RpcError::Protocol(
            "endpoint closed connection before responding".to_string(),
        ));
    }

    let response: RemoteResponse = serde_json::from_str(line.trim_end())?;
    Ok(response)
}

/// Ask the host to pull settings from the driver and apply them.
pub fn request_synchronize(home: &Path, identity: &ToolId) -> Result<(), RpcError> {
    let response = send_request(home, identity, &RemoteRequest::synchronize())?;
    response_into_data(response).map(|_| ())
}

/// Show a desktop notification in the host app.
pub fn request_notify(
    home: &Path,
    identity: &ToolId,
    title: Option<String>,
    message: &str,
) -> Result<(), RpcError> {
    let response = send_request(home, identity, &RemoteRequest::notify(title, message))?;
    response_into_data(response).map(|_| ())
}

fn response_into_data(response: RemoteResponse) -> Result<Value, RpcError> {
    if response.ok {
        Ok(response.data.unwrap_or(Value::Null))
    } else {
        Err(RpcError::Protocol(
            response
                .error
                .unwrap_or_else(|| "unknown endpoint error".to_string()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn synchronize_request_omits_notification_fields() {
        let json = serde_json::to_string(&RemoteRequest::synchronize()).expect("serialize");
        assert_eq!(json, r#"{"cmd":"synchronize"}"#);
    }

    #[test]
    fn notify_request_roundtrip() {
        let request = RemoteRequest::notify(Some("Title".to_string()), "Body");
        let json = serde_json::to_string(&request).expect("serialize");
        let decoded: RemoteRequest = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded.cmd, "notify");
        assert_eq!(decoded.title.as_deref(), Some("Title"));
        assert_eq!(decoded.message.as_deref(), Some("Body"));
    }

    #[test]
    fn notify_request_without_title_deserializes_as_none() {
        let decoded: RemoteRequest =
            serde_json::from_str(r#"{"cmd":"notify","message":"m"}"#).expect("deserialize");
        assert!(decoded.title.is_none());
    }

    #[test]
    fn error_response_fails_data_extraction() {
        let err = response_into_data(RemoteResponse::error("boom")).expect_err("error response");
        assert!(matches!(err, RpcError::Protocol(message) if message == "boom"));
    }

    #[test]
    fn send_request_without_socket_is_not_running() {
        let home = TempDir::new().expect("home");
        let err = send_request(
            home.path(),
            &ToolId::from("slate.remote"),
            &RemoteRequest::synchronize(),
        )
        .expect_err("no endpoint");
        assert!(matches!(err, RpcError::EndpointNotRunning { .. }));
    }
}
