//! RPC channel between the Slate host process and one external peer:
//! newline-delimited JSON over a Unix domain socket.
//!
//! The async [`server::RpcServer`] is the endpoint owned by the host; the
//! blocking client functions in [`protocol`] are what external processes
//! (and the CLI) use to reach it.

mod error;
pub mod protocol;
pub mod server;

pub use error::RpcError;
pub use protocol::{
    request_notify, request_synchronize, send_request, RemoteRequest, RemoteResponse,
};
pub use server::{RemoteHandler, RpcServer};
