//! Wire primitives for catnats.
//!
//! This crate knows the handful of NATS protocol lines the bridge cares about:
//! the server's `INFO` greeting, the optional `CONNECT` line and the
//! `PING`/`PONG` heartbeat. It does no I/O; the client crate owns the socket.

mod connect;
mod frame;
mod info;

pub use connect::ConnectParams;
pub use frame::{CRLF, Framing, PING, PONG, READ_BUFFER_SIZE, contains_ping, trim_line_ending};
pub use info::{Greeting, ProtocolError, parse_greeting};

use serde::{Deserialize, Serialize};

/// Server capabilities announced in the `INFO` greeting.
///
/// Only `tls_required` drives behaviour. The other typed fields are read for
/// diagnostics, and anything the server sends beyond them is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// The client must upgrade to TLS before sending anything else.
    #[serde(default)]
    pub tls_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proto: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    /// Fields this crate does not interpret, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServerInfo {
    /// Whether the server said it needs credentials.
    pub fn requires_auth(&self) -> bool {
        self.auth_required.unwrap_or(false)
    }

    /// Short human-readable label for logs, e.g. `nats-1 (2.10.4)`.
    pub fn label(&self) -> String {
        let name = self
            .server_name
            .as_deref()
            .or(self.server_id.as_deref())
            .unwrap_or("unknown server");
        match &self.version {
            Some(version) => format!("{name} ({version})"),
            None => name.to_string(),
        }
    }
}
