use catnats_core::ProtocolError;
use std::io;

/// Anything that stops the handshake or the bridge.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The TCP connection could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Connect { addr: String, source: io::Error },
    #[error("bad greeting: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("server requires TLS but TLS is disabled")]
    TlsUnavailable,
    #[error("invalid TLS server name: {0}")]
    ServerName(String),
    #[error("TLS configuration: {0}")]
    TlsConfig(String),
    #[error("TLS handshake failed: {0}")]
    Tls(#[source] io::Error),
    #[error("failed to encode CONNECT: {0}")]
    Encode(#[from] serde_json::Error),
    /// A read or write on an established stream failed.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
    #[error("inbound task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ClientError {
    /// True when no connection was ever established.
    pub fn is_connect(&self) -> bool {
        matches!(self, ClientError::Connect { .. })
    }
}
