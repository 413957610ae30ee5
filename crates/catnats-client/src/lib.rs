//! Client side of catnats.
//!
//! Connects to a NATS server, runs the greeting/TLS/`CONNECT` handshake and then
//! bridges a terminal to the socket. The bridge resolves with an [`Exit`] or a
//! [`ClientError`]; deciding what that means for the process is left to the
//! caller.

mod bridge;
mod error;
mod handshake;
mod heartbeat;
mod tls;
mod transport;

pub use bridge::{BINARY_PLACEHOLDER, BridgeConfig, Exit, run};
pub use error::ClientError;
pub use handshake::{Session, handshake};
pub use heartbeat::Heartbeat;
pub use tls::{NoTls, TlsOptions, TlsUpgrader, Upgrader};
pub use transport::{AsyncStream, BoxedStream, WriteGate, connect};

pub use catnats_core::{ConnectParams, Framing, ServerInfo};
