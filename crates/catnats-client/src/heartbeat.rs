//! Automatic `PONG` replies.

use crate::WriteGate;
use catnats_core::{PONG, contains_ping};
use std::io;

/// Answers server `PING`s on the user's behalf when enabled.
///
/// One `PONG` per inbound chunk, however many `PING`s the chunk holds; the
/// server only needs to see some traffic to keep the connection open.
#[derive(Debug, Clone, Copy, Default)]
pub struct Heartbeat {
    enabled: bool,
}

impl Heartbeat {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Reply to `chunk` if it carries a probe. Returns whether a `PONG` went out.
    pub async fn respond(&self, chunk: &[u8], gate: &WriteGate) -> io::Result<bool> {
        if !self.enabled || !contains_ping(chunk) {
            return Ok(false);
        }
        gate.send(PONG).await?;
        tracing::trace!("Answered PING");
        Ok(true)
    }
}
