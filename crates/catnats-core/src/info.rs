//! The server greeting.
//!
//! Greeting format: `INFO <json>\r\n`
//!
//! The server sends it once, immediately after the TCP connection is accepted.
//! The read that carries it may also carry the start of whatever the server
//! sends next, so the parser hands those bytes back instead of dropping them.

use crate::ServerInfo;
use crate::frame::{CRLF, find_crlf};

const INFO_PREFIX: &[u8] = b"INFO ";

/// How much of an unexpected first line is kept for the error message.
const PREVIEW_LEN: usize = 64;

/// A decoded greeting plus the bytes around it.
#[derive(Debug, Clone)]
pub struct Greeting<'a> {
    /// The decoded `INFO` payload.
    pub info: ServerInfo,
    /// The greeting line exactly as received, delimiter included.
    pub line: &'a [u8],
    /// Bytes that followed the greeting in the same read.
    pub rest: &'a [u8],
}

/// Decode the `INFO` line at the start of `chunk`.
pub fn parse_greeting(chunk: &[u8]) -> Result<Greeting<'_>, ProtocolError> {
    if chunk.is_empty() {
        return Err(ProtocolError::Closed);
    }

    let end = find_crlf(chunk).ok_or(ProtocolError::MissingDelimiter)?;
    let payload = chunk[..end]
        .strip_prefix(INFO_PREFIX)
        .ok_or_else(|| ProtocolError::NotAGreeting(preview(&chunk[..end])))?;

    let info: ServerInfo = serde_json::from_slice(payload)?;
    let split = end + CRLF.len();

    Ok(Greeting {
        info,
        line: &chunk[..split],
        rest: &chunk[split..],
    })
}

fn preview(line: &[u8]) -> String {
    let cut = line.len().min(PREVIEW_LEN);
    String::from_utf8_lossy(&line[..cut]).into_owned()
}

/// Error decoding the server greeting.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("server closed the connection before sending INFO")]
    Closed,
    #[error("greeting is not terminated by CRLF")]
    MissingDelimiter,
    #[error("expected an INFO greeting, got: {0}")]
    NotAGreeting(String),
    #[error("INFO payload is not a valid JSON object: {0}")]
    InvalidInfo(#[from] serde_json::Error),
}
