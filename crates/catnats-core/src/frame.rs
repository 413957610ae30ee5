//! Outbound framing and heartbeat detection.

/// Line delimiter for every protocol line.
pub const CRLF: &[u8] = b"\r\n";

/// Liveness probe sent by the server.
pub const PING: &[u8] = b"PING\r\n";

/// Acknowledgment for [`PING`].
pub const PONG: &[u8] = b"PONG\r\n";

/// Upper bound on a single socket read, greeting included.
pub const READ_BUFFER_SIZE: usize = 4096;

/// How terminal input is turned into bytes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// One protocol line per input line, terminated with CRLF.
    #[default]
    Line,
    /// Input forwarded verbatim, no delimiters added.
    Raw,
}

impl Framing {
    /// Bytes to write for one unit of input, or `None` when the input is
    /// empty, which callers treat as end-of-input.
    pub fn encode(self, input: &[u8]) -> Option<Vec<u8>> {
        match self {
            Framing::Line => {
                let line = trim_line_ending(input);
                if line.is_empty() {
                    return None;
                }
                let mut framed = Vec::with_capacity(line.len() + CRLF.len());
                framed.extend_from_slice(line);
                framed.extend_from_slice(CRLF);
                Some(framed)
            }
            Framing::Raw => (!input.is_empty()).then(|| input.to_vec()),
        }
    }
}

/// Strip every trailing `\r` and `\n`.
pub fn trim_line_ending(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|b| *b != b'\r' && *b != b'\n')
        .map_or(0, |i| i + 1);
    &line[..end]
}

/// Whether `chunk` contains a `PING` line anywhere.
///
/// This is a plain substring scan: a probe split across two reads is missed,
/// and the token inside a message payload is matched.
pub fn contains_ping(chunk: &[u8]) -> bool {
    chunk.windows(PING.len()).any(|window| window == PING)
}

pub(crate) fn find_crlf(chunk: &[u8]) -> Option<usize> {
    chunk.windows(CRLF.len()).position(|window| window == CRLF)
}
