//! The terminal bridge.
//!
//! Two loops share the connection: a spawned inbound task copies server bytes
//! to the terminal (answering `PING`s on the way), and the outbound loop, run
//! in the caller's task, frames terminal input onto the wire. Both write
//! through the same [`WriteGate`].

use crate::{ClientError, Heartbeat, Session, WriteGate};
use catnats_core::{Framing, READ_BUFFER_SIZE};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;

/// Written to the terminal in place of an inbound chunk that is not UTF-8.
pub const BINARY_PLACEHOLDER: &[u8] = b"[binary data]\n";

/// Knobs for [`run`].
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub framing: Framing,
    /// Discard inbound data instead of printing it.
    pub quiet: bool,
    /// Answer `PING` with `PONG` automatically.
    pub auto_pong: bool,
    /// Finish when input runs out. When false, keep waiting for more.
    pub exit_on_empty: bool,
    /// Sleep between input polls once input has run out and `exit_on_empty` is off.
    pub idle_pause: Duration,
    /// How long to keep printing server output after input has finished.
    pub linger: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            framing: Framing::Line,
            quiet: false,
            auto_pong: false,
            exit_on_empty: true,
            idle_pause: Duration::from_secs(1),
            linger: Duration::from_secs(1),
        }
    }
}

/// Why the bridge stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Input ran out and the linger period passed.
    InputFinished,
    /// The server closed the connection.
    PeerClosed,
}

/// Bridge `input` and `terminal` to the session's connection.
///
/// Resolves as soon as either side is done: the server closing or failing
/// ends the bridge immediately, whatever input is still pending. The inbound
/// task is aborted before returning.
pub async fn run<I, T>(
    session: Session,
    input: I,
    terminal: T,
    config: &BridgeConfig,
) -> Result<Exit, ClientError>
where
    I: AsyncRead + Unpin,
    T: AsyncWrite + Send + Unpin + 'static,
{
    let (reader, writer) = tokio::io::split(session.stream);
    let gate = WriteGate::new(writer);

    let mut inbound = tokio::spawn(inbound(
        reader,
        session.pending,
        gate.clone(),
        terminal,
        Heartbeat::new(config.auto_pong),
        config.quiet,
    ));

    let step = tokio::select! {
        joined = &mut inbound => Step::Inbound(joined),
        sent = outbound(input, &gate, config) => Step::Outbound(sent),
    };

    let result = match step {
        Step::Inbound(joined) => joined?,
        Step::Outbound(Ok(())) => linger(&mut inbound, config.linger).await,
        Step::Outbound(Err(e)) => Err(e),
    };
    inbound.abort();
    result
}

enum Step {
    Inbound(Result<Result<Exit, ClientError>, tokio::task::JoinError>),
    Outbound(Result<(), ClientError>),
}

async fn linger(
    inbound: &mut JoinHandle<Result<Exit, ClientError>>,
    period: Duration,
) -> Result<Exit, ClientError> {
    match tokio::time::timeout(period, inbound).await {
        Ok(joined) => joined?,
        Err(_) => Ok(Exit::InputFinished),
    }
}

async fn inbound<R, T>(
    mut reader: R,
    pending: Vec<u8>,
    gate: WriteGate,
    mut terminal: T,
    heartbeat: Heartbeat,
    quiet: bool,
) -> Result<Exit, ClientError>
where
    R: AsyncRead + Unpin,
    T: AsyncWrite + Unpin,
{
    if !pending.is_empty() {
        relay(&pending, &gate, &mut terminal, heartbeat, quiet).await?;
    }

    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            tracing::debug!("Server closed the connection");
            return Ok(Exit::PeerClosed);
        }
        relay(&buf[..n], &gate, &mut terminal, heartbeat, quiet).await?;
    }
}

async fn relay<T>(
    chunk: &[u8],
    gate: &WriteGate,
    terminal: &mut T,
    heartbeat: Heartbeat,
    quiet: bool,
) -> Result<(), ClientError>
where
    T: AsyncWrite + Unpin,
{
    heartbeat.respond(chunk, gate).await?;
    if quiet {
        return Ok(());
    }

    match std::str::from_utf8(chunk) {
        Ok(text) => terminal.write_all(text.as_bytes()).await?,
        Err(e) => {
            tracing::debug!("Inbound chunk of {} bytes is not UTF-8: {}", chunk.len(), e);
            terminal.write_all(BINARY_PLACEHOLDER).await?;
        }
    }
    terminal.flush().await?;
    Ok(())
}

async fn outbound<I>(input: I, gate: &WriteGate, config: &BridgeConfig) -> Result<(), ClientError>
where
    I: AsyncRead + Unpin,
{
    let mut input = BufReader::new(input);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match config.framing {
            Framing::Line => input.read_until(b'\n', &mut buf).await?,
            Framing::Raw => input.read_to_end(&mut buf).await?,
        };

        match config.framing.encode(&buf) {
            Some(frame) => gate.send(&frame).await?,
            None if config.exit_on_empty => {
                tracing::debug!("End of input");
                return Ok(());
            }
            None => tokio::time::sleep(config.idle_pause).await,
        }
    }
}
