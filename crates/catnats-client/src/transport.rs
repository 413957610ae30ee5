//! Socket plumbing.

use crate::ClientError;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// A byte stream the bridge can run over: plain TCP, TLS, or an in-memory pipe.
pub trait AsyncStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> AsyncStream for T {}

/// The connection after type erasure, so a TLS upgrade can replace it in place.
pub type BoxedStream = Box<dyn AsyncStream>;

/// Open a plain TCP connection to `host:port`.
pub async fn connect(host: &str, port: u16) -> Result<BoxedStream, ClientError> {
    let addr = format!("{host}:{port}");
    let stream = TcpStream::connect(&addr)
        .await
        .map_err(|source| ClientError::Connect {
            addr: addr.clone(),
            source,
        })?;
    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!("Could not set TCP_NODELAY: {}", e);
    }
    tracing::debug!("Connected to {}", addr);
    Ok(Box::new(stream))
}

/// Serialises writes to the transport.
///
/// The inbound task (heartbeat replies) and the outbound loop (user input) both
/// write. Each [`WriteGate::send`] holds the lock across the whole frame, so
/// frames never interleave; which writer goes first is unspecified.
#[derive(Clone)]
pub struct WriteGate {
    writer: Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>,
}

impl WriteGate {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            writer: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Write one complete frame and flush it.
    pub async fn send(&self, frame: &[u8]) -> io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(frame).await?;
        writer.flush().await
    }
}
