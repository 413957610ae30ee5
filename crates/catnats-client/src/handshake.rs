//! Greeting, TLS upgrade and `CONNECT`, in that order.

use crate::{BoxedStream, ClientError, Upgrader};
use catnats_core::{ConnectParams, READ_BUFFER_SIZE, ServerInfo, parse_greeting};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A connection that finished the handshake and is ready to bridge.
pub struct Session {
    pub info: ServerInfo,
    pub stream: BoxedStream,
    /// Server bytes that arrived in the same read as the greeting. The bridge
    /// relays them before reading from the socket.
    pub pending: Vec<u8>,
    /// Whether the stream was upgraded to TLS.
    pub upgraded: bool,
}

/// Run the handshake on a freshly connected stream.
///
/// The greeting is a single read of at most [`READ_BUFFER_SIZE`] bytes. Unless
/// `quiet`, the greeting line is echoed to `terminal`. A `CONNECT` line is
/// written only when `params` has something to say, and always before this
/// function returns, so it precedes any user input.
pub async fn handshake<U, T>(
    mut stream: BoxedStream,
    upgrader: &U,
    params: &ConnectParams,
    terminal: &mut T,
    quiet: bool,
) -> Result<Session, ClientError>
where
    U: Upgrader,
    T: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let n = stream.read(&mut buf).await?;
    let greeting = parse_greeting(&buf[..n])?;
    let info = greeting.info;
    tracing::debug!("Greeting from {}", info.label());

    let upgraded = info.tls_required;
    if upgraded {
        tracing::info!("Server requires TLS, upgrading");
        stream = upgrader.upgrade(stream).await?;
    }

    if !quiet {
        terminal.write_all(greeting.line).await?;
        terminal.flush().await?;
    }

    if info.requires_auth() && !params.has_credentials() {
        tracing::warn!("Server requires authentication but no credentials are configured");
    }

    if let Some(line) = params.to_line()? {
        stream.write_all(&line).await?;
        stream.flush().await?;
        tracing::info!("Sent CONNECT");
    }

    Ok(Session {
        info,
        stream,
        pending: greeting.rest.to_vec(),
        upgraded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoTls;
    use catnats_core::ProtocolError;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::io::{AsyncReadExt, DuplexStream, duplex};

    /// Records the upgrade and hands the stream back unchanged.
    #[derive(Default)]
    struct FakeTls {
        called: Arc<AtomicBool>,
    }

    impl Upgrader for FakeTls {
        async fn upgrade(&self, stream: BoxedStream) -> Result<BoxedStream, ClientError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(stream)
        }
    }

    async fn server_says(greeting: &[u8]) -> (BoxedStream, DuplexStream) {
        let (client, mut server) = duplex(8192);
        server.write_all(greeting).await.unwrap();
        (Box::new(client), server)
    }

    async fn drain(mut server: DuplexStream, session: Session) -> Vec<u8> {
        drop(session);
        let mut written = Vec::new();
        server.read_to_end(&mut written).await.unwrap();
        written
    }

    #[tokio::test]
    async fn plain_greeting_without_auth_writes_nothing() {
        let (stream, server) = server_says(b"INFO {\"tls_required\": false}\r\n").await;
        let tls = FakeTls::default();
        let mut terminal = Vec::<u8>::new();

        let session = handshake(stream, &tls, &ConnectParams::default(), &mut terminal, false)
            .await
            .unwrap();

        assert!(!session.upgraded);
        assert!(!tls.called.load(Ordering::SeqCst));
        assert_eq!(terminal, b"INFO {\"tls_required\": false}\r\n");
        assert!(drain(server, session).await.is_empty());
    }

    #[tokio::test]
    async fn tls_required_upgrades() {
        let (stream, _server) = server_says(b"INFO {\"tls_required\":true}\r\n").await;
        let tls = FakeTls::default();

        let session = handshake(stream, &tls, &ConnectParams::default(), &mut tokio::io::sink(), true)
            .await
            .unwrap();

        assert!(session.upgraded);
        assert!(tls.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn tls_required_without_tls_support_fails() {
        let (stream, _server) = server_says(b"INFO {\"tls_required\":true}\r\n").await;
        let err = handshake(stream, &NoTls, &ConnectParams::default(), &mut tokio::io::sink(), true)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::TlsUnavailable));
    }

    #[tokio::test]
    async fn credentials_send_one_connect() {
        let (stream, server) = server_says(b"INFO {\"auth_required\":true}\r\n").await;
        let params = ConnectParams::credentials("derek", "pw");

        let session = handshake(stream, &NoTls, &params, &mut tokio::io::sink(), true)
            .await
            .unwrap();

        assert_eq!(
            drain(server, session).await,
            b"CONNECT {\"user\":\"derek\",\"pass\":\"pw\"}\r\n"
        );
    }

    #[tokio::test]
    async fn quiet_suppresses_greeting_echo() {
        let (stream, _server) = server_says(b"INFO {}\r\n").await;
        let mut terminal = Vec::<u8>::new();
        handshake(stream, &NoTls, &ConnectParams::default(), &mut terminal, true)
            .await
            .unwrap();
        assert!(terminal.is_empty());
    }

    #[tokio::test]
    async fn pipelined_bytes_are_pending() {
        let (stream, _server) = server_says(b"INFO {}\r\nPING\r\n").await;
        let mut terminal = Vec::<u8>::new();
        let session = handshake(stream, &NoTls, &ConnectParams::default(), &mut terminal, false)
            .await
            .unwrap();
        assert_eq!(terminal, b"INFO {}\r\n");
        assert_eq!(session.pending, b"PING\r\n");
    }

    #[tokio::test]
    async fn malformed_greeting_is_fatal() {
        let (stream, _server) = server_says(b"HELLO there\r\n").await;
        let err = handshake(stream, &NoTls, &ConnectParams::default(), &mut tokio::io::sink(), true)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::Protocol(ProtocolError::NotAGreeting(_))));
    }

    #[tokio::test]
    async fn closed_before_greeting() {
        let (client, server) = duplex(64);
        drop(server);
        let err = handshake(
            Box::new(client),
            &NoTls,
            &ConnectParams::default(),
            &mut tokio::io::sink(),
            true,
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, ClientError::Protocol(ProtocolError::Closed)));
    }
}
