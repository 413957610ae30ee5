//! TLS upgrade of an established connection.
//!
//! The server asks for TLS in its greeting; the upgrade happens on the same TCP
//! stream right after the `INFO` line, before anything else is written.

use crate::{BoxedStream, ClientError};
use rustls::RootCertStore;
use rustls::pki_types::ServerName;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_rustls::TlsConnector;

/// Turns a plain stream into an encrypted one.
pub trait Upgrader {
    fn upgrade(
        &self,
        stream: BoxedStream,
    ) -> impl Future<Output = Result<BoxedStream, ClientError>> + Send;
}

/// Refuses every upgrade. For `--no-tls`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTls;

impl Upgrader for NoTls {
    async fn upgrade(&self, _stream: BoxedStream) -> Result<BoxedStream, ClientError> {
        Err(ClientError::TlsUnavailable)
    }
}

/// Trust settings for the upgrade.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// PEM file with extra root certificates, added to the webpki roots.
    pub ca_file: Option<PathBuf>,
    /// Accept any server certificate. Development only.
    pub insecure: bool,
}

/// rustls-backed [`Upgrader`].
pub struct TlsUpgrader {
    connector: TlsConnector,
    server_name: ServerName<'static>,
}

impl TlsUpgrader {
    /// Build an upgrader that verifies the server as `host`.
    pub fn new(host: &str, options: &TlsOptions) -> Result<Self, ClientError> {
        let server_name = ServerName::try_from(host.to_string())
            .map_err(|_| ClientError::ServerName(host.to_string()))?;
        let config = client_config(options)?;
        Ok(Self {
            connector: TlsConnector::from(Arc::new(config)),
            server_name,
        })
    }
}

impl Upgrader for TlsUpgrader {
    async fn upgrade(&self, stream: BoxedStream) -> Result<BoxedStream, ClientError> {
        let tls = self
            .connector
            .connect(self.server_name.clone(), stream)
            .await
            .map_err(ClientError::Tls)?;
        Ok(Box::new(tls))
    }
}

fn client_config(options: &TlsOptions) -> Result<rustls::ClientConfig, ClientError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| ClientError::TlsConfig(e.to_string()))?;

    if options.insecure {
        tracing::warn!("TLS certificate verification is disabled");
        return Ok(builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(InsecureCertVerifier))
            .with_no_client_auth());
    }

    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    if let Some(path) = &options.ca_file {
        add_ca_file(&mut roots, path)?;
    }

    Ok(builder.with_root_certificates(roots).with_no_client_auth())
}

fn add_ca_file(roots: &mut RootCertStore, path: &Path) -> Result<(), ClientError> {
    let pem = std::fs::read(path).map_err(|e| {
        ClientError::TlsConfig(format!("failed to read {}: {e}", path.display()))
    })?;
    let certs = rustls_pemfile::certs(&mut &pem[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ClientError::TlsConfig(format!("failed to parse certificates: {e}")))?;
    if certs.is_empty() {
        return Err(ClientError::TlsConfig(format!(
            "no certificates found in {}",
            path.display()
        )));
    }
    for cert in certs {
        roots
            .add(cert)
            .map_err(|e| ClientError::TlsConfig(format!("invalid CA certificate: {e}")))?;
    }
    Ok(())
}

/// Certificate verifier that accepts anything (`--tls-insecure`).
#[derive(Debug)]
struct InsecureCertVerifier;

impl rustls::client::danger::ServerCertVerifier for InsecureCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &rustls::pki_types::CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_dns_and_ip_names() {
        assert!(TlsUpgrader::new("nats.example.com", &TlsOptions::default()).is_ok());
        assert!(TlsUpgrader::new("127.0.0.1", &TlsOptions::default()).is_ok());
    }

    #[test]
    fn rejects_invalid_server_name() {
        let err = TlsUpgrader::new("not a host", &TlsOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::ServerName(_)));
    }

    #[test]
    fn missing_ca_file_is_config_error() {
        let options = TlsOptions {
            ca_file: Some(PathBuf::from("/nonexistent/catnats-ca.pem")),
            insecure: false,
        };
        let err = TlsUpgrader::new("localhost", &options).err().unwrap();
        assert!(matches!(err, ClientError::TlsConfig(_)));
    }

    #[tokio::test]
    async fn no_tls_refuses() {
        let (stream, _peer) = tokio::io::duplex(64);
        let err = NoTls.upgrade(Box::new(stream)).await.err().unwrap();
        assert!(matches!(err, ClientError::TlsUnavailable));
    }
}
