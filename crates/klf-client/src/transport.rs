//! TLS transport to the gateway.
//!
//! The KLF-200 listens on TCP port 51200 and presents a self-signed
//! certificate, so the connector installs a verifier that accepts any
//! certificate and skips hostname verification. The returned stream is a
//! plain `AsyncRead + AsyncWrite`; all protocol logic lives in
//! [`crate::GatewayClient`].

use std::sync::Arc;

use rustls::pki_types::ServerName;
use tokio::net::TcpStream;
use tokio_rustls::{TlsConnector, client::TlsStream};

use crate::error::ClientError;

/// TCP port the gateway listens on.
pub const GATEWAY_PORT: u16 = 51200;

/// Open a TLS connection to the gateway.
pub async fn connect(host: &str, port: u16) -> Result<TlsStream<TcpStream>, ClientError> {
    let connector = TlsConnector::from(Arc::new(insecure_client_config()));

    let tcp = TcpStream::connect((host, port)).await?;
    let server_name = ServerName::try_from(host.to_owned())
        .map_err(|e| ClientError::Address(e.to_string()))?;

    let stream = connector.connect(server_name, tcp).await?;
    tracing::debug!(host, port, "TLS connection to gateway established");
    Ok(stream)
}

/// Client config that accepts any certificate.
///
/// The gateway ships a self-signed certificate and no mechanism to install a
/// trusted one, so verification is disabled by construction.
fn insecure_client_config() -> rustls::ClientConfig {
    rustls::ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(InsecureCertVerifier))
        .with_no_client_auth()
}

/// Certificate verifier that accepts any certificate.
#[derive(Debug)]
struct InsecureCertVerifier;

impl rustls::client::danger::ServerCertVerifier for InsecureCertVerifier {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
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
        vec![
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA384,
            rustls::SignatureScheme::RSA_PKCS1_SHA512,
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::ECDSA_NISTP384_SHA384,
            rustls::SignatureScheme::ECDSA_NISTP521_SHA512,
            rustls::SignatureScheme::RSA_PSS_SHA256,
            rustls::SignatureScheme::RSA_PSS_SHA384,
            rustls::SignatureScheme::RSA_PSS_SHA512,
            rustls::SignatureScheme::ED25519,
        ]
    }
}
