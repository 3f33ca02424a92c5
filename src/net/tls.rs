//! TLS configuration and certificate loading.
//!
//! Server side: the HTTPS transport's certificate and key.
//! Client side: the rustls configuration used for `https://` upstreams.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{aws_lc_rs, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use thiserror::Error;

/// Error type for TLS setup.
#[derive(Debug, Error)]
pub enum TlsError {
    #[error("{kind} file not found: {}", .path.display())]
    MissingMaterial { kind: &'static str, path: PathBuf },

    #[error("failed to load TLS material: {0}")]
    Load(#[source] std::io::Error),

    #[error("failed to build upstream TLS client: {0}")]
    Client(#[from] rustls::Error),
}

/// Crypto provider used for both transports and the upstream client.
pub fn crypto_provider() -> Arc<CryptoProvider> {
    Arc::new(aws_lc_rs::default_provider())
}

/// Install the process-wide default provider. Safe to call more than once.
pub fn install_crypto_provider() {
    let _ = aws_lc_rs::default_provider().install_default();
}

/// Load TLS configuration from certificate and key files.
pub async fn load_tls_config(cert_path: &Path, key_path: &Path) -> Result<RustlsConfig, TlsError> {
    if !cert_path.exists() {
        return Err(TlsError::MissingMaterial {
            kind: "certificate",
            path: cert_path.to_path_buf(),
        });
    }
    if !key_path.exists() {
        return Err(TlsError::MissingMaterial {
            kind: "private key",
            path: key_path.to_path_buf(),
        });
    }

    RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(TlsError::Load)
}

/// Client configuration that accepts any upstream certificate.
///
/// Certificate chains and host names are not checked. Handshake signatures
/// still are, so the peer must hold the key for the certificate it presents.
/// Only for upstreams with self-signed certificates, enabled with the HTTPS
/// transport.
pub fn insecure_client_config() -> Result<ClientConfig, TlsError> {
    let provider = crypto_provider();
    let config = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert { provider }))
        .with_no_client_auth();
    Ok(config)
}

#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
