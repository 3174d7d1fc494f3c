//! TLS client configuration
//!
//! Two policies: the default one verifies the certificate chain against
//! the Mozilla root bundle and checks the hostname; `--insecure` swaps in
//! a verifier that accepts anything the server presents.

use crate::error::{Error, Result};
use rustls::{ClientConfig, RootCertStore};
use rustls::crypto::CryptoProvider;
use std::sync::Arc;
use tokio_rustls::TlsConnector;

/// How the server certificate is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Full chain validation against default roots plus hostname check.
    Verified,
    /// No chain validation, no hostname check. Testing only.
    Insecure,
}

impl TlsPolicy {
    #[must_use]
    pub const fn from_insecure(insecure: bool) -> Self {
        if insecure { Self::Insecure } else { Self::Verified }
    }

    #[must_use]
    pub const fn verifies_certificates(self) -> bool {
        matches!(self, Self::Verified)
    }

    /// Hostname verification is part of the webpki verifier, so it is
    /// enabled exactly when certificates are verified.
    #[must_use]
    pub const fn checks_hostname(self) -> bool {
        matches!(self, Self::Verified)
    }

    /// Build the rustls client configuration for this policy, trusting
    /// the Mozilla root bundle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tls`] if the crypto provider rejects the default
    /// protocol versions.
    pub fn client_config(self) -> Result<ClientConfig> {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        self.client_config_with_roots(roots)
    }

    /// Like [`TlsPolicy::client_config`], but trusting `roots` instead
    /// of the default bundle. The insecure policy ignores them.
    ///
    /// # Errors
    ///
    /// Same as [`TlsPolicy::client_config`].
    pub fn client_config_with_roots(self, roots: RootCertStore) -> Result<ClientConfig> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| Error::Tls(format!("Unsupported protocol versions: {e}")))?;

        let config = match self {
            Self::Verified => builder.with_root_certificates(roots).with_no_client_auth(),
            Self::Insecure => builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(AcceptAnyCert::new()))
                .with_no_client_auth(),
        };
        Ok(config)
    }

    /// [`TlsPolicy::client_config`] wrapped in a tokio connector.
    ///
    /// # Errors
    ///
    /// Same as [`TlsPolicy::client_config`].
    pub fn connector(self) -> Result<TlsConnector> {
        Ok(TlsConnector::from(Arc::new(self.client_config()?)))
    }
}

/// Certificate verifier that accepts every certificate and hostname.
///
/// Handshake signatures are still checked so the session keys are
/// bound to whatever key the server presented.
#[derive(Debug)]
struct AcceptAnyCert {
    provider: CryptoProvider,
}

impl AcceptAnyCert {
    fn new() -> Self {
        Self {
            provider: rustls::crypto::ring::default_provider(),
        }
    }
}

impl rustls::client::danger::ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &rustls::pki_types::CertificateDer<'_>,
        _intermediates: &[rustls::pki_types::CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp_response: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> std::result::Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &rustls::pki_types::CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
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
        cert: &rustls::pki_types::CertificateDer<'_>,
        dss: &rustls::DigitallySignedStruct,
    ) -> std::result::Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
