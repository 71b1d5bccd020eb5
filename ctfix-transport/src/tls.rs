/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 18/10/26
******************************************************************************/

//! TLS client configuration.
//!
//! Connections negotiate TLS 1.2 or 1.3 and verify the server against the
//! Mozilla root set. Certificate verification can be switched off with
//! [`TlsOptions::danger_accept_invalid_certs`], which is meant for test
//! environments only.

use ctfix_core::error::ConnectionError;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use std::sync::Arc;
use tokio_rustls::TlsConnector;
use tracing::warn;

/// Options for the encrypted transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    /// Overrides the name used for SNI and certificate checks.
    pub server_name: Option<String>,
    /// Skips server certificate verification. Never enable in production.
    pub danger_accept_invalid_certs: bool,
}

impl TlsOptions {
    /// Creates options that verify the server certificate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            server_name: None,
            danger_accept_invalid_certs: false,
        }
    }

    /// Sets the SNI server name.
    #[must_use]
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// Disables certificate verification.
    #[must_use]
    pub const fn with_danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.danger_accept_invalid_certs = accept;
        self
    }

    /// Builds a connector from these options.
    ///
    /// # Errors
    /// Returns [`ConnectionError::Tls`] if the protocol versions cannot be
    /// configured with the crypto provider.
    pub fn connector(&self) -> Result<TlsConnector, ConnectionError> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
            .with_protocol_versions(&[&rustls::version::TLS13, &rustls::version::TLS12])
            .map_err(|e| ConnectionError::Tls(e.to_string()))?;

        let config = if self.danger_accept_invalid_certs {
            warn!("TLS certificate verification is disabled");
            builder
                .dangerous()
                .with_custom_certificate_verifier(Arc::new(NoVerification(provider)))
                .with_no_client_auth()
        } else {
            let mut roots = RootCertStore::empty();
            roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
            builder.with_root_certificates(roots).with_no_client_auth()
        };

        Ok(TlsConnector::from(Arc::new(config)))
    }

    /// Resolves the server name for the given host.
    ///
    /// # Errors
    /// Returns [`ConnectionError::Tls`] if the name is not a valid DNS name
    /// or IP address.
    pub fn server_name(&self, host: &str) -> Result<ServerName<'static>, ConnectionError> {
        let name = self.server_name.as_deref().unwrap_or(host);
        ServerName::try_from(name.to_owned())
            .map_err(|e| ConnectionError::Tls(format!("invalid server name {name:?}: {e}")))
    }
}

/// Accepts any server certificate while still checking handshake signatures.
#[derive(Debug)]
struct NoVerification(Arc<CryptoProvider>);

impl ServerCertVerifier for NoVerification {
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
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
