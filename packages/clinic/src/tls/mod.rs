use crate::DatabaseConfig;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{
    aws_lc_rs, verify_tls12_signature, verify_tls13_signature, WebPkiSupportedAlgorithms,
};
use rustls::{ClientConfig, DigitallySignedStruct, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use rustls_platform_verifier::ConfigVerifierExt;
use std::sync::Arc;

///
/// TLS settings for the database connection.
///
/// Certificates are checked against the platform roots unless
/// `database.with_tls_verification` is false.
///
pub fn configure_client(config: &DatabaseConfig) -> ClientConfig {
    let mut tls_config = ClientConfig::with_platform_verifier();

    if !config.with_tls_verification {
        tls_config
            .dangerous()
            .set_certificate_verifier(Arc::new(SkipCertificateVerification::new()));
    }

    tls_config
}

///
/// Accepts any server certificate chain.
/// Handshake signatures are still verified, so the connection stays encrypted
/// to whichever server presented the certificate.
///
#[derive(Debug)]
pub struct SkipCertificateVerification {
    algorithms: WebPkiSupportedAlgorithms,
}

impl SkipCertificateVerification {
    pub fn new() -> Self {
        SkipCertificateVerification {
            algorithms: aws_lc_rs::default_provider().signature_verification_algorithms,
        }
    }
}

impl Default for SkipCertificateVerification {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerCertVerifier for SkipCertificateVerification {
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
        verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}
