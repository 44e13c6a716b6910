//! Secure channel builder for the matchmaking frontend.
//!
//! Produces a TLS 1.3-only client configuration that presents the client certificate
//! (mutual authentication). When a CA bundle is supplied it becomes the only trust root and the
//! server identity is pinned to a fixed logical name instead of the dialed host.

use std::sync::Arc;

use rustls::client::WebPkiServerVerifier;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};

use crate::domain::{ChannelError, CredentialBundle};

/// Server identity the frontend certificate is issued for.
// Pinned regardless of the dialed address; verify against the deployment before reusing elsewhere.
pub const FRONTEND_SERVER_NAME: &str = "open-match-evaluator";

/// A built channel configuration. Consumed by exactly one connection.
pub struct ChannelConfig {
    tls: ClientConfig,
    pinned_server_name: Option<String>,
}

impl ChannelConfig {
    /// Server name certificates are checked against, when a trust root was supplied.
    pub fn pinned_server_name(&self) -> Option<&str> {
        self.pinned_server_name.as_deref()
    }

    /// True when the configuration carries a caller-supplied CA instead of the public roots.
    pub fn has_trust_root(&self) -> bool {
        self.pinned_server_name.is_some()
    }

    pub fn tls_config(&self) -> &ClientConfig {
        &self.tls
    }

    pub fn into_tls_config(self) -> ClientConfig {
        self.tls
    }
}

impl std::fmt::Debug for ChannelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConfig")
            .field("pinned_server_name", &self.pinned_server_name)
            .finish_non_exhaustive()
    }
}

/// Build a channel pinned to [`FRONTEND_SERVER_NAME`].
pub fn build_channel(bundle: &CredentialBundle) -> Result<ChannelConfig, ChannelError> {
    build_pinned_channel(bundle, FRONTEND_SERVER_NAME)
}

/// Build a channel, pinning the server identity to `server_name` when a CA is present.
pub fn build_pinned_channel(
    bundle: &CredentialBundle,
    server_name: &str,
) -> Result<ChannelConfig, ChannelError> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    // CA problems are reported before identity problems.
    let trust = if bundle.has_trust_anchor() {
        let roots = parse_trust_anchor(&bundle.ca_cert)?;
        let pinned = ServerName::try_from(server_name.to_string())
            .map_err(|_| ChannelError::InvalidServerName(server_name.to_string()))?;
        Some((roots, pinned))
    } else {
        None
    };

    let (cert_chain, key) = parse_identity(&bundle.client_cert, &bundle.client_key)?;

    let builder = ClientConfig::builder_with_provider(Arc::clone(&provider))
        .with_protocol_versions(&[&rustls::version::TLS13])
        .map_err(|err| ChannelError::InvalidKeyPair(format!("tls 1.3 unavailable: {err}")))?;

    let Some((roots, pinned)) = trust else {
        let roots = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        let tls = builder
            .with_root_certificates(roots)
            .with_client_auth_cert(cert_chain, key)
            .map_err(|err| ChannelError::InvalidKeyPair(err.to_string()))?;
        return Ok(ChannelConfig {
            tls,
            pinned_server_name: None,
        });
    };

    let verifier = PinnedServerVerifier::new(roots, pinned, provider)?;
    let tls = builder
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_client_auth_cert(cert_chain, key)
        .map_err(|err| ChannelError::InvalidKeyPair(err.to_string()))?;

    Ok(ChannelConfig {
        tls,
        pinned_server_name: Some(server_name.to_string()),
    })
}

fn parse_identity(
    cert_pem: &[u8],
    key_pem: &[u8],
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>), ChannelError> {
    let certs = rustls_pemfile::certs(&mut &cert_pem[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ChannelError::InvalidKeyPair(format!("client certificate: {err}")))?;
    if certs.is_empty() {
        return Err(ChannelError::InvalidKeyPair(
            "no certificate found in client certificate PEM".to_string(),
        ));
    }

    let key = rustls_pemfile::private_key(&mut &key_pem[..])
        .map_err(|err| ChannelError::InvalidKeyPair(format!("client key: {err}")))?
        .ok_or_else(|| {
            ChannelError::InvalidKeyPair("no private key found in client key PEM".to_string())
        })?;

    Ok((certs, key))
}

fn parse_trust_anchor(ca_pem: &[u8]) -> Result<RootCertStore, ChannelError> {
    let certs = rustls_pemfile::certs(&mut &ca_pem[..])
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ChannelError::InvalidTrustAnchor(err.to_string()))?;

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(certs);
    if added == 0 {
        return Err(ChannelError::InvalidTrustAnchor(format!(
            "no usable certificates ({ignored} rejected)"
        )));
    }
    if ignored > 0 {
        tracing::warn!(added, ignored, "some CA certificates were not usable.");
    }

    Ok(roots)
}

// Standard webpki verification, but always against the pinned name.
#[derive(Debug)]
struct PinnedServerVerifier {
    inner: Arc<WebPkiServerVerifier>,
    server_name: ServerName<'static>,
}

impl PinnedServerVerifier {
    fn new(
        roots: RootCertStore,
        server_name: ServerName<'static>,
        provider: Arc<CryptoProvider>,
    ) -> Result<Self, ChannelError> {
        let inner = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), provider)
            .build()
            .map_err(|err| ChannelError::InvalidTrustAnchor(err.to_string()))?;
        Ok(Self { inner, server_name })
    }
}

impl ServerCertVerifier for PinnedServerVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        _dialed_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        self.inner.verify_server_cert(
            end_entity,
            intermediates,
            &self.server_name,
            ocsp_response,
            now,
        )
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustls::ProtocolVersion;

    const CLIENT_CERT: &[u8] = include_bytes!("../../tests/fixtures/public.cert");
    const CLIENT_KEY: &[u8] = include_bytes!("../../tests/fixtures/private.key");
    const CA_CERT: &[u8] = include_bytes!("../../tests/fixtures/publicCA.cert");
    const OTHER_KEY: &[u8] = include_bytes!("../../tests/fixtures/other.key");

    fn bundle(cert: &[u8], key: &[u8], ca: &[u8]) -> CredentialBundle {
        CredentialBundle {
            client_cert: cert.to_vec(),
            client_key: key.to_vec(),
            ca_cert: ca.to_vec(),
        }
    }

    #[test]
    fn when_ca_is_empty_then_channel_has_no_trust_root() {
        let channel = build_channel(&bundle(CLIENT_CERT, CLIENT_KEY, b""))
            .expect("expected channel to build");

        assert!(!channel.has_trust_root());
        assert_eq!(channel.pinned_server_name(), None);
    }

    #[test]
    fn when_ca_is_present_then_server_name_is_pinned() {
        let channel = build_channel(&bundle(CLIENT_CERT, CLIENT_KEY, CA_CERT))
            .expect("expected channel to build");

        assert!(channel.has_trust_root());
        assert_eq!(channel.pinned_server_name(), Some(FRONTEND_SERVER_NAME));
    }

    #[test]
    fn when_custom_pin_is_given_then_it_replaces_default_name() {
        let channel = build_pinned_channel(&bundle(CLIENT_CERT, CLIENT_KEY, CA_CERT), "frontend.internal")
            .expect("expected channel to build");

        assert_eq!(channel.pinned_server_name(), Some("frontend.internal"));
    }

    #[test]
    fn when_channel_is_built_then_only_tls13_is_enabled() {
        let channel = build_channel(&bundle(CLIENT_CERT, CLIENT_KEY, CA_CERT))
            .expect("expected channel to build");

        assert!(channel.tls_config().supports_version(ProtocolVersion::TLSv1_3));
        assert!(!channel.tls_config().supports_version(ProtocolVersion::TLSv1_2));
    }

    #[test]
    fn when_ca_is_not_pem_then_returns_invalid_trust_anchor() {
        let result = build_channel(&bundle(CLIENT_CERT, CLIENT_KEY, b"definitely not a certificate"));

        assert!(matches!(result, Err(ChannelError::InvalidTrustAnchor(_))));
    }

    #[test]
    fn when_ca_is_not_pem_and_key_pair_is_broken_then_trust_anchor_error_wins() {
        let result = build_channel(&bundle(b"", b"", b"garbage"));

        assert!(matches!(result, Err(ChannelError::InvalidTrustAnchor(_))));
    }

    #[test]
    fn when_ca_pem_body_is_corrupt_then_returns_invalid_trust_anchor() {
        let corrupt = b"-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n";

        let result = build_channel(&bundle(CLIENT_CERT, CLIENT_KEY, corrupt));

        assert!(matches!(result, Err(ChannelError::InvalidTrustAnchor(_))));
    }

    #[test]
    fn when_key_is_missing_then_returns_invalid_key_pair() {
        let result = build_channel(&bundle(CLIENT_CERT, b"", CA_CERT));

        assert!(matches!(result, Err(ChannelError::InvalidKeyPair(_))));
    }

    #[test]
    fn when_cert_and_key_are_swapped_then_returns_invalid_key_pair() {
        let result = build_channel(&bundle(CLIENT_KEY, CLIENT_CERT, b""));

        assert!(matches!(result, Err(ChannelError::InvalidKeyPair(_))));
    }

    #[test]
    fn when_key_belongs_to_another_certificate_then_returns_invalid_key_pair() {
        let result = build_channel(&bundle(CLIENT_CERT, OTHER_KEY, CA_CERT));

        assert!(matches!(result, Err(ChannelError::InvalidKeyPair(_))));
    }

    #[test]
    fn when_pin_is_not_a_valid_name_then_returns_invalid_server_name() {
        let result = build_pinned_channel(&bundle(CLIENT_CERT, CLIENT_KEY, CA_CERT), "not a name!");

        assert!(matches!(result, Err(ChannelError::InvalidServerName(_))));
    }
}
