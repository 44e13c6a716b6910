use std::fmt;

// Raw PEM material used to build one secure channel. Dropped once the channel is built.
#[derive(Clone)]
pub struct CredentialBundle {
    pub client_cert: Vec<u8>,
    pub client_key: Vec<u8>,
    // Empty when no trust anchor is configured.
    pub ca_cert: Vec<u8>,
}

impl CredentialBundle {
    pub fn has_trust_anchor(&self) -> bool {
        !self.ca_cert.is_empty()
    }
}

// Keep key bytes out of logs.
impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("client_cert_len", &self.client_cert.len())
            .field("client_key", &"<redacted>")
            .field("ca_cert_len", &self.ca_cert.len())
            .finish()
    }
}
