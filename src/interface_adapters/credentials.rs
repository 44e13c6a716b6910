use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::{CredentialBundle, CredentialError, CredentialSource};

// Reads the three PEM files from disk on every load; nothing is cached.
#[derive(Debug, Clone)]
pub struct FileCredentialSource {
    pub client_cert: PathBuf,
    pub client_key: PathBuf,
    pub ca_cert: PathBuf,
}

impl FileCredentialSource {
    pub fn new(
        client_cert: impl Into<PathBuf>,
        client_key: impl Into<PathBuf>,
        ca_cert: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client_cert: client_cert.into(),
            client_key: client_key.into(),
            ca_cert: ca_cert.into(),
        }
    }

    // The conventional file names, resolved against `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(
            dir.join("public.cert"),
            dir.join("private.key"),
            dir.join("publicCA.cert"),
        )
    }
}

async fn read(kind: &'static str, path: &Path) -> Result<Vec<u8>, CredentialError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| CredentialError::Unreadable {
            kind,
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl CredentialSource for FileCredentialSource {
    async fn load(&self) -> Result<CredentialBundle, CredentialError> {
        let client_cert = read("client certificate", &self.client_cert).await?;
        let client_key = read("client key", &self.client_key).await?;
        let ca_cert = read("CA certificate", &self.ca_cert).await?;

        tracing::debug!(
            cert = %self.client_cert.display(),
            ca = %self.ca_cert.display(),
            "credentials loaded."
        );

        Ok(CredentialBundle {
            client_cert,
            client_key,
            ca_cert,
        })
    }
}
