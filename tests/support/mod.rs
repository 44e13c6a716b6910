// Shared fixtures for integration tests.
use std::path::{Path, PathBuf};

use tempfile::TempDir;

// PEM material generated once with openssl: a CA, and a client cert/key signed by it.
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

// Copy the fixtures into a fresh directory so tests can remove or blank individual files.
pub fn credentials_dir() -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for name in ["public.cert", "private.key", "publicCA.cert"] {
        std::fs::copy(fixtures_dir().join(name), dir.path().join(name)).expect("copy fixture");
    }
    dir
}
