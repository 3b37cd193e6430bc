//! Directory-of-documents vault (requires `std`)
//!
//! One file per document under a root directory, file name equal to the
//! document key. Keys only ever contain `[a-z0-9_.]` (series names plus the
//! layout suffixes), so they are safe as file names on every platform.
//!
//! Writes go through a sibling temp file and a rename, so a crashed or
//! failed write never clobbers the previous document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::errors::{VaultError, VaultResult};
use crate::vault::Vault;

/// Vault storing each document as a file in one directory
///
/// ## Example
///
/// ```rust,no_run
/// use tempo_core::vault::{FileVault, Vault};
///
/// let mut vault = FileVault::create("/var/lib/tempo")?;
/// vault.write("heart_rate.samples", b"[]")?;
/// # Ok::<(), tempo_core::VaultError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileVault {
    root: PathBuf,
}

impl FileVault {
    /// Open a vault rooted at `root`, creating the directory if needed
    pub fn create(root: impl Into<PathBuf>) -> VaultResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(write_error)?;
        Ok(Self { root })
    }

    /// Directory this vault stores documents in
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl Vault for FileVault {
    fn read(&self, key: &str) -> VaultResult<Vec<u8>> {
        fs::read(self.document_path(key)).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                VaultError::Missing
            } else {
                read_error(e)
            }
        })
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> VaultResult<()> {
        let path = self.document_path(key);
        let tmp = self.root.join(format!("{key}.tmp"));

        fs::write(&tmp, bytes).map_err(write_error)?;
        fs::rename(&tmp, &path).map_err(write_error)
    }

    fn exists(&self, key: &str) -> bool {
        self.document_path(key).exists()
    }
}

fn read_error(e: std::io::Error) -> VaultError {
    VaultError::Read {
        reason: error_class(e.kind()),
    }
}

fn write_error(e: std::io::Error) -> VaultError {
    VaultError::Write {
        reason: error_class(e.kind()),
    }
}

fn error_class(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "not found",
        ErrorKind::PermissionDenied => "permission denied",
        _ => "io",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_documents_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut vault = FileVault::create(dir.path()).unwrap();

        assert_eq!(vault.read("distance.samples"), Err(VaultError::Missing));

        vault.write("distance.samples", b"[1,2]").unwrap();
        assert!(vault.exists("distance.samples"));
        assert_eq!(vault.read("distance.samples").unwrap(), b"[1,2]");

        // A second vault over the same directory sees the same documents
        let reopened = FileVault::create(dir.path()).unwrap();
        assert_eq!(reopened.read("distance.samples").unwrap(), b"[1,2]");
    }

    #[test]
    fn replace_keeps_key_stable() {
        let dir = tempfile::tempdir().unwrap();
        let mut vault = FileVault::create(dir.path()).unwrap();

        vault.write("segments.meta", b"{}").unwrap();
        vault.write("segments.meta", b"{\"v\":2}").unwrap();
        assert_eq!(vault.read("segments.meta").unwrap(), b"{\"v\":2}");

        // Temp file from the write dance does not linger
        assert!(!vault.exists("segments.meta.tmp"));
    }
}
