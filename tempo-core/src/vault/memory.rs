//! In-memory vault for tests and volatile sessions

use alloc::borrow::ToOwned;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::errors::{VaultError, VaultResult};
use crate::vault::Vault;

/// Vault that keeps every document in a map
///
/// Used by tests and by sessions that only persist on teardown. The
/// write-failure switch exists so retry behavior can be exercised without a
/// real failing backend.
#[derive(Debug, Default, Clone)]
pub struct MemoryVault {
    documents: BTreeMap<String, Vec<u8>>,
    fail_writes: bool,
}

impl MemoryVault {
    /// Empty vault
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail until switched back
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check whether the vault holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate stored keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }
}

impl Vault for MemoryVault {
    fn read(&self, key: &str) -> VaultResult<Vec<u8>> {
        self.documents.get(key).cloned().ok_or(VaultError::Missing)
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> VaultResult<()> {
        if self.fail_writes {
            return Err(VaultError::Write { reason: "injected" });
        }
        self.documents.insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, key: &str) -> bool {
        self.documents.contains_key(key)
    }
}
