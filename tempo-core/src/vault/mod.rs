//! Document vault: the storage seam every store persists through
//!
//! The store never touches files or platform key-value APIs. It speaks to a
//! [`Vault`]: byte documents under string keys, nothing else. JSON is the
//! document codec so that persisted state is inspectable and survives field
//! additions (new optionals decode as absent).
//!
//! ## Module Organization
//!
//! - Trait, codec helpers, and key layout (this file)
//! - `memory` - In-memory vault for tests and volatile sessions
//! - `file` - Directory-of-documents vault (requires `std`)
//!
//! ## Key layout
//!
//! Per series `name`:
//! - `{name}.samples` - the ordered remaining sequence
//! - `{name}.meta` - the watermark metadata document
//! - `{name}.archive.{stamp}` - append-only truncated-prefix snapshots
//! - `{name}.archive.empty` - the one shared nothing-qualified marker

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{VaultError, VaultResult};
use crate::time::Timestamp;

// Re-export submodules based on features
#[cfg(feature = "vault-memory")]
pub mod memory;

#[cfg(feature = "vault-file")]
pub mod file;

#[cfg(feature = "vault-memory")]
pub use memory::MemoryVault;

#[cfg(feature = "vault-file")]
pub use file::FileVault;

/// Byte documents under string keys
///
/// Implementations only need dumb byte storage; codec and key discipline
/// live on this side of the seam. Writes must be atomic per document: a
/// failed write leaves the previous document intact.
pub trait Vault {
    /// Read the document under `key`
    fn read(&self, key: &str) -> VaultResult<Vec<u8>>;

    /// Write (create or replace) the document under `key`
    fn write(&mut self, key: &str, bytes: &[u8]) -> VaultResult<()>;

    /// Check whether a document exists under `key`
    fn exists(&self, key: &str) -> bool;
}

/// Key of a series' sample-sequence document
pub fn samples_key(name: &str) -> String {
    format!("{name}.samples")
}

/// Key of a series' metadata document
pub fn meta_key(name: &str) -> String {
    format!("{name}.meta")
}

/// Key of one archive snapshot, stamped with the boundary timestamp
pub fn archive_key(name: &str, stamp: Timestamp) -> String {
    format!("{name}.archive.{stamp}")
}

/// Key of the marker written when an archive pass finds nothing to
/// truncate. One fixed key per series, so repeated empty passes never
/// grow the vault and never shadow a numeric boundary stamp.
pub fn empty_archive_key(name: &str) -> String {
    format!("{name}.archive.empty")
}

/// Encode a value into document bytes
pub fn encode_document<T: Serialize + ?Sized>(value: &T) -> VaultResult<Vec<u8>> {
    serde_json::to_vec(value).map_err(|_| VaultError::Encode { reason: "json" })
}

/// Decode document bytes into a value
pub fn decode_document<T: DeserializeOwned>(bytes: &[u8]) -> VaultResult<T> {
    serde_json::from_slice(bytes).map_err(|_| VaultError::Decode { reason: "json" })
}

/// Read and decode the document under `key` in one step
pub fn read_document<T: DeserializeOwned>(vault: &dyn Vault, key: &str) -> VaultResult<T> {
    decode_document(&vault.read(key)?)
}
