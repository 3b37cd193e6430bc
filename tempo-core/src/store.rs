//! Ordered Temporal Store with Point-in-Time Lookup
//!
//! ## Overview
//!
//! One [`TemporalStore`] holds one quantity's samples, ordered by timestamp
//! and unique per timestamp. It answers "what was this quantity at instant
//! t" for *any* t: exactly when a sample exists there, by field-wise
//! interpolation when t falls between two samples, and by holding the
//! nearest sample when t falls outside the recorded range. Only an empty
//! store answers with nothing.
//!
//! ## Ordering Discipline
//!
//! The sequence is kept sorted at insert time via binary search, never by
//! sorting after the fact:
//!
//! - insert of a fresh timestamp splices at the search position
//! - insert at an existing timestamp replaces that sample in place
//!
//! Every lookup is then a single `O(log n)` binary search for the tightest
//! bracketing pair. Before the first sample only an "after" bound exists;
//! past the last only a "before" bound; an exact hit collapses both bounds
//! to one index.
//!
//! ## Archival
//!
//! [`TemporalStore::archive`] bounds memory for long sessions. The
//! truncation boundary is the index of the latest sample at-or-before the
//! horizon, minus one, so the store always keeps at least one sample
//! at-or-under the horizon and interpolation across the boundary keeps
//! working after the prefix is gone. The truncated prefix goes to the vault
//! under an archive key stamped with the boundary sample's timestamp;
//! archive documents are append-only and never overwritten. Memory is only
//! truncated once the prefix is known to be in the vault: after a
//! successful write under a fresh stamp, or under an existing stamp only
//! when that document already holds exactly this prefix. Samples inserted
//! below an already archived boundary therefore stay in memory until a
//! later horizon reaches them.
//!
//! ## Dirtiness
//!
//! Inserts and watermark updates mark the store dirty; [`TemporalStore::save`]
//! is a no-op while clean and clears the flag on success. Archival does not
//! touch the flag: whether the post-archive sequence has been saved yet is
//! still the save cycle's business.
//!
//! ## Hydration
//!
//! A store restores itself from its vault documents at construction.
//! Anything wrong with the persisted state (missing, undecodable, out of
//! order) degrades to starting empty; restore is never an error.

use alloc::vec::Vec;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{log_warn, VaultError, VaultResult};
use crate::sample::{sample_between, Sample};
use crate::time::Timestamp;
use crate::vault::{
    archive_key, empty_archive_key, encode_document, meta_key, read_document, samples_key, Vault,
};

/// Out-of-band store metadata, one optional watermark slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct StoreMeta {
    refreshed_through: Option<Timestamp>,
}

/// Ordered, binary-searchable collection of one quantity's samples
#[derive(Debug, Clone)]
pub struct TemporalStore<S: Sample> {
    name: &'static str,
    samples: Vec<S>,
    refreshed_through: Option<Timestamp>,
    dirty: bool,
}

impl<S: Sample> TemporalStore<S> {
    /// Empty store for the series called `name`
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            samples: Vec::new(),
            refreshed_through: None,
            dirty: false,
        }
    }

    /// Logical series name, also the persistence key prefix
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check whether the store holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Earliest held sample
    pub fn first(&self) -> Option<&S> {
        self.samples.first()
    }

    /// Latest held sample
    pub fn last(&self) -> Option<&S> {
        self.samples.last()
    }

    /// Sample at a position in timestamp order
    pub fn get(&self, index: usize) -> Option<&S> {
        self.samples.get(index)
    }

    /// Iterate samples in timestamp order
    pub fn iter(&self) -> core::slice::Iter<'_, S> {
        self.samples.iter()
    }

    /// Whether unsaved changes exist
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Watermark: the instant this series has been refreshed through
    pub fn refreshed_through(&self) -> Option<Timestamp> {
        self.refreshed_through
    }

    /// Advance (or rewind) the watermark; marks the store dirty
    pub fn set_refreshed_through(&mut self, through: Timestamp) {
        self.refreshed_through = Some(through);
        self.dirty = true;
    }

    /// Position of the latest sample at-or-before `at`
    fn index_at_or_before(&self, at: Timestamp) -> Option<usize> {
        match self.search(at) {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) => Some(i - 1),
        }
    }

    /// Latest sample at-or-before `at`
    pub fn at_or_before(&self, at: Timestamp) -> Option<&S> {
        self.index_at_or_before(at).map(|i| &self.samples[i])
    }

    /// Latest sample strictly before `at`
    pub fn strictly_before(&self, at: Timestamp) -> Option<&S> {
        match self.search(at) {
            Ok(0) | Err(0) => None,
            Ok(i) | Err(i) => Some(&self.samples[i - 1]),
        }
    }

    /// Insert a sample, replacing any existing sample at the same
    /// timestamp; returns the sample's position. Marks the store dirty.
    pub fn insert(&mut self, sample: S) -> usize {
        let at = sample.timestamp();
        let index = match self.search(at) {
            Ok(i) => {
                self.samples[i] = sample;
                i
            }
            Err(i) => {
                self.samples.insert(i, sample);
                i
            }
        };
        self.dirty = true;
        index
    }

    /// Best-known value at `at`: exact sample, interpolation between the
    /// bracketing pair, held nearest sample, or `None` when empty
    pub fn lookup(&self, at: Timestamp) -> Option<S> {
        match self.search(at) {
            Ok(i) => Some(self.samples[i].clone()),
            Err(i) => {
                let earlier = i.checked_sub(1).map(|j| &self.samples[j]);
                let later = self.samples.get(i);
                match (earlier, later) {
                    (Some(a), Some(b)) => Some(sample_between(a, b, at)),
                    (Some(only), None) | (None, Some(only)) => Some(only.held_at(at)),
                    (None, None) => None,
                }
            }
        }
    }

    /// Sample stored exactly at `at`, if any
    pub fn lookup_exact(&self, at: Timestamp) -> Option<&S> {
        self.search(at).ok().map(|i| &self.samples[i])
    }

    fn search(&self, at: Timestamp) -> Result<usize, usize> {
        self.samples.binary_search_by(|s| s.timestamp().cmp(&at))
    }
}

impl<S: Sample + Serialize + DeserializeOwned> TemporalStore<S> {
    /// Store restored from the vault, or empty when nothing usable is
    /// persisted. Never fails; a corrupt document degrades to empty.
    pub fn hydrated(name: &'static str, vault: &dyn Vault) -> Self {
        let mut store = Self::new(name);

        match read_document::<Vec<S>>(vault, &samples_key(name)) {
            Ok(samples) if strictly_ordered(&samples) => store.samples = samples,
            Ok(_) => {
                log_warn!("{}: persisted samples out of order, starting empty", name);
            }
            Err(VaultError::Missing) => {}
            Err(_err) => {
                log_warn!("{}: could not restore samples: {:?}", name, _err);
            }
        }

        match read_document::<StoreMeta>(vault, &meta_key(name)) {
            Ok(meta) => store.refreshed_through = meta.refreshed_through,
            Err(VaultError::Missing) => {}
            Err(_err) => {
                log_warn!("{}: could not restore metadata: {:?}", name, _err);
            }
        }

        store
    }

    /// Persist the remaining sequence and metadata. No-op while clean;
    /// clears the dirty flag on success.
    pub fn save(&mut self, vault: &mut dyn Vault) -> VaultResult<()> {
        if !self.dirty {
            return Ok(());
        }

        let samples = encode_document(&self.samples)?;
        vault.write(&samples_key(self.name), &samples)?;

        let meta = encode_document(&StoreMeta {
            refreshed_through: self.refreshed_through,
        })?;
        vault.write(&meta_key(self.name), &meta)?;

        self.dirty = false;
        Ok(())
    }

    /// Persist and drop everything strictly before the truncation boundary
    /// for `up_to`; returns how many samples were archived.
    ///
    /// When nothing qualifies, the series' single shared empty marker is
    /// written instead and the sequence is untouched. Archive documents are
    /// never overwritten: a boundary whose document already exists is
    /// drained only when the persisted content matches the prefix, anything
    /// else stays in memory until a later horizon gives it a fresh stamp.
    /// A failed write leaves memory intact for the next cycle.
    pub fn archive(&mut self, up_to: Timestamp, vault: &mut dyn Vault) -> VaultResult<usize> {
        let boundary = self
            .index_at_or_before(up_to)
            .map(|latest| latest.saturating_sub(1))
            .unwrap_or(0);

        if boundary == 0 {
            let key = empty_archive_key(self.name);
            if !vault.exists(&key) {
                vault.write(&key, &encode_document(&Vec::<S>::new())?)?;
            }
            return Ok(0);
        }

        let stamp = self.samples[boundary].timestamp();
        let key = archive_key(self.name, stamp);
        let bytes = encode_document(&self.samples[..boundary])?;

        if vault.exists(&key) {
            // A rehydrated store re-trims a prefix it archived before the
            // last save; identical content is safe to drop. Different
            // content means inserts landed below an archived boundary:
            // those stay in memory until a later horizon covers them.
            if vault.read(&key)? != bytes {
                log_warn!(
                    "{}: archive {} already holds different samples, keeping prefix in memory",
                    self.name,
                    stamp
                );
                return Ok(0);
            }
        } else {
            vault.write(&key, &bytes)?;
        }

        self.samples.drain(..boundary);
        Ok(boundary)
    }
}

fn strictly_ordered<S: Sample>(samples: &[S]) -> bool {
    samples
        .windows(2)
        .all(|pair| pair[0].timestamp() < pair[1].timestamp())
}


#[cfg(all(test, feature = "vault-memory"))]
mod persistence_tests {
    use super::*;
    use crate::series::location::DistanceSample;
    use crate::vault::MemoryVault;

    fn filled(n: u64) -> TemporalStore<DistanceSample> {
        let mut store = TemporalStore::new("distance");
        for i in 1..=n {
            store.insert(DistanceSample::new(i * 1_000, i as f64 * 10.0));
        }
        store
    }

    #[test]
    fn save_is_noop_while_clean_and_clears_dirty() {
        let mut vault = MemoryVault::new();
        let mut store = filled(3);

        store.save(&mut vault).unwrap();
        assert!(!store.is_dirty());
        assert!(vault.exists("distance.samples"));
        assert!(vault.exists("distance.meta"));

        // Clean save writes nothing even into a poisoned vault
        vault.fail_writes(true);
        store.save(&mut vault).unwrap();
    }

    #[test]
    fn failed_save_stays_dirty_and_retries() {
        let mut vault = MemoryVault::new();
        let mut store = filled(2);

        vault.fail_writes(true);
        assert!(store.save(&mut vault).is_err());
        assert!(store.is_dirty());

        vault.fail_writes(false);
        store.save(&mut vault).unwrap();
        assert!(!store.is_dirty());
    }

    #[test]
    fn hydration_round_trips_samples_and_watermark() {
        let mut vault = MemoryVault::new();
        let mut store = filled(3);
        store.set_refreshed_through(3_000);
        store.save(&mut vault).unwrap();

        let restored: TemporalStore<DistanceSample> = TemporalStore::hydrated("distance", &vault);
        assert_eq!(restored.len(), 3);
        assert_eq!(restored.refreshed_through(), Some(3_000));
        assert!(!restored.is_dirty());
        assert_eq!(restored.lookup(1_500).unwrap().meters, 15.0);
    }

    #[test]
    fn corrupt_documents_degrade_to_empty() {
        let mut vault = MemoryVault::new();
        vault.write("distance.samples", b"definitely not json").unwrap();

        let restored: TemporalStore<DistanceSample> = TemporalStore::hydrated("distance", &vault);
        assert!(restored.is_empty());
        assert!(!restored.is_dirty());
    }

    #[test]
    fn unordered_documents_degrade_to_empty() {
        let mut vault = MemoryVault::new();
        let backwards = [
            DistanceSample::new(2_000, 20.0),
            DistanceSample::new(1_000, 10.0),
        ];
        let bytes = crate::vault::encode_document(&backwards).unwrap();
        vault.write("distance.samples", &bytes).unwrap();

        let restored: TemporalStore<DistanceSample> = TemporalStore::hydrated("distance", &vault);
        assert!(restored.is_empty());
    }

    #[test]
    fn archive_truncates_before_boundary_and_keeps_lookup_intact() {
        let mut vault = MemoryVault::new();
        let mut store = filled(10); // samples at 1s..10s

        // Horizon at 5s: latest-at-or-before is index 4, boundary index 3,
        // so 1s..3s go to the archive and 4s stays as the boundary sample.
        let archived = store.archive(5_000, &mut vault).unwrap();
        assert_eq!(archived, 3);
        assert_eq!(store.first().unwrap().timestamp, 4_000);
        assert_eq!(store.len(), 7);
        assert!(vault.exists("distance.archive.4000"));

        // Interpolation across the retained boundary still works
        assert_eq!(store.lookup(5_500).unwrap().meters, 55.0);
        // And values from the earliest retained stamp onward are unchanged
        assert_eq!(store.lookup(4_000).unwrap().meters, 40.0);
    }

    #[test]
    fn empty_horizons_share_one_archive_marker() {
        let mut vault = MemoryVault::new();
        let mut store = filled(2);

        // Horizon before everything: nothing qualifies
        let archived = store.archive(500, &mut vault).unwrap();
        assert_eq!(archived, 0);
        assert_eq!(store.len(), 2);

        let marker = vault.read("distance.archive.empty").unwrap();
        let decoded: Vec<DistanceSample> = crate::vault::decode_document(&marker).unwrap();
        assert!(decoded.is_empty());

        // Repeats and fresh empty horizons reuse the marker; the vault
        // never grows a document per tick
        assert_eq!(store.archive(500, &mut vault).unwrap(), 0);
        assert_eq!(store.archive(700, &mut vault).unwrap(), 0);
        assert_eq!(store.archive(900, &mut vault).unwrap(), 0);
        assert_eq!(vault.len(), 1);
    }

    #[test]
    fn failed_archive_write_leaves_memory_untouched() {
        let mut vault = MemoryVault::new();
        let mut store = filled(10);

        vault.fail_writes(true);
        assert!(store.archive(5_000, &mut vault).is_err());
        assert_eq!(store.len(), 10);

        vault.fail_writes(false);
        assert_eq!(store.archive(5_000, &mut vault).unwrap(), 3);
        assert_eq!(store.len(), 7);
    }

    #[test]
    fn archive_documents_are_append_only() {
        let mut vault = MemoryVault::new();
        let mut store = filled(10);

        store.archive(5_000, &mut vault).unwrap();
        let first = vault.read("distance.archive.4000").unwrap();

        // Later horizon writes a new stamped document, not a rewrite
        store.archive(8_000, &mut vault).unwrap();
        assert!(vault.exists("distance.archive.7000"));
        assert_eq!(vault.read("distance.archive.4000").unwrap(), first);
    }

    #[test]
    fn rearchived_horizon_keeps_backdated_corrections() {
        let mut vault = MemoryVault::new();
        let mut store = filled(10);

        assert_eq!(store.archive(5_000, &mut vault).unwrap(), 3);
        let first = vault.read("distance.archive.4000").unwrap();

        // Corrections land below the already archived boundary
        store.insert(DistanceSample::new(1_500, 15.0));
        store.insert(DistanceSample::new(2_500, 25.0));

        // Same horizon, same boundary stamp, different prefix: nothing
        // may be dropped and the earlier document stays as written
        assert_eq!(store.archive(5_000, &mut vault).unwrap(), 0);
        assert_eq!(store.first().unwrap().timestamp, 1_500);
        assert_eq!(store.lookup_exact(2_500).unwrap().meters, 25.0);
        assert_eq!(vault.read("distance.archive.4000").unwrap(), first);

        // A later horizon archives the corrections under a fresh stamp
        assert_eq!(store.archive(7_000, &mut vault).unwrap(), 4);
        let second = vault.read("distance.archive.6000").unwrap();
        let archived: Vec<DistanceSample> = crate::vault::decode_document(&second).unwrap();
        let stamps: Vec<Timestamp> = archived.iter().map(|s| s.timestamp).collect();
        assert_eq!(stamps, [1_500, 2_500, 4_000, 5_000]);
        assert_eq!(store.first().unwrap().timestamp, 6_000);
    }

    #[test]
    fn rehydrated_store_retrims_an_already_archived_prefix() {
        let mut vault = MemoryVault::new();
        let mut store = filled(10);
        store.save(&mut vault).unwrap();

        // Archive after the save: the samples document still holds the
        // full sequence, so a restart resurrects the archived prefix
        assert_eq!(store.archive(5_000, &mut vault).unwrap(), 3);

        let mut revived: TemporalStore<DistanceSample> =
            TemporalStore::hydrated("distance", &vault);
        assert_eq!(revived.len(), 10);

        // Same boundary, identical prefix content: safe to drop again
        assert_eq!(revived.archive(5_000, &mut vault).unwrap(), 3);
        assert_eq!(revived.first().unwrap().timestamp, 4_000);
    }
}
