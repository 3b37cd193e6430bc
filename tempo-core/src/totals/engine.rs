//! Snapshot maintenance and aggregation
//!
//! ## Refresh Model
//!
//! The engine owns one snapshot store and repairs it in two tiers. A
//! *dirty-after* marker, set whenever late or corrected source data lands,
//! forces every snapshot at or after that instant to re-pull all of its
//! sub-samples from the sources. Snapshots before the marker (or all of
//! them, when nothing is dirty) are only backfilled: sub-samples that are
//! already set are trusted and left alone, unset ones are looked up again
//! in case a source has since learned enough to answer.
//!
//! The marker is an in-memory repair cursor and is deliberately separate
//! from the store's persisted watermark, which records how far refresh has
//! ever processed.
//!
//! ## Borrowing
//!
//! [`TotalsSources`] carries plain shared borrows of the source stores, so
//! a refresh can never mutate a source and the compiler enforces that the
//! snapshot store and the sources are disjoint.

use alloc::collections::btree_map::Entry;

use crate::errors::{TotalsError, TotalsResult, VaultResult};
use crate::sample::Sample;
use crate::series::heart::{HeartBeatsSample, HeartRateSample};
use crate::series::intensity::IntensitySample;
use crate::series::location::{DistanceSample, LocationSample};
use crate::series::motion::MotionSample;
use crate::series::pedometer::PedometerSample;
use crate::series::segment::{SegmentId, SegmentSample};
use crate::store::TemporalStore;
use crate::time::Timestamp;
use crate::totals::{Snapshot, TotalsBucket, TotalsKey, TotalsMap};
use crate::vault::Vault;

const TOTALS_NAME: &str = "totals";

/// Shared borrows of every series a snapshot draws from
#[derive(Debug, Clone, Copy)]
pub struct TotalsSources<'a> {
    /// GPS fixes
    pub location: &'a TemporalStore<LocationSample>,
    /// Cumulative GPS distance
    pub distance: &'a TemporalStore<DistanceSample>,
    /// Heart-rate readings
    pub heart_rate: &'a TemporalStore<HeartRateSample>,
    /// Heart-rate integral
    pub heart_beats: &'a TemporalStore<HeartBeatsSample>,
    /// Pedometer counters
    pub pedometer: &'a TemporalStore<PedometerSample>,
    /// Motion classifications
    pub motion: &'a TemporalStore<MotionSample>,
    /// Intensity zone markers
    pub intensity: &'a TemporalStore<IntensitySample>,
    /// Segment markers
    pub segments: &'a TemporalStore<SegmentSample>,
}

/// Maintains the snapshot store and aggregates it into keyed totals
#[derive(Debug, Clone)]
pub struct TotalsEngine {
    store: TemporalStore<Snapshot>,
    dirty_after: Option<Timestamp>,
}

impl Default for TotalsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TotalsEngine {
    /// Empty engine with nothing to repair
    pub fn new() -> Self {
        Self {
            store: TemporalStore::new(TOTALS_NAME),
            dirty_after: None,
        }
    }

    /// Engine over a snapshot store hydrated from the vault
    pub fn hydrated(vault: &dyn Vault) -> Self {
        Self {
            store: TemporalStore::hydrated(TOTALS_NAME, vault),
            dirty_after: None,
        }
    }

    /// Read access to the snapshot store
    pub fn snapshots(&self) -> &TemporalStore<Snapshot> {
        &self.store
    }

    /// Instant the next refresh will start re-pulling from, if any
    pub fn dirty_after(&self) -> Option<Timestamp> {
        self.dirty_after
    }

    /// Ensures a snapshot slot exists at `at` without disturbing one that
    /// is already there
    pub fn note(&mut self, at: Timestamp) {
        if self.store.lookup_exact(at).is_none() {
            self.store.insert(Snapshot::empty(at));
        }
    }

    /// Widens the repair range to start no later than `at`
    pub fn mark_dirty_from(&mut self, at: Timestamp) {
        self.dirty_after = Some(match self.dirty_after {
            Some(existing) if existing <= at => existing,
            _ => at,
        });
    }

    /// Brings every snapshot up to date against the sources
    ///
    /// Snapshots at or after the dirty-after marker re-pull all of their
    /// sub-samples; the rest only fill sub-samples that are still unset.
    /// Clears the marker and advances the store's watermark to the latest
    /// snapshot processed.
    pub fn refresh(&mut self, sources: &TotalsSources<'_>) {
        let dirty_after = self.dirty_after.take();

        for index in 0..self.store.len() {
            let (at, unset, current) = match self.store.get(index) {
                Some(s) => (s.timestamp, has_unset(s), s.clone()),
                None => break,
            };

            let rebuilt = if dirty_after.map_or(false, |d| at >= d) {
                Self::pull(at, sources)
            } else if unset {
                Self::backfill(current.clone(), sources)
            } else {
                continue;
            };

            // same-timestamp insert replaces in place, so indices hold
            if rebuilt != current {
                self.store.insert(rebuilt);
            }
        }

        if let Some(latest) = self.store.last().map(|s| s.timestamp) {
            if self.store.refreshed_through() != Some(latest) {
                self.store.set_refreshed_through(latest);
            }
        }
    }

    /// Fresh snapshot at `at`, pulled from the sources without touching
    /// the snapshot store
    pub fn synthesize(&self, at: Timestamp, sources: &TotalsSources<'_>) -> Snapshot {
        Self::pull(at, sources)
    }

    fn pull(at: Timestamp, sources: &TotalsSources<'_>) -> Snapshot {
        Snapshot {
            timestamp: at,
            location: sources.location.lookup(at),
            distance: sources.distance.lookup(at),
            heart_rate: sources.heart_rate.lookup(at),
            heart_beats: sources.heart_beats.lookup(at),
            pedometer: sources.pedometer.lookup(at),
            motion: sources.motion.lookup(at),
            // discriminators never interpolate or pull backwards
            intensity: sources.intensity.at_or_before(at).map(|s| s.held_at(at)),
            segment: sources.segments.at_or_before(at).map(|s| s.held_at(at)),
        }
    }

    fn backfill(mut snapshot: Snapshot, sources: &TotalsSources<'_>) -> Snapshot {
        let at = snapshot.timestamp;
        if snapshot.location.is_none() {
            snapshot.location = sources.location.lookup(at);
        }
        if snapshot.distance.is_none() {
            snapshot.distance = sources.distance.lookup(at);
        }
        if snapshot.heart_rate.is_none() {
            snapshot.heart_rate = sources.heart_rate.lookup(at);
        }
        if snapshot.heart_beats.is_none() {
            snapshot.heart_beats = sources.heart_beats.lookup(at);
        }
        if snapshot.pedometer.is_none() {
            snapshot.pedometer = sources.pedometer.lookup(at);
        }
        if snapshot.motion.is_none() {
            snapshot.motion = sources.motion.lookup(at);
        }
        if snapshot.intensity.is_none() {
            snapshot.intensity = sources.intensity.at_or_before(at).map(|s| s.held_at(at));
        }
        if snapshot.segment.is_none() {
            snapshot.segment = sources.segments.at_or_before(at).map(|s| s.held_at(at));
        }
        snapshot
    }

    /// Totals for the segment `through` belongs to, grouped by segment and
    /// intensity zone
    ///
    /// Walks consecutive snapshot pairs older than `through`, then the pair
    /// ending at `through` itself. Pairs whose earlier snapshot carries no
    /// segment marker, or one from before the requested segment, contribute
    /// nothing.
    pub fn sum_up(&self, through: &Snapshot) -> TotalsResult<TotalsMap> {
        let requested = through
            .segment_id()
            .ok_or(TotalsError::MissingSegmentMarker)?;

        let mut totals = TotalsMap::new();
        let mut previous: Option<&Snapshot> = None;

        let stored = self.store.iter().filter(|s| s.timestamp < through.timestamp);
        for current in stored.chain(core::iter::once(through)) {
            if let Some(earlier) = previous {
                Self::accumulate(&mut totals, requested, earlier, current);
            }
            previous = Some(current);
        }

        Ok(totals)
    }

    fn accumulate(
        totals: &mut TotalsMap,
        requested: SegmentId,
        earlier: &Snapshot,
        current: &Snapshot,
    ) {
        let Some(segment) = earlier.segment_id() else {
            return;
        };
        if segment < requested {
            return;
        }

        let delta = earlier.delta_to(current);
        let key = TotalsKey {
            segment,
            intensity: earlier.zone(),
        };
        let motion = match (earlier.motion_class(), current.motion_class()) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (observed, None) => observed,
            (None, observed) => observed,
        };

        match totals.entry(key) {
            Entry::Vacant(slot) => {
                let mut bucket = TotalsBucket::new(current.timestamp);
                bucket.absorb(&delta, current.timestamp, motion);
                slot.insert(bucket);
            }
            Entry::Occupied(mut slot) => {
                slot.get_mut().absorb(&delta, current.timestamp, motion);
            }
        }
    }

    /// Persists the snapshot store if it changed since the last save
    pub fn save(&mut self, vault: &mut dyn Vault) -> VaultResult<()> {
        self.store.save(vault)
    }

    /// Archives snapshots older than the shared horizon
    pub fn archive(&mut self, up_to: Timestamp, vault: &mut dyn Vault) -> VaultResult<usize> {
        self.store.archive(up_to, vault)
    }
}

fn has_unset(snapshot: &Snapshot) -> bool {
    snapshot.location.is_none()
        || snapshot.distance.is_none()
        || snapshot.heart_rate.is_none()
        || snapshot.heart_beats.is_none()
        || snapshot.pedometer.is_none()
        || snapshot.motion.is_none()
        || snapshot.intensity.is_none()
        || snapshot.segment.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::intensity::Intensity;
    use crate::series::motion::MotionClass;

    struct Fixture {
        location: TemporalStore<LocationSample>,
        distance: TemporalStore<DistanceSample>,
        heart_rate: TemporalStore<HeartRateSample>,
        heart_beats: TemporalStore<HeartBeatsSample>,
        pedometer: TemporalStore<PedometerSample>,
        motion: TemporalStore<MotionSample>,
        intensity: TemporalStore<IntensitySample>,
        segments: TemporalStore<SegmentSample>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                location: TemporalStore::new("location"),
                distance: TemporalStore::new("distance"),
                heart_rate: TemporalStore::new("heart_rate"),
                heart_beats: TemporalStore::new("heart_beats"),
                pedometer: TemporalStore::new("pedometer"),
                motion: TemporalStore::new("motion"),
                intensity: TemporalStore::new("intensity"),
                segments: TemporalStore::new("segments"),
            }
        }

        fn sources(&self) -> TotalsSources<'_> {
            TotalsSources {
                location: &self.location,
                distance: &self.distance,
                heart_rate: &self.heart_rate,
                heart_beats: &self.heart_beats,
                pedometer: &self.pedometer,
                motion: &self.motion,
                intensity: &self.intensity,
                segments: &self.segments,
            }
        }
    }

    #[test]
    fn note_seeds_a_slot_once() {
        let mut engine = TotalsEngine::new();
        engine.note(5_000);
        engine.note(5_000);
        assert_eq!(engine.snapshots().len(), 1);
    }

    #[test]
    fn note_never_disturbs_an_existing_snapshot() {
        let mut fixture = Fixture::new();
        fixture.distance.insert(DistanceSample::new(5_000, 42.0));

        let mut engine = TotalsEngine::new();
        engine.note(5_000);
        engine.refresh(&fixture.sources());
        assert!(engine.snapshots().lookup_exact(5_000).unwrap().distance.is_some());

        engine.note(5_000);
        assert!(engine.snapshots().lookup_exact(5_000).unwrap().distance.is_some());
    }

    #[test]
    fn backfill_fills_only_what_is_unset() {
        let mut fixture = Fixture::new();
        let mut engine = TotalsEngine::new();

        // slot created while the source is still empty
        engine.note(1_000);
        engine.refresh(&fixture.sources());
        assert!(engine.snapshots().lookup_exact(1_000).unwrap().distance.is_none());

        // source learns enough to answer: the lazy tier fills the hole
        fixture.distance.insert(DistanceSample::new(0, 0.0));
        fixture.distance.insert(DistanceSample::new(2_000, 100.0));
        engine.refresh(&fixture.sources());
        let filled = engine.snapshots().lookup_exact(1_000).unwrap().clone();
        assert_eq!(filled.distance.unwrap().meters, 50.0);

        // a correction lands but nothing was marked dirty: the filled
        // value is trusted and kept
        fixture.distance.insert(DistanceSample::new(2_000, 300.0));
        engine.refresh(&fixture.sources());
        let kept = engine.snapshots().lookup_exact(1_000).unwrap().clone();
        assert_eq!(kept.distance.unwrap().meters, 50.0);
    }

    #[test]
    fn dirty_range_forces_a_full_re_pull() {
        let mut fixture = Fixture::new();
        fixture.distance.insert(DistanceSample::new(0, 0.0));
        fixture.distance.insert(DistanceSample::new(2_000, 100.0));

        let mut engine = TotalsEngine::new();
        engine.note(1_000);
        engine.refresh(&fixture.sources());

        fixture.distance.insert(DistanceSample::new(2_000, 300.0));
        engine.mark_dirty_from(500);
        assert_eq!(engine.dirty_after(), Some(500));

        engine.refresh(&fixture.sources());
        let repaired = engine.snapshots().lookup_exact(1_000).unwrap().clone();
        assert_eq!(repaired.distance.unwrap().meters, 150.0);
        assert_eq!(engine.dirty_after(), None);
    }

    #[test]
    fn dirty_marker_only_widens_earlier() {
        let mut engine = TotalsEngine::new();
        engine.mark_dirty_from(5_000);
        engine.mark_dirty_from(9_000);
        assert_eq!(engine.dirty_after(), Some(5_000));
        engine.mark_dirty_from(2_000);
        assert_eq!(engine.dirty_after(), Some(2_000));
    }

    #[test]
    fn refresh_advances_the_watermark() {
        let mut fixture = Fixture::new();
        fixture.segments.insert(SegmentSample::new(0));

        let mut engine = TotalsEngine::new();
        engine.note(0);
        engine.note(4_000);
        engine.refresh(&fixture.sources());

        assert_eq!(engine.snapshots().refreshed_through(), Some(4_000));
    }

    #[test]
    fn synthesize_pulls_without_storing() {
        let mut fixture = Fixture::new();
        fixture.segments.insert(SegmentSample::new(0));
        fixture.distance.insert(DistanceSample::new(0, 0.0));
        fixture.distance.insert(DistanceSample::new(10_000, 500.0));

        let engine = TotalsEngine::new();
        let snap = engine.synthesize(5_000, &fixture.sources());

        assert_eq!(snap.timestamp, 5_000);
        assert_eq!(snap.distance.unwrap().meters, 250.0);
        assert_eq!(snap.segment_id(), Some(SegmentId(0)));
        assert!(engine.snapshots().is_empty());
    }

    #[test]
    fn sum_up_requires_a_segment_marker() {
        let engine = TotalsEngine::new();
        let through = Snapshot::empty(10_000);
        assert_eq!(
            engine.sum_up(&through),
            Err(TotalsError::MissingSegmentMarker)
        );
    }

    fn segmented_fixture() -> Fixture {
        let mut fixture = Fixture::new();
        fixture.segments.insert(SegmentSample::new(0));
        // 40s span so interior fractions are exact in floating point
        fixture.distance.insert(DistanceSample::new(0, 0.0));
        fixture.distance.insert(DistanceSample::new(40_000, 400.0));
        fixture
    }

    #[test]
    fn sum_up_covers_stored_pairs_plus_the_live_tail() {
        let fixture = segmented_fixture();
        let mut engine = TotalsEngine::new();
        engine.note(0);
        engine.note(10_000);
        engine.refresh(&fixture.sources());

        let through = engine.synthesize(30_000, &fixture.sources());
        let totals = engine.sum_up(&through).unwrap();

        assert_eq!(totals.len(), 1);
        let bucket = totals.values().next().unwrap();
        assert_eq!(bucket.duration_s(), 30.0);
        assert_eq!(bucket.distance_m(), Some(300.0));
        assert_eq!(bucket.end(), 30_000);
    }

    #[test]
    fn sum_up_splits_buckets_by_zone() {
        let mut fixture = segmented_fixture();
        fixture.intensity.insert(IntensitySample::new(0, Intensity::Light));
        fixture
            .intensity
            .insert(IntensitySample::new(10_000, Intensity::Moderate));

        let mut engine = TotalsEngine::new();
        engine.note(0);
        engine.note(10_000);
        engine.refresh(&fixture.sources());

        let through = engine.synthesize(30_000, &fixture.sources());
        let totals = engine.sum_up(&through).unwrap();

        assert_eq!(totals.len(), 2);
        let light = &totals[&TotalsKey {
            segment: SegmentId(0),
            intensity: Some(Intensity::Light),
        }];
        let moderate = &totals[&TotalsKey {
            segment: SegmentId(0),
            intensity: Some(Intensity::Moderate),
        }];
        assert_eq!(light.duration_s(), 10.0);
        assert_eq!(moderate.duration_s(), 20.0);
    }

    #[test]
    fn sum_up_skips_earlier_segments_and_unsegmented_time() {
        let mut fixture = Fixture::new();
        fixture.distance.insert(DistanceSample::new(0, 0.0));
        fixture.distance.insert(DistanceSample::new(40_000, 400.0));
        // first marker lands late: the snapshot at 0 stays unsegmented
        fixture.segments.insert(SegmentSample::new(5_000));
        fixture.segments.insert(SegmentSample::new(20_000));

        let mut engine = TotalsEngine::new();
        engine.note(0);
        engine.note(10_000);
        engine.note(20_000);
        engine.refresh(&fixture.sources());

        let through = engine.synthesize(30_000, &fixture.sources());
        let totals = engine.sum_up(&through).unwrap();

        // pair (0, 10s) has no marker, pair (10s, 20s) belongs to the
        // earlier segment; only the pair inside segment 20s survives
        assert_eq!(totals.len(), 1);
        let bucket = &totals[&TotalsKey {
            segment: SegmentId(20_000),
            intensity: None,
        }];
        assert_eq!(bucket.duration_s(), 10.0);
        assert_eq!(bucket.distance_m(), Some(100.0));
    }

    #[test]
    fn windows_add_up_across_horizons() {
        let fixture = segmented_fixture();
        let mut engine = TotalsEngine::new();
        engine.note(0);
        engine.note(10_000);
        engine.note(20_000);
        engine.refresh(&fixture.sources());

        let key = TotalsKey {
            segment: SegmentId(0),
            intensity: None,
        };

        let mid = engine.synthesize(20_000, &fixture.sources());
        let far = engine.synthesize(30_000, &fixture.sources());
        let upto_mid = engine.sum_up(&mid).unwrap();
        let upto_far = engine.sum_up(&far).unwrap();

        let tail = mid.delta_to(&far);
        assert_eq!(
            upto_far[&key].duration_s(),
            upto_mid[&key].duration_s() + tail.seconds
        );
        assert_eq!(
            upto_far[&key].distance_m().unwrap(),
            upto_mid[&key].distance_m().unwrap() + tail.gps_m.unwrap()
        );
    }

    #[test]
    fn dominant_motion_spans_the_whole_bucket() {
        let mut fixture = segmented_fixture();
        fixture.motion.insert(MotionSample::new(0, MotionClass::Walking, 0.8));
        fixture
            .motion
            .insert(MotionSample::new(10_000, MotionClass::Running, 0.9));
        fixture
            .motion
            .insert(MotionSample::new(20_000, MotionClass::Stationary, 0.7));

        let mut engine = TotalsEngine::new();
        engine.note(0);
        engine.note(10_000);
        engine.note(20_000);
        engine.refresh(&fixture.sources());

        let through = engine.synthesize(30_000, &fixture.sources());
        let totals = engine.sum_up(&through).unwrap();
        let bucket = totals.values().next().unwrap();

        assert_eq!(bucket.dominant_motion(), Some(MotionClass::Running));
    }
}
