//! Composite snapshots and keyed totals
//!
//! ## Overview
//!
//! A [`Snapshot`] bundles one owned sample from each source series at one
//! instant, plus the two categorical discriminators that scope aggregation:
//! the segment in effect and the intensity zone in effect. Snapshots live in
//! their own [`crate::store::TemporalStore`] inside the engine; they clone
//! from the sources and never alias live store state.
//!
//! A [`SnapshotDelta`] is the field-wise difference between two snapshots,
//! carrying exactly the quantities a totals window can accumulate: elapsed
//! time, GPS and pedometer distance, steps, active time, the heart-rate
//! integral, energy. Optional fields follow the usual rules: a delta exists
//! only when both snapshots carry the sub-sample, and accumulation treats an
//! absent side as no contribution.
//!
//! [`TotalsBucket`] is where deltas land, grouped by [`TotalsKey`]. Buckets
//! expose the derived quantities (average heart rate, distance, speed, pace,
//! the fitness estimate) as methods over the accumulated delta, computed at
//! read time so partially-fed buckets simply omit what they cannot support.

pub mod engine;

pub use engine::{TotalsEngine, TotalsSources};

use alloc::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::profile::HeartRateProfile;
use crate::sample::{add_opt, delta_opt, sample_between, scale_opt, Sample, SampleDelta};
use crate::series::heart::{HeartBeatsSample, HeartRateSample};
use crate::series::intensity::{Intensity, IntensitySample};
use crate::series::location::{DistanceSample, LocationSample};
use crate::series::motion::{MotionClass, MotionSample};
use crate::series::pedometer::PedometerSample;
use crate::series::segment::{SegmentId, SegmentSample};
use crate::time::{seconds_between, Timestamp};

/// Totals grouped by key
pub type TotalsMap = BTreeMap<TotalsKey, TotalsBucket>;

/// One owned sample per source series at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Instant this snapshot describes
    pub timestamp: Timestamp,
    /// GPS fix in effect
    pub location: Option<LocationSample>,
    /// Cumulative GPS distance in effect
    pub distance: Option<DistanceSample>,
    /// Heart-rate reading in effect
    pub heart_rate: Option<HeartRateSample>,
    /// Heart-rate integral in effect
    pub heart_beats: Option<HeartBeatsSample>,
    /// Pedometer counters in effect
    pub pedometer: Option<PedometerSample>,
    /// Motion classification in effect
    pub motion: Option<MotionSample>,
    /// Intensity zone in effect (discriminator)
    pub intensity: Option<IntensitySample>,
    /// Segment in effect (discriminator)
    pub segment: Option<SegmentSample>,
}

impl Snapshot {
    /// Snapshot with every sub-sample unset
    pub fn empty(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            location: None,
            distance: None,
            heart_rate: None,
            heart_beats: None,
            pedometer: None,
            motion: None,
            intensity: None,
            segment: None,
        }
    }

    /// Segment identity in effect, if any
    pub fn segment_id(&self) -> Option<SegmentId> {
        self.segment.as_ref().map(|s| s.segment)
    }

    /// Intensity zone in effect, if any
    pub fn zone(&self) -> Option<Intensity> {
        self.intensity.as_ref().map(|s| s.zone)
    }

    /// Motion class in effect, if any
    pub fn motion_class(&self) -> Option<MotionClass> {
        self.motion.as_ref().map(|m| m.class)
    }
}

fn sub_between<T: Sample>(a: &Option<T>, b: &Option<T>, at: Timestamp) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(sample_between(a, b, at)),
        (Some(only), None) | (None, Some(only)) => Some(only.held_at(at)),
        (None, None) => None,
    }
}

impl Sample for Snapshot {
    type Delta = SnapshotDelta;

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn held_at(&self, at: Timestamp) -> Self {
        Self {
            timestamp: at,
            ..self.clone()
        }
    }

    fn interpolated(&self, later: &Self, at: Timestamp) -> Self {
        Self {
            timestamp: at,
            location: sub_between(&self.location, &later.location, at),
            distance: sub_between(&self.distance, &later.distance, at),
            heart_rate: sub_between(&self.heart_rate, &later.heart_rate, at),
            heart_beats: sub_between(&self.heart_beats, &later.heart_beats, at),
            pedometer: sub_between(&self.pedometer, &later.pedometer, at),
            motion: sub_between(&self.motion, &later.motion, at),
            // discriminators: in effect from the earlier endpoint only,
            // never pulled backwards from the later one
            intensity: self.intensity.map(|s| s.held_at(at)),
            segment: self.segment.map(|s| s.held_at(at)),
        }
    }

    fn delta_to(&self, later: &Self) -> SnapshotDelta {
        let pedometer = match (&self.pedometer, &later.pedometer) {
            (Some(a), Some(b)) => Some(a.delta_to(b)),
            _ => None,
        };

        SnapshotDelta {
            seconds: seconds_between(self.timestamp, later.timestamp),
            gps_m: delta_opt(
                self.distance.as_ref().map(|d| d.meters),
                later.distance.as_ref().map(|d| d.meters),
            ),
            pedometer_m: pedometer.as_ref().and_then(|p| p.distance_m),
            steps: pedometer.as_ref().map(|p| p.steps),
            active_seconds: pedometer.as_ref().and_then(|p| p.active_seconds),
            bpm_seconds: delta_opt(
                self.heart_beats.as_ref().map(|b| b.bpm_seconds),
                later.heart_beats.as_ref().map(|b| b.bpm_seconds),
            ),
            energy_kj: delta_opt(
                self.heart_rate.as_ref().and_then(|h| h.energy_kj),
                later.heart_rate.as_ref().and_then(|h| h.energy_kj),
            ),
        }
    }
}

/// Field-wise difference between two snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnapshotDelta {
    /// Elapsed seconds, signed
    pub seconds: f64,
    /// GPS-derived meters over the span
    pub gps_m: Option<f64>,
    /// Pedometer-derived meters over the span
    pub pedometer_m: Option<f64>,
    /// Steps over the span, fractional under scaling
    pub steps: Option<f64>,
    /// Pedometer active seconds over the span
    pub active_seconds: Option<f64>,
    /// Heart-rate integral over the span (bpm·seconds)
    pub bpm_seconds: Option<f64>,
    /// Energy expended over the span (kJ)
    pub energy_kj: Option<f64>,
}

impl SampleDelta for SnapshotDelta {
    fn duration(&self) -> f64 {
        self.seconds
    }

    fn scaled(&self, fraction: f64) -> Self {
        Self {
            seconds: self.seconds * fraction,
            gps_m: scale_opt(self.gps_m, fraction),
            pedometer_m: scale_opt(self.pedometer_m, fraction),
            steps: scale_opt(self.steps, fraction),
            active_seconds: scale_opt(self.active_seconds, fraction),
            bpm_seconds: scale_opt(self.bpm_seconds, fraction),
            energy_kj: scale_opt(self.energy_kj, fraction),
        }
    }

    fn plus(&self, other: &Self) -> Self {
        Self {
            seconds: self.seconds + other.seconds,
            gps_m: add_opt(self.gps_m, other.gps_m),
            pedometer_m: add_opt(self.pedometer_m, other.pedometer_m),
            steps: add_opt(self.steps, other.steps),
            active_seconds: add_opt(self.active_seconds, other.active_seconds),
            bpm_seconds: add_opt(self.bpm_seconds, other.bpm_seconds),
            energy_kj: add_opt(self.energy_kj, other.energy_kj),
        }
    }
}

/// Aggregation group: the segment a window belongs to and the intensity
/// zone in effect through it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TotalsKey {
    /// Segment the window belongs to
    pub segment: SegmentId,
    /// Zone in effect, `None` before any classification
    pub intensity: Option<Intensity>,
}

/// Accumulated totals for one key
#[derive(Debug, Clone, PartialEq)]
pub struct TotalsBucket {
    delta: SnapshotDelta,
    end: Timestamp,
    motion: Option<MotionClass>,
}

impl TotalsBucket {
    pub(crate) fn new(end: Timestamp) -> Self {
        Self {
            delta: SnapshotDelta::default(),
            end,
            motion: None,
        }
    }

    pub(crate) fn absorb(
        &mut self,
        delta: &SnapshotDelta,
        end: Timestamp,
        motion: Option<MotionClass>,
    ) {
        self.delta = self.delta.plus(delta);
        if end > self.end {
            self.end = end;
        }
        self.motion = match (self.motion, motion) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (observed, None) => observed,
            (None, observed) => observed,
        };
    }

    /// Accumulated field-wise delta
    pub fn delta(&self) -> &SnapshotDelta {
        &self.delta
    }

    /// Latest end timestamp that contributed to this bucket
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Most active motion class observed in this bucket's windows
    pub fn dominant_motion(&self) -> Option<MotionClass> {
        self.motion
    }

    /// Accumulated duration in seconds
    pub fn duration_s(&self) -> f64 {
        self.delta.seconds
    }

    /// Accumulated distance in meters, preferring GPS over pedometer
    pub fn distance_m(&self) -> Option<f64> {
        self.delta.gps_m.or(self.delta.pedometer_m)
    }

    /// Accumulated steps
    pub fn steps(&self) -> Option<f64> {
        self.delta.steps
    }

    /// Accumulated energy in kJ
    pub fn energy_kj(&self) -> Option<f64> {
        self.delta.energy_kj
    }

    /// Average heart rate over the bucket, omitted for a zero duration
    pub fn avg_heart_rate(&self) -> Option<f64> {
        let bpm_seconds = self.delta.bpm_seconds?;
        if self.delta.seconds > 0.0 {
            Some(bpm_seconds / self.delta.seconds)
        } else {
            None
        }
    }

    /// Average speed in m/s
    pub fn speed_mps(&self) -> Option<f64> {
        let distance = self.distance_m()?;
        if self.delta.seconds > 0.0 {
            Some(distance / self.delta.seconds)
        } else {
            None
        }
    }

    /// Average pace in seconds per kilometer
    pub fn pace_s_per_km(&self) -> Option<f64> {
        let distance = self.distance_m()?;
        if distance > 0.0 {
            Some(self.delta.seconds * 1000.0 / distance)
        } else {
            None
        }
    }

    /// Fitness estimate for this bucket, when the inputs and a profile
    /// support it
    pub fn vdot(&self, profile: &HeartRateProfile) -> Option<f64> {
        profile.vdot(self.avg_heart_rate()?, self.pace_s_per_km()?)
    }
}
