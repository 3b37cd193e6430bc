//! Session recorder: routes raw sensor events into their series
//!
//! ## Routing
//!
//! The recorder owns one [`TemporalStore`] per recorded quantity plus the
//! totals engine. Every `record_*` entry point inserts the raw value into
//! its primary series and then derives whatever secondary series follow
//! from it:
//!
//! - a GPS fix extends the cumulative distance by the haversine step from
//!   the previous fix and, when the device has moved far enough, the
//!   thinned track polyline;
//! - a heart-rate reading advances the beats integral by the trapezoid
//!   rule and, when the reading crosses one or more zone floors, inserts
//!   intensity markers at the interpolated crossing instants rather than
//!   at either endpoint.
//!
//! Derivations read the previous primary sample through the store's
//! neighbor accessors, so they behave the same whether events arrive live
//! or slightly out of order. They do assume the usual case is forward
//! arrival; a backdated fix extends distance from the value in effect at
//! its own instant, not from the end of the series.
//!
//! ## Dirtiness
//!
//! Any insert that feeds the composite snapshots widens the totals
//! engine's repair range to the earliest affected instant. Device
//! telemetry (battery, placement, peripheral) is recorded but never feeds
//! snapshots, so it leaves the repair range alone.
//!
//! ## Persistence
//!
//! [`Recorder::archive_and_save`] brings the snapshot store up to date
//! while the sources are still intact, then runs the shared-horizon
//! archive over every owned series and saves every store still dirty. A
//! failed write never discards in-memory data; the first failure is
//! reported after every store has had its attempt, and the next call
//! retries.

use crate::config::RecorderConfig;
use crate::errors::{TotalsResult, VaultResult};
use crate::profile::HeartRateProfile;
use crate::series::device::{BatterySample, PeripheralSample, PlacementSample};
use crate::series::heart::{HeartBeatsSample, HeartRateSample};
use crate::series::intensity::IntensitySample;
use crate::series::location::{DistanceSample, LocationSample, TrackPoint};
use crate::series::motion::MotionSample;
use crate::series::pedometer::PedometerSample;
use crate::series::segment::{SegmentId, SegmentSample};
use crate::store::TemporalStore;
use crate::time::Timestamp;
use crate::totals::{TotalsEngine, TotalsMap, TotalsSources};
use crate::vault::Vault;

const LOCATION: &str = "location";
const TRACK: &str = "track";
const DISTANCE: &str = "distance";
const HEART_RATE: &str = "heart_rate";
const HEART_BEATS: &str = "heart_beats";
const INTENSITY: &str = "intensity";
const MOTION: &str = "motion";
const PEDOMETER: &str = "pedometer";
const BATTERY: &str = "battery";
const PLACEMENT: &str = "placement";
const PERIPHERAL: &str = "peripheral";
const SEGMENTS: &str = "segments";

/// Value of every series at one instant, via each store's lookup
#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    /// Instant the report describes
    pub at: Timestamp,
    /// GPS fix in effect
    pub location: Option<LocationSample>,
    /// Track point in effect
    pub track: Option<TrackPoint>,
    /// Cumulative distance in effect
    pub distance: Option<DistanceSample>,
    /// Heart-rate reading in effect
    pub heart_rate: Option<HeartRateSample>,
    /// Beats integral in effect
    pub heart_beats: Option<HeartBeatsSample>,
    /// Intensity zone in effect
    pub intensity: Option<IntensitySample>,
    /// Motion classification in effect
    pub motion: Option<MotionSample>,
    /// Pedometer counters in effect
    pub pedometer: Option<PedometerSample>,
    /// Battery level in effect
    pub battery: Option<BatterySample>,
    /// Sensor placement in effect
    pub placement: Option<PlacementSample>,
    /// Peripheral status in effect
    pub peripheral: Option<PeripheralSample>,
    /// Segment marker in effect
    pub segment: Option<SegmentSample>,
}

/// Owns every series of one recording session
#[derive(Debug, Clone)]
pub struct Recorder {
    profile: HeartRateProfile,
    config: RecorderConfig,
    location: TemporalStore<LocationSample>,
    track: TemporalStore<TrackPoint>,
    distance: TemporalStore<DistanceSample>,
    heart_rate: TemporalStore<HeartRateSample>,
    heart_beats: TemporalStore<HeartBeatsSample>,
    intensity: TemporalStore<IntensitySample>,
    motion: TemporalStore<MotionSample>,
    pedometer: TemporalStore<PedometerSample>,
    battery: TemporalStore<BatterySample>,
    placement: TemporalStore<PlacementSample>,
    peripheral: TemporalStore<PeripheralSample>,
    segments: TemporalStore<SegmentSample>,
    totals: TotalsEngine,
}

impl Recorder {
    /// Recorder with every series empty
    pub fn new(profile: HeartRateProfile, config: RecorderConfig) -> Self {
        Self {
            profile,
            config,
            location: TemporalStore::new(LOCATION),
            track: TemporalStore::new(TRACK),
            distance: TemporalStore::new(DISTANCE),
            heart_rate: TemporalStore::new(HEART_RATE),
            heart_beats: TemporalStore::new(HEART_BEATS),
            intensity: TemporalStore::new(INTENSITY),
            motion: TemporalStore::new(MOTION),
            pedometer: TemporalStore::new(PEDOMETER),
            battery: TemporalStore::new(BATTERY),
            placement: TemporalStore::new(PLACEMENT),
            peripheral: TemporalStore::new(PERIPHERAL),
            segments: TemporalStore::new(SEGMENTS),
            totals: TotalsEngine::new(),
        }
    }

    /// Recorder with every series hydrated from the vault
    ///
    /// Corrupt or missing documents hydrate as empty series; resuming a
    /// session that was never persisted is indistinguishable from starting
    /// a new one.
    pub fn hydrated(
        profile: HeartRateProfile,
        config: RecorderConfig,
        vault: &dyn Vault,
    ) -> Self {
        Self {
            profile,
            config,
            location: TemporalStore::hydrated(LOCATION, vault),
            track: TemporalStore::hydrated(TRACK, vault),
            distance: TemporalStore::hydrated(DISTANCE, vault),
            heart_rate: TemporalStore::hydrated(HEART_RATE, vault),
            heart_beats: TemporalStore::hydrated(HEART_BEATS, vault),
            intensity: TemporalStore::hydrated(INTENSITY, vault),
            motion: TemporalStore::hydrated(MOTION, vault),
            pedometer: TemporalStore::hydrated(PEDOMETER, vault),
            battery: TemporalStore::hydrated(BATTERY, vault),
            placement: TemporalStore::hydrated(PLACEMENT, vault),
            peripheral: TemporalStore::hydrated(PERIPHERAL, vault),
            segments: TemporalStore::hydrated(SEGMENTS, vault),
            totals: TotalsEngine::hydrated(vault),
        }
    }

    /// Heart-rate profile the recorder classifies against
    pub fn profile(&self) -> &HeartRateProfile {
        &self.profile
    }

    /// Recording configuration
    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Records a GPS fix, extending cumulative distance and the thinned
    /// track
    pub fn record_location(&mut self, fix: LocationSample) {
        let at = fix.timestamp;
        self.location.insert(fix);

        match self.location.strictly_before(at) {
            Some(previous) => {
                let step = previous.distance_m(&fix);
                let base = self.distance.strictly_before(at).map_or(0.0, |d| d.meters);
                self.distance.insert(DistanceSample::new(at, base + step));
            }
            None => {
                self.distance.insert(DistanceSample::new(at, 0.0));
            }
        }

        let moved = self
            .track
            .last()
            .map_or(f64::INFINITY, |tail| tail.distance_to_fix_m(&fix));
        if moved >= self.config.track_spacing_m {
            self.track.insert(TrackPoint::from_fix(&fix));
        }

        self.totals.mark_dirty_from(at);
    }

    /// Records a heart-rate reading, advancing the beats integral and
    /// marking any zone crossings at their interpolated instants
    pub fn record_heart_rate(&mut self, sample: HeartRateSample) {
        let at = sample.timestamp;
        let previous = self.heart_rate.strictly_before(at).copied();
        self.heart_rate.insert(sample);

        let mut dirty_from = at;
        match previous {
            Some(prev) => {
                let avg_bpm = (prev.bpm + sample.bpm) / 2.0;
                let advanced = match self.heart_beats.strictly_before(at) {
                    Some(prior) => prior.advanced(at, avg_bpm),
                    None => HeartBeatsSample::new(at, 0.0),
                };
                self.heart_beats.insert(advanced);

                let span_ms = at - prev.timestamp;
                for crossing in self.profile.crossings(prev.bpm, sample.bpm) {
                    let offset = libm::round(crossing.fraction * span_ms as f64) as u64;
                    let crossed_at = prev.timestamp + offset;
                    self.intensity.insert(
                        IntensitySample::new(crossed_at, crossing.into)
                            .with_bpm(crossing.floor_bpm),
                    );
                    self.totals.note(crossed_at);
                    dirty_from = dirty_from.min(crossed_at);
                }
            }
            None => {
                // first reading: seed the integral and the classification
                self.heart_beats.insert(HeartBeatsSample::new(at, 0.0));
                self.intensity.insert(
                    IntensitySample::new(at, self.profile.zone(sample.bpm))
                        .with_bpm(sample.bpm),
                );
                self.totals.note(at);
            }
        }

        self.totals.mark_dirty_from(dirty_from);
    }

    /// Records a motion classification
    pub fn record_motion(&mut self, sample: MotionSample) {
        let at = sample.timestamp;
        self.motion.insert(sample);
        self.totals.mark_dirty_from(at);
    }

    /// Records pedometer counters
    pub fn record_pedometer(&mut self, sample: PedometerSample) {
        let at = sample.timestamp;
        self.pedometer.insert(sample);
        self.totals.mark_dirty_from(at);
    }

    /// Records a battery level reading
    pub fn record_battery(&mut self, sample: BatterySample) {
        self.battery.insert(sample);
    }

    /// Records where the sensor is worn
    pub fn record_placement(&mut self, sample: PlacementSample) {
        self.placement.insert(sample);
    }

    /// Records a peripheral connection change
    pub fn record_peripheral(&mut self, sample: PeripheralSample) {
        self.peripheral.insert(sample);
    }

    /// Starts a new segment at `at` and returns its identity
    pub fn mark_segment(&mut self, at: Timestamp) -> SegmentId {
        let marker = SegmentSample::new(at);
        let id = marker.segment;
        self.segments.insert(marker);
        self.totals.note(at);
        self.totals.mark_dirty_from(at);
        id
    }

    /// Value of every series at `at`
    pub fn status(&self, at: Timestamp) -> StatusReport {
        StatusReport {
            at,
            location: self.location.lookup(at),
            track: self.track.lookup(at),
            distance: self.distance.lookup(at),
            heart_rate: self.heart_rate.lookup(at),
            heart_beats: self.heart_beats.lookup(at),
            intensity: self.intensity.lookup(at),
            motion: self.motion.lookup(at),
            pedometer: self.pedometer.lookup(at),
            battery: self.battery.lookup(at),
            placement: self.placement.lookup(at),
            peripheral: self.peripheral.lookup(at),
            segment: self.segments.lookup(at),
        }
    }

    /// Totals through `through`, grouped by segment and intensity zone
    ///
    /// Refreshes the snapshot store first, so totals always reflect every
    /// event recorded so far.
    pub fn totals(&mut self, through: Timestamp) -> TotalsResult<TotalsMap> {
        self.refresh_totals();

        let sources = TotalsSources {
            location: &self.location,
            distance: &self.distance,
            heart_rate: &self.heart_rate,
            heart_beats: &self.heart_beats,
            pedometer: &self.pedometer,
            motion: &self.motion,
            intensity: &self.intensity,
            segments: &self.segments,
        };
        let through = self.totals.synthesize(through, &sources);
        self.totals.sum_up(&through)
    }

    /// Brings the snapshot store up to date against every source series
    fn refresh_totals(&mut self) {
        let Self {
            totals,
            location,
            distance,
            heart_rate,
            heart_beats,
            pedometer,
            motion,
            intensity,
            segments,
            ..
        } = self;
        let sources = TotalsSources {
            location: &*location,
            distance: &*distance,
            heart_rate: &*heart_rate,
            heart_beats: &*heart_beats,
            pedometer: &*pedometer,
            motion: &*motion,
            intensity: &*intensity,
            segments: &*segments,
        };
        totals.refresh(&sources);
    }

    /// Archives every series past the shared horizon, then saves every
    /// store still dirty
    ///
    /// The snapshot store is refreshed before anything is archived, while
    /// the sources still cover every snapshot instant; what gets persisted
    /// is therefore always fully pulled. Every store gets its attempt even
    /// after a failure; the first failure is returned so the caller can
    /// schedule a retry. In-memory data is never discarded by a failed
    /// write.
    pub fn archive_and_save(
        &mut self,
        up_to: Timestamp,
        vault: &mut dyn Vault,
    ) -> VaultResult<()> {
        self.refresh_totals();

        let mut outcome = Ok(());

        remember(&mut outcome, self.location.archive(up_to, vault));
        remember(&mut outcome, self.track.archive(up_to, vault));
        remember(&mut outcome, self.distance.archive(up_to, vault));
        remember(&mut outcome, self.heart_rate.archive(up_to, vault));
        remember(&mut outcome, self.heart_beats.archive(up_to, vault));
        remember(&mut outcome, self.intensity.archive(up_to, vault));
        remember(&mut outcome, self.motion.archive(up_to, vault));
        remember(&mut outcome, self.pedometer.archive(up_to, vault));
        remember(&mut outcome, self.battery.archive(up_to, vault));
        remember(&mut outcome, self.placement.archive(up_to, vault));
        remember(&mut outcome, self.peripheral.archive(up_to, vault));
        remember(&mut outcome, self.segments.archive(up_to, vault));
        remember(&mut outcome, self.totals.archive(up_to, vault));

        remember(&mut outcome, self.location.save(vault));
        remember(&mut outcome, self.track.save(vault));
        remember(&mut outcome, self.distance.save(vault));
        remember(&mut outcome, self.heart_rate.save(vault));
        remember(&mut outcome, self.heart_beats.save(vault));
        remember(&mut outcome, self.intensity.save(vault));
        remember(&mut outcome, self.motion.save(vault));
        remember(&mut outcome, self.pedometer.save(vault));
        remember(&mut outcome, self.battery.save(vault));
        remember(&mut outcome, self.placement.save(vault));
        remember(&mut outcome, self.peripheral.save(vault));
        remember(&mut outcome, self.segments.save(vault));
        remember(&mut outcome, self.totals.save(vault));

        outcome
    }

    /// GPS fixes
    pub fn location_series(&self) -> &TemporalStore<LocationSample> {
        &self.location
    }

    /// Thinned track polyline
    pub fn track_series(&self) -> &TemporalStore<TrackPoint> {
        &self.track
    }

    /// Cumulative distance
    pub fn distance_series(&self) -> &TemporalStore<DistanceSample> {
        &self.distance
    }

    /// Heart-rate readings
    pub fn heart_rate_series(&self) -> &TemporalStore<HeartRateSample> {
        &self.heart_rate
    }

    /// Beats integral
    pub fn heart_beats_series(&self) -> &TemporalStore<HeartBeatsSample> {
        &self.heart_beats
    }

    /// Intensity markers
    pub fn intensity_series(&self) -> &TemporalStore<IntensitySample> {
        &self.intensity
    }

    /// Motion classifications
    pub fn motion_series(&self) -> &TemporalStore<MotionSample> {
        &self.motion
    }

    /// Pedometer counters
    pub fn pedometer_series(&self) -> &TemporalStore<PedometerSample> {
        &self.pedometer
    }

    /// Battery readings
    pub fn battery_series(&self) -> &TemporalStore<BatterySample> {
        &self.battery
    }

    /// Placement markers
    pub fn placement_series(&self) -> &TemporalStore<PlacementSample> {
        &self.placement
    }

    /// Peripheral status changes
    pub fn peripheral_series(&self) -> &TemporalStore<PeripheralSample> {
        &self.peripheral
    }

    /// Segment markers
    pub fn segment_series(&self) -> &TemporalStore<SegmentSample> {
        &self.segments
    }

    /// Totals engine state
    pub fn totals_engine(&self) -> &TotalsEngine {
        &self.totals
    }
}

fn remember<T>(outcome: &mut VaultResult<()>, result: VaultResult<T>) {
    if let Err(failure) = result {
        if outcome.is_ok() {
            *outcome = Err(failure);
        }
    }
}
