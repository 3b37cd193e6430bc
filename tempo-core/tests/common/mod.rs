//! Common test utilities and data generators for integration tests
//!
//! Provides a deterministic workout generator: GPS tracks with jitter,
//! heart-rate ramps, cadence counters. Seeded so failures reproduce.

#![allow(dead_code)]

use tempo_core::series::{HeartRateSample, LocationSample, MotionClass, MotionSample, PedometerSample};
use tempo_core::time::{FixedClock, TimeSource, Timestamp};

/// Meters covered by one degree of latitude
pub const M_PER_DEG_LAT: f64 = 111_195.0;

/// Deterministic workout data generator
pub struct WorkoutGenerator {
    clock: FixedClock,
    seed: u32,
}

impl WorkoutGenerator {
    /// Generator starting its clock at `start`
    pub fn new(start: Timestamp) -> Self {
        Self {
            clock: FixedClock::new(start),
            seed: 42,
        }
    }

    /// Current generator time
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// GPS fixes heading due north at roughly `speed_mps`, one per
    /// `interval_ms`, with metre-scale jitter
    pub fn gps_track(
        &mut self,
        fixes: usize,
        interval_ms: u64,
        speed_mps: f64,
    ) -> Vec<LocationSample> {
        let mut out = Vec::with_capacity(fixes);
        let mut latitude = 47.0;
        let longitude = 8.0;

        for i in 0..fixes {
            if i > 0 {
                self.clock.advance(interval_ms);
                let step_m = speed_mps * (interval_ms as f64 / 1000.0) + self.random_noise(0.5);
                latitude += step_m / M_PER_DEG_LAT;
            }
            out.push(
                LocationSample::new(self.clock.now(), latitude, longitude)
                    .with_accuracy(3.0 + self.random_float()),
            );
        }
        out
    }

    /// Heart-rate readings ramping linearly from `from_bpm` to `to_bpm`
    ///
    /// `noise` of 0.0 gives an exact ramp, useful when a test reasons
    /// about zone boundaries.
    pub fn heart_ramp(
        &mut self,
        readings: usize,
        interval_ms: u64,
        from_bpm: f64,
        to_bpm: f64,
        noise: f64,
    ) -> Vec<HeartRateSample> {
        let mut out = Vec::with_capacity(readings);
        for i in 0..readings {
            if i > 0 {
                self.clock.advance(interval_ms);
            }
            let progress = if readings > 1 {
                i as f64 / (readings - 1) as f64
            } else {
                0.0
            };
            let bpm = from_bpm + progress * (to_bpm - from_bpm) + self.random_noise(noise);
            out.push(HeartRateSample::new(self.clock.now(), bpm));
        }
        out
    }

    /// Cumulative pedometer counters at a steady cadence
    pub fn cadence(
        &mut self,
        samples: usize,
        interval_ms: u64,
        steps_per_min: f64,
    ) -> Vec<PedometerSample> {
        let mut out = Vec::with_capacity(samples);
        let per_sample = steps_per_min * (interval_ms as f64 / 60_000.0);
        for i in 0..samples {
            if i > 0 {
                self.clock.advance(interval_ms);
            }
            let steps = (per_sample * i as f64) as i64;
            out.push(
                PedometerSample::new(self.clock.now(), steps)
                    .with_active_seconds((i as u64 * interval_ms) as f64 / 1000.0),
            );
        }
        out
    }

    /// One motion classification at the generator's current time
    pub fn motion(&mut self, class: MotionClass) -> MotionSample {
        MotionSample::new(self.clock.now(), class, 0.85 + 0.1 * self.random_float())
    }

    /// Rewind the generator clock to `at`
    pub fn rewind(&mut self, at: Timestamp) {
        self.clock.set(at);
    }

    // Helper methods

    fn random_float(&mut self) -> f64 {
        self.seed = self.seed.wrapping_mul(1664525).wrapping_add(1013904223);
        f64::from(self.seed) / f64::from(u32::MAX)
    }

    fn random_noise(&mut self, spread: f64) -> f64 {
        (self.random_float() - 0.5) * 2.0 * spread
    }
}
