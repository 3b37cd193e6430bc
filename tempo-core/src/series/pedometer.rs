//! Pedometer series: cumulative step counter with optional extras
//!
//! The pedometer reports running totals, not increments, so a delta between
//! two readings is already the window's step count. Steps are integer in a
//! sample but fractional inside a delta so that scaling a delta (the heart
//! of interpolation) does not truncate; they round back to whole steps only
//! when they land in a sample again.

use serde::{Deserialize, Serialize};

use crate::sample::{
    add_opt, delta_opt, fraction_between, lerp_int, lerp_opt, scale_opt, Sample, SampleDelta,
};
use crate::time::{seconds_between, Timestamp};

/// One pedometer report of cumulative counters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PedometerSample {
    /// Report instant
    pub timestamp: Timestamp,
    /// Steps since the counter started
    pub steps: i64,
    /// Meters covered since the counter started, when reported
    pub distance_m: Option<f64>,
    /// Seconds spent moving since the counter started, when reported
    pub active_seconds: Option<f64>,
}

impl PedometerSample {
    /// Report with only the required step counter
    pub fn new(timestamp: Timestamp, steps: i64) -> Self {
        Self {
            timestamp,
            steps,
            distance_m: None,
            active_seconds: None,
        }
    }

    /// Attach the cumulative distance counter (m)
    pub fn with_distance(mut self, meters: f64) -> Self {
        self.distance_m = Some(meters);
        self
    }

    /// Attach the cumulative active-time counter (s)
    pub fn with_active_seconds(mut self, seconds: f64) -> Self {
        self.active_seconds = Some(seconds);
        self
    }
}

/// Difference between two pedometer reports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PedometerDelta {
    /// Elapsed seconds, signed
    pub seconds: f64,
    /// Steps over the span; fractional so scaling stays exact
    pub steps: f64,
    /// Meters over the span, when both reports carried the counter
    pub distance_m: Option<f64>,
    /// Active seconds over the span, when both reports carried the counter
    pub active_seconds: Option<f64>,
}

impl SampleDelta for PedometerDelta {
    fn duration(&self) -> f64 {
        self.seconds
    }

    fn scaled(&self, fraction: f64) -> Self {
        Self {
            seconds: self.seconds * fraction,
            steps: self.steps * fraction,
            distance_m: scale_opt(self.distance_m, fraction),
            active_seconds: scale_opt(self.active_seconds, fraction),
        }
    }

    fn plus(&self, other: &Self) -> Self {
        Self {
            seconds: self.seconds + other.seconds,
            steps: self.steps + other.steps,
            distance_m: add_opt(self.distance_m, other.distance_m),
            active_seconds: add_opt(self.active_seconds, other.active_seconds),
        }
    }
}

impl Sample for PedometerSample {
    type Delta = PedometerDelta;

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn held_at(&self, at: Timestamp) -> Self {
        Self {
            timestamp: at,
            ..*self
        }
    }

    fn interpolated(&self, later: &Self, at: Timestamp) -> Self {
        let f = fraction_between(self.timestamp, later.timestamp, at);
        Self {
            timestamp: at,
            steps: lerp_int(self.steps, later.steps, f),
            distance_m: lerp_opt(self.distance_m, later.distance_m, f),
            active_seconds: lerp_opt(self.active_seconds, later.active_seconds, f),
        }
    }

    fn delta_to(&self, later: &Self) -> PedometerDelta {
        PedometerDelta {
            seconds: seconds_between(self.timestamp, later.timestamp),
            steps: (later.steps - self.steps) as f64,
            distance_m: delta_opt(self.distance_m, later.distance_m),
            active_seconds: delta_opt(self.active_seconds, later.active_seconds),
        }
    }
}
