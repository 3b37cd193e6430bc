//! Effort intensity series
//!
//! Intensity samples are not raw sensor input. The recorder derives them by
//! detecting heart-rate zone boundary crossings between consecutive
//! readings and timestamping each crossing at the interpolated instant the
//! boundary was passed. One intensity sample therefore marks "from here the
//! effort was in this zone", which is exactly the discriminator the totals
//! engine keys on.

use serde::{Deserialize, Serialize};

use crate::sample::{fraction_between, lerp_opt, Sample, SpanDelta};
use crate::time::Timestamp;

/// Effort zone, ordered from easiest to hardest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Intensity {
    /// Below the first zone floor
    Recovery = 0,
    /// First zone
    Light = 1,
    /// Second zone
    Moderate = 2,
    /// Third zone
    Hard = 3,
    /// At or above the last zone floor
    Peak = 4,
}

impl Intensity {
    /// Zone for a zero-based zone index, clamped to the hardest zone
    pub const fn from_index(index: usize) -> Self {
        match index {
            0 => Intensity::Recovery,
            1 => Intensity::Light,
            2 => Intensity::Moderate,
            3 => Intensity::Hard,
            _ => Intensity::Peak,
        }
    }

    /// Zero-based zone index
    pub const fn index(&self) -> usize {
        *self as usize
    }

    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Intensity::Recovery => "recovery",
            Intensity::Light => "light",
            Intensity::Moderate => "moderate",
            Intensity::Hard => "hard",
            Intensity::Peak => "peak",
        }
    }
}

/// One zone transition (or the session's first classification)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensitySample {
    /// Crossing instant (interpolated, not a reading instant)
    pub timestamp: Timestamp,
    /// Zone in effect from this instant on
    pub zone: Intensity,
    /// Heart rate at the crossing, when known
    pub bpm: Option<f64>,
}

impl IntensitySample {
    /// Zone transition record
    pub fn new(timestamp: Timestamp, zone: Intensity) -> Self {
        Self {
            timestamp,
            zone,
            bpm: None,
        }
    }

    /// Attach the heart rate at the crossing
    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = Some(bpm);
        self
    }
}

impl Sample for IntensitySample {
    type Delta = SpanDelta;

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
            // categorical: copied from the earlier endpoint
            zone: self.zone,
            bpm: lerp_opt(self.bpm, later.bpm, f),
        }
    }

    fn delta_to(&self, later: &Self) -> SpanDelta {
        SpanDelta::between(self.timestamp, later.timestamp)
    }
}
