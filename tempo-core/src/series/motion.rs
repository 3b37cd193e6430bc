//! Motion classification series
//!
//! The platform's activity classifier reports a class and a confidence.
//! Classes are ordered by how active they are; the totals engine takes the
//! maximum class observed in a window as that window's dominant activity,
//! so any detected activity marks the whole window active.

use serde::{Deserialize, Serialize};

use crate::sample::{fraction_between, lerp, Sample, SpanDelta};
use crate::time::Timestamp;

/// Activity classification, ordered from least to most active.
///
/// The derived `Ord` is load-bearing: declaration order defines activity
/// priority, so `max` picks the dominant class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum MotionClass {
    /// Unclassified or vehicle-like movement
    Other = 0,
    /// No movement detected
    Stationary = 1,
    /// Walking gait
    Walking = 2,
    /// Running gait
    Running = 3,
    /// Cycling cadence
    Cycling = 4,
}

impl MotionClass {
    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            MotionClass::Other => "other",
            MotionClass::Stationary => "stationary",
            MotionClass::Walking => "walking",
            MotionClass::Running => "running",
            MotionClass::Cycling => "cycling",
        }
    }
}

/// One classifier report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Report instant
    pub timestamp: Timestamp,
    /// Reported class
    pub class: MotionClass,
    /// Classifier confidence in `[0, 1]`
    pub confidence: f64,
}

impl MotionSample {
    /// Classifier report
    pub fn new(timestamp: Timestamp, class: MotionClass, confidence: f64) -> Self {
        Self {
            timestamp,
            class,
            confidence,
        }
    }
}

impl Sample for MotionSample {
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
            class: self.class,
            confidence: lerp(self.confidence, later.confidence, f),
        }
    }

    fn delta_to(&self, later: &Self) -> SpanDelta {
        SpanDelta::between(self.timestamp, later.timestamp)
    }
}
