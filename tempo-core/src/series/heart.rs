//! Heart-rate series: instantaneous readings and the cumulative beat integral
//!
//! A monitor reports instantaneous [`HeartRateSample`]s. Averaging those
//! directly over a window would weight them by arrival rate, so the recorder
//! also maintains [`HeartBeatsSample`], the running time-integral of heart
//! rate (bpm·seconds). The average heart rate over any window is then the
//! integral's delta divided by the window's duration, independent of how
//! irregularly the monitor reported.

use serde::{Deserialize, Serialize};

use crate::sample::{
    add_opt, delta_opt, fraction_between, lerp, lerp_opt, scale_opt, Sample, SampleDelta,
};
use crate::time::{seconds_between, Timestamp};

/// Skin-contact detection reported by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum SkinContact {
    /// Sensor does not support contact detection or did not say
    Unknown = 0,
    /// Sensor reports it is not against skin
    Off = 1,
    /// Sensor reports good skin contact
    On = 2,
}

impl SkinContact {
    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            SkinContact::Unknown => "unknown",
            SkinContact::Off => "off",
            SkinContact::On => "on",
        }
    }
}

/// One instantaneous heart-rate reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    /// Reading instant
    pub timestamp: Timestamp,
    /// Beats per minute
    pub bpm: f64,
    /// Cumulative energy expended in kJ, when the monitor reports it
    pub energy_kj: Option<f64>,
    /// Skin-contact state, when the monitor reports it
    pub contact: Option<SkinContact>,
}

impl HeartRateSample {
    /// Reading with only the required rate
    pub fn new(timestamp: Timestamp, bpm: f64) -> Self {
        Self {
            timestamp,
            bpm,
            energy_kj: None,
            contact: None,
        }
    }

    /// Attach the monitor's cumulative energy counter (kJ)
    pub fn with_energy(mut self, kilojoules: f64) -> Self {
        self.energy_kj = Some(kilojoules);
        self
    }

    /// Attach the monitor's skin-contact state
    pub fn with_contact(mut self, contact: SkinContact) -> Self {
        self.contact = Some(contact);
        self
    }
}

/// Difference between two heart-rate readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartRateDelta {
    /// Elapsed seconds, signed
    pub seconds: f64,
    /// Energy expended over the span in kJ, when both readings carried the
    /// counter
    pub energy_kj: Option<f64>,
}

impl SampleDelta for HeartRateDelta {
    fn duration(&self) -> f64 {
        self.seconds
    }

    fn scaled(&self, fraction: f64) -> Self {
        Self {
            seconds: self.seconds * fraction,
            energy_kj: scale_opt(self.energy_kj, fraction),
        }
    }

    fn plus(&self, other: &Self) -> Self {
        Self {
            seconds: self.seconds + other.seconds,
            energy_kj: add_opt(self.energy_kj, other.energy_kj),
        }
    }
}

impl Sample for HeartRateSample {
    type Delta = HeartRateDelta;

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
            bpm: lerp(self.bpm, later.bpm, f),
            energy_kj: lerp_opt(self.energy_kj, later.energy_kj, f),
            // categorical: copied from the earlier endpoint
            contact: self.contact,
        }
    }

    fn delta_to(&self, later: &Self) -> HeartRateDelta {
        HeartRateDelta {
            seconds: seconds_between(self.timestamp, later.timestamp),
            energy_kj: delta_opt(self.energy_kj, later.energy_kj),
        }
    }
}

/// Running time-integral of heart rate, in bpm·seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartBeatsSample {
    /// Instant the integral runs through
    pub timestamp: Timestamp,
    /// Accumulated bpm·seconds since the session began
    pub bpm_seconds: f64,
}

impl HeartBeatsSample {
    /// Integral reading
    pub fn new(timestamp: Timestamp, bpm_seconds: f64) -> Self {
        Self {
            timestamp,
            bpm_seconds,
        }
    }

    /// Extend the integral to `at` assuming `avg_bpm` held over the gap
    /// (trapezoidal accumulation when fed the endpoint average)
    pub fn advanced(&self, at: Timestamp, avg_bpm: f64) -> Self {
        let gap = seconds_between(self.timestamp, at);
        Self {
            timestamp: at,
            bpm_seconds: self.bpm_seconds + avg_bpm * gap,
        }
    }
}

/// Difference between two integral readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartBeatsDelta {
    /// Elapsed seconds, signed
    pub seconds: f64,
    /// Accumulated bpm·seconds over the span
    pub bpm_seconds: f64,
}

impl HeartBeatsDelta {
    /// Average heart rate over the span, None for a zero-length span
    pub fn avg_bpm(&self) -> Option<f64> {
        if self.seconds > 0.0 {
            Some(self.bpm_seconds / self.seconds)
        } else {
            None
        }
    }
}

impl SampleDelta for HeartBeatsDelta {
    fn duration(&self) -> f64 {
        self.seconds
    }

    fn scaled(&self, fraction: f64) -> Self {
        Self {
            seconds: self.seconds * fraction,
            bpm_seconds: self.bpm_seconds * fraction,
        }
    }

    fn plus(&self, other: &Self) -> Self {
        Self {
            seconds: self.seconds + other.seconds,
            bpm_seconds: self.bpm_seconds + other.bpm_seconds,
        }
    }
}

impl Sample for HeartBeatsSample {
    type Delta = HeartBeatsDelta;

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
            bpm_seconds: lerp(self.bpm_seconds, later.bpm_seconds, f),
        }
    }

    fn delta_to(&self, later: &Self) -> HeartBeatsDelta {
        HeartBeatsDelta {
            seconds: seconds_between(self.timestamp, later.timestamp),
            bpm_seconds: later.bpm_seconds - self.bpm_seconds,
        }
    }
}
