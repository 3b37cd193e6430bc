//! Device-state series: battery, sensor placement, peripheral connection
//!
//! Bookkeeping series for "what was the hardware doing at that instant".
//! None of them feed the totals engine; they exist so a status lookup can
//! answer questions like "was the strap connected when that reading
//! arrived".

use alloc::string::String;
use serde::{Deserialize, Serialize};

use crate::sample::{fraction_between, lerp, Sample, SpanDelta};
use crate::time::Timestamp;

/// One battery level report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatterySample {
    /// Report instant
    pub timestamp: Timestamp,
    /// Charge level in percent
    pub percent: f64,
}

impl BatterySample {
    /// Battery level report
    pub fn new(timestamp: Timestamp, percent: f64) -> Self {
        Self { timestamp, percent }
    }
}

impl Sample for BatterySample {
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
            percent: lerp(self.percent, later.percent, f),
        }
    }

    fn delta_to(&self, later: &Self) -> SpanDelta {
        SpanDelta::between(self.timestamp, later.timestamp)
    }
}

/// Where the sensor reports being worn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum BodyLocation {
    /// Placement not reported
    Unknown = 0,
    /// Chest strap
    Chest = 1,
    /// Wrist-worn
    Wrist = 2,
    /// Finger clip
    Finger = 3,
    /// Hand-held
    Hand = 4,
    /// Ear lobe clip
    EarLobe = 5,
    /// Foot pod
    Foot = 6,
}

impl BodyLocation {
    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            BodyLocation::Unknown => "unknown",
            BodyLocation::Chest => "chest",
            BodyLocation::Wrist => "wrist",
            BodyLocation::Finger => "finger",
            BodyLocation::Hand => "hand",
            BodyLocation::EarLobe => "ear lobe",
            BodyLocation::Foot => "foot",
        }
    }
}

/// One sensor placement report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSample {
    /// Report instant
    pub timestamp: Timestamp,
    /// Reported placement
    pub location: BodyLocation,
}

impl PlacementSample {
    /// Placement report
    pub fn new(timestamp: Timestamp, location: BodyLocation) -> Self {
        Self {
            timestamp,
            location,
        }
    }
}

impl Sample for PlacementSample {
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

    fn interpolated(&self, _later: &Self, at: Timestamp) -> Self {
        // categorical only: copied from the earlier endpoint
        self.held_at(at)
    }

    fn delta_to(&self, later: &Self) -> SpanDelta {
        SpanDelta::between(self.timestamp, later.timestamp)
    }
}

/// Connection state of a paired peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum PeripheralState {
    /// Link is down
    Disconnected = 0,
    /// Link negotiation in progress
    Connecting = 1,
    /// Link is up and delivering data
    Connected = 2,
}

impl PeripheralState {
    /// Get human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            PeripheralState::Disconnected => "disconnected",
            PeripheralState::Connecting => "connecting",
            PeripheralState::Connected => "connected",
        }
    }
}

/// One peripheral connection event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheralSample {
    /// Event instant
    pub timestamp: Timestamp,
    /// Stable identifier assigned at pairing time
    pub device_id: i64,
    /// Connection state after the event
    pub state: PeripheralState,
    /// Advertised name, when known
    pub name: Option<String>,
}

impl PeripheralSample {
    /// Connection event
    pub fn new(timestamp: Timestamp, device_id: i64, state: PeripheralState) -> Self {
        Self {
            timestamp,
            device_id,
            state,
            name: None,
        }
    }

    /// Attach the advertised device name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Sample for PeripheralSample {
    type Delta = SpanDelta;

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn held_at(&self, at: Timestamp) -> Self {
        Self {
            timestamp: at,
            ..self.clone()
        }
    }

    fn interpolated(&self, _later: &Self, at: Timestamp) -> Self {
        // categorical bundle: copied from the earlier endpoint
        self.held_at(at)
    }

    fn delta_to(&self, later: &Self) -> SpanDelta {
        SpanDelta::between(self.timestamp, later.timestamp)
    }
}
