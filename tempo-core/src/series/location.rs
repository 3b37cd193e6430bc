//! GPS-derived series: raw fixes, the thinned track, cumulative distance
//!
//! Three series share this module because they share geometry. A raw
//! [`LocationSample`] is whatever the receiver reported, optionals included.
//! The recorder derives a [`DistanceSample`] from each consecutive pair of
//! fixes via [`haversine_m`] and appends a [`TrackPoint`] only when the fix
//! has moved far enough from the last stored one to matter.

use serde::{Deserialize, Serialize};

use crate::constants::EARTH_RADIUS_M;
use crate::sample::{fraction_between, lerp, lerp_opt, Sample, SampleDelta, SpanDelta};
use crate::time::{seconds_between, Timestamp};

fn to_rad(deg: f64) -> f64 {
    deg * core::f64::consts::PI / 180.0
}

/// Great-circle distance between two WGS-84 coordinates, in meters
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = to_rad(lat2 - lat1);
    let d_lon = to_rad(lon2 - lon1);

    let a = libm::sin(d_lat / 2.0) * libm::sin(d_lat / 2.0)
        + libm::cos(to_rad(lat1))
            * libm::cos(to_rad(lat2))
            * libm::sin(d_lon / 2.0)
            * libm::sin(d_lon / 2.0);
    let c = 2.0 * libm::atan2(libm::sqrt(a), libm::sqrt(1.0 - a));

    EARTH_RADIUS_M * c
}

/// One GPS fix as reported by the receiver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Fix instant
    pub timestamp: Timestamp,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Altitude above sea level in meters, when reported
    pub altitude: Option<f64>,
    /// Horizontal accuracy radius in meters, when reported
    pub horizontal_accuracy: Option<f64>,
    /// Ground speed in m/s, when reported
    pub speed: Option<f64>,
    /// Course over ground in degrees, when reported
    pub course: Option<f64>,
}

impl LocationSample {
    /// Fix with only the required coordinates
    pub fn new(timestamp: Timestamp, latitude: f64, longitude: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            altitude: None,
            horizontal_accuracy: None,
            speed: None,
            course: None,
        }
    }

    /// Attach reported altitude (m)
    pub fn with_altitude(mut self, meters: f64) -> Self {
        self.altitude = Some(meters);
        self
    }

    /// Attach reported horizontal accuracy (m)
    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.horizontal_accuracy = Some(meters);
        self
    }

    /// Attach reported ground speed (m/s)
    pub fn with_speed(mut self, mps: f64) -> Self {
        self.speed = Some(mps);
        self
    }

    /// Attach reported course over ground (deg)
    pub fn with_course(mut self, degrees: f64) -> Self {
        self.course = Some(degrees);
        self
    }

    /// Great-circle distance to another fix, in meters
    pub fn distance_m(&self, other: &Self) -> f64 {
        haversine_m(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

impl Sample for LocationSample {
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
            latitude: lerp(self.latitude, later.latitude, f),
            longitude: lerp(self.longitude, later.longitude, f),
            altitude: lerp_opt(self.altitude, later.altitude, f),
            horizontal_accuracy: lerp_opt(self.horizontal_accuracy, later.horizontal_accuracy, f),
            speed: lerp_opt(self.speed, later.speed, f),
            course: lerp_opt(self.course, later.course, f),
        }
    }

    fn delta_to(&self, later: &Self) -> SpanDelta {
        SpanDelta::between(self.timestamp, later.timestamp)
    }
}

/// One stored point of the thinned path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Instant the point was recorded
    pub timestamp: Timestamp,
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Altitude above sea level in meters, when the fix had one
    pub altitude: Option<f64>,
}

impl TrackPoint {
    /// Track point taken from a raw fix
    pub fn from_fix(fix: &LocationSample) -> Self {
        Self {
            timestamp: fix.timestamp,
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude: fix.altitude,
        }
    }

    /// Great-circle distance to a raw fix, in meters
    pub fn distance_to_fix_m(&self, fix: &LocationSample) -> f64 {
        haversine_m(self.latitude, self.longitude, fix.latitude, fix.longitude)
    }
}

impl Sample for TrackPoint {
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
            latitude: lerp(self.latitude, later.latitude, f),
            longitude: lerp(self.longitude, later.longitude, f),
            altitude: lerp_opt(self.altitude, later.altitude, f),
        }
    }

    fn delta_to(&self, later: &Self) -> SpanDelta {
        SpanDelta::between(self.timestamp, later.timestamp)
    }
}

/// Cumulative GPS-derived distance in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceSample {
    /// Instant of the fix that produced this total
    pub timestamp: Timestamp,
    /// Meters covered since the session's first fix
    pub meters: f64,
}

impl DistanceSample {
    /// Cumulative distance reading
    pub fn new(timestamp: Timestamp, meters: f64) -> Self {
        Self { timestamp, meters }
    }
}

/// Difference between two cumulative distance readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceDelta {
    /// Elapsed seconds, signed
    pub seconds: f64,
    /// Meters covered over the span
    pub meters: f64,
}

impl SampleDelta for DistanceDelta {
    fn duration(&self) -> f64 {
        self.seconds
    }

    fn scaled(&self, fraction: f64) -> Self {
        Self {
            seconds: self.seconds * fraction,
            meters: self.meters * fraction,
        }
    }

    fn plus(&self, other: &Self) -> Self {
        Self {
            seconds: self.seconds + other.seconds,
            meters: self.meters + other.meters,
        }
    }
}

impl Sample for DistanceSample {
    type Delta = DistanceDelta;

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
            meters: lerp(self.meters, later.meters, f),
        }
    }

    fn delta_to(&self, later: &Self) -> DistanceDelta {
        DistanceDelta {
            seconds: seconds_between(self.timestamp, later.timestamp),
            meters: later.meters - self.meters,
        }
    }
}
