//! Heart-rate profile: zone floors, crossing detection, fitness estimate
//!
//! Everything that needs to know a person's heart-rate limits takes a
//! [`HeartRateProfile`] explicitly. Zone floors default to fixed fractions
//! of maximum heart rate and can be overridden per person.
//!
//! Crossing detection is the interesting part: given two consecutive
//! readings, [`HeartRateProfile::crossings`] reports every zone floor the
//! rate passed between them, with the elapsed fraction at which each floor
//! was hit. The recorder turns those fractions into interpolated crossing
//! timestamps, so a zone change is stamped when the boundary was actually
//! crossed rather than when the monitor happened to report.

use heapless::Vec;

use crate::constants::{DEFAULT_ZONE_FRACTIONS, MAX_ZONE_CROSSINGS, VDOT_MIN_HR_FRACTION};
use crate::series::intensity::Intensity;

/// One zone floor passed between two consecutive readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneCrossing {
    /// The floor that was passed, in bpm
    pub floor_bpm: f64,
    /// Zone in effect after the crossing
    pub into: Intensity,
    /// Elapsed fraction of the reading pair at which the floor was hit
    pub fraction: f64,
}

/// A person's heart-rate limits and zone floors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartRateProfile {
    max_bpm: f64,
    resting_bpm: f64,
    zone_floors: [f64; 4],
}

impl HeartRateProfile {
    /// Profile with zone floors at the default fractions of `max_bpm`
    pub fn new(max_bpm: f64, resting_bpm: f64) -> Self {
        let mut zone_floors = [0.0; 4];
        for (floor, fraction) in zone_floors.iter_mut().zip(DEFAULT_ZONE_FRACTIONS) {
            *floor = max_bpm * fraction;
        }
        Self {
            max_bpm,
            resting_bpm,
            zone_floors,
        }
    }

    /// Override the four zone floors (bpm, ascending)
    pub fn with_zone_floors(mut self, floors: [f64; 4]) -> Self {
        self.zone_floors = floors;
        self
    }

    /// Maximum heart rate (bpm)
    pub fn max_bpm(&self) -> f64 {
        self.max_bpm
    }

    /// Resting heart rate (bpm)
    pub fn resting_bpm(&self) -> f64 {
        self.resting_bpm
    }

    /// Zone floors (bpm, ascending)
    pub fn zone_floors(&self) -> [f64; 4] {
        self.zone_floors
    }

    /// Zone a heart rate falls in
    pub fn zone(&self, bpm: f64) -> Intensity {
        let index = self.zone_floors.iter().filter(|floor| bpm >= **floor).count();
        Intensity::from_index(index)
    }

    /// Every zone floor passed between two consecutive readings, in travel
    /// order. Empty when both readings sit in the same zone.
    pub fn crossings(&self, earlier_bpm: f64, later_bpm: f64) -> Vec<ZoneCrossing, MAX_ZONE_CROSSINGS> {
        let mut crossed = Vec::new();
        if earlier_bpm == later_bpm {
            return crossed;
        }
        let span = later_bpm - earlier_bpm;

        if span > 0.0 {
            // Ascending: floors are met the instant the rate reaches them
            for (k, &floor) in self.zone_floors.iter().enumerate() {
                if earlier_bpm < floor && floor <= later_bpm {
                    let _ = crossed.push(ZoneCrossing {
                        floor_bpm: floor,
                        into: Intensity::from_index(k + 1),
                        fraction: (floor - earlier_bpm) / span,
                    });
                }
            }
        } else {
            // Descending: dropping below a floor leaves its zone
            for (k, &floor) in self.zone_floors.iter().enumerate().rev() {
                if later_bpm < floor && floor <= earlier_bpm {
                    let _ = crossed.push(ZoneCrossing {
                        floor_bpm: floor,
                        into: Intensity::from_index(k),
                        fraction: (floor - earlier_bpm) / span,
                    });
                }
            }
        }

        crossed
    }

    /// Heart-rate-reserve fraction of a reading (Karvonen), zero when the
    /// profile is degenerate
    pub fn reserve_fraction(&self, bpm: f64) -> f64 {
        let reserve = self.max_bpm - self.resting_bpm;
        if reserve <= 0.0 {
            return 0.0;
        }
        (bpm - self.resting_bpm) / reserve
    }

    /// Daniels-style fitness estimate from a window's average heart rate and
    /// pace (seconds per km).
    ///
    /// VO2 at the running velocity (`0.000104 v² + 0.182 v − 4.6`, v in
    /// m/min) scaled up by the effort fraction the heart rate implies.
    /// Omitted whenever either input cannot support the estimate.
    pub fn vdot(&self, avg_bpm: f64, pace_s_per_km: f64) -> Option<f64> {
        if !(pace_s_per_km > 0.0) {
            return None;
        }
        let fraction = self.reserve_fraction(avg_bpm);
        if fraction < VDOT_MIN_HR_FRACTION {
            return None;
        }
        let fraction = fraction.min(1.0);

        let velocity = 60_000.0 / pace_s_per_km; // m/min
        let vo2 = 0.000104 * velocity * velocity + 0.182 * velocity - 4.6;

        Some((vo2 / fraction).clamp(20.0, 85.0))
    }
}
