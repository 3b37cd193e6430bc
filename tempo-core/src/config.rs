//! Recording configuration

use crate::constants::TRACK_SPACING_M;

/// Tunables for a recording session
///
/// The heart-rate profile is deliberately not part of the configuration;
/// it is passed to the recorder explicitly so classification never depends
/// on ambient state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecorderConfig {
    /// Minimum distance in meters between consecutive track points
    pub track_spacing_m: f64,
}

impl RecorderConfig {
    /// Configuration with a custom track spacing
    pub fn with_track_spacing(mut self, meters: f64) -> Self {
        self.track_spacing_m = meters;
        self
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            track_spacing_m: TRACK_SPACING_M,
        }
    }
}
