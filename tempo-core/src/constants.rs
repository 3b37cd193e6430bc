//! Numeric Constants for Derivations and Defaults
//!
//! Central home for the physical constants and tuning defaults the derived
//! series and the fitness estimate rely on, so none of them live as magic
//! numbers at a call site.

// ===== GEODESY =====

/// Mean Earth radius (m).
///
/// Used by the haversine great-circle distance between consecutive GPS
/// fixes. The spherical approximation is accurate to ~0.5% which is well
/// inside consumer GPS error.
///
/// Source: IUGG mean radius R1
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

// ===== HEART RATE =====

/// Default heart-rate zone floors as fractions of maximum heart rate.
///
/// Five zones, four boundaries: below the first fraction is recovery
/// effort, at or above the last is peak effort. Overridable per profile.
///
/// Source: common five-zone %HRmax scheme (60/70/80/90)
pub const DEFAULT_ZONE_FRACTIONS: [f64; 4] = [0.60, 0.70, 0.80, 0.90];

/// Lowest heart-rate-reserve fraction the fitness estimate accepts.
///
/// Below this the divisor is too small for the estimate to mean anything;
/// the estimate is omitted instead.
pub const VDOT_MIN_HR_FRACTION: f64 = 0.35;

// ===== TRACK =====

/// Minimum great-circle spacing between recorded track points (m).
///
/// GPS fixes closer together than this refine the current point rather than
/// extending the path, which keeps the stored track proportional to ground
/// covered instead of to session length.
pub const TRACK_SPACING_M: f64 = 10.0;

// ===== DERIVATION LIMITS =====

/// Zone boundaries a single heart-rate pair can cross.
///
/// Equals the boundary count; a jump across the full range crosses all of
/// them at once.
pub const MAX_ZONE_CROSSINGS: usize = 4;
