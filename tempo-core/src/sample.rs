//! Sample and Delta Algebra for Irregular Time Series
//!
//! ## Overview
//!
//! Every series in a recording session stores the same kind of thing: an
//! immutable value at one instant, made of required numeric fields, optional
//! numeric fields, and at most one categorical field. This module defines the
//! algebra those values share so the store, the totals engine, and the
//! recorder never need to know a series' concrete layout:
//!
//! - [`Sample`]: republish under a new timestamp ([`Sample::held_at`]),
//!   blend with a later sample ([`Sample::interpolated`]), and measure the
//!   difference to a later sample ([`Sample::delta_to`]).
//! - [`SampleDelta`]: the scalable, additive difference. Scaling is what
//!   interpolation means; addition is what accumulation means.
//!
//! ## Field Rules
//!
//! The per-series implementations all follow the same field-wise rules,
//! written once here as helpers:
//!
//! - Required reals interpolate linearly ([`lerp`]).
//! - Required integers interpolate linearly and round to the nearest whole
//!   value when they land back in a sample ([`lerp_int`]); inside a delta
//!   they stay fractional so scaling does not lose precision.
//! - Optional fields interpolate only when both endpoints carry a value;
//!   one-sided data holds the non-null endpoint ([`lerp_opt`]). A delta
//!   exists only when both endpoints carry the field ([`delta_opt`]), and
//!   accumulation treats an absent side as "no contribution" ([`add_opt`]).
//! - Categorical fields never interpolate. They are copied from the earlier
//!   endpoint when interpolating and from the single available endpoint when
//!   holding.
//!
//! ## Clamping
//!
//! [`sample_between`] is the one entry point for "value between two stored
//! samples". With clamping enabled (the default, via
//! [`Sample::CLAMP_INTERPOLATION`]) a query that falls outside the bracket,
//! including by floating error at the edges, degrades to holding the nearer
//! endpoint instead of overshooting. Implementations of
//! [`Sample::interpolated`] may therefore assume the query lies strictly
//! inside the bracket.

use crate::time::{seconds_between, Timestamp};

/// Scalable, additive difference between two samples of one series
pub trait SampleDelta: Clone {
    /// Elapsed time this delta spans, in seconds (signed)
    fn duration(&self) -> f64;

    /// Scale every field, including the duration, by `fraction`
    fn scaled(&self, fraction: f64) -> Self;

    /// Field-wise sum with another delta of the same series
    fn plus(&self, other: &Self) -> Self;
}

/// One timestamped, fixed-shape value of a series
///
/// Implementations fix the field layout at compile time; the layout is
/// identical across all samples of one series by construction.
pub trait Sample: Clone {
    /// Difference type produced by [`Sample::delta_to`]
    type Delta: SampleDelta;

    /// Degrade out-of-bracket interpolation to holding the nearer endpoint
    const CLAMP_INTERPOLATION: bool = true;

    /// Instant this sample describes
    fn timestamp(&self) -> Timestamp;

    /// Republish this sample's values under a new timestamp (open-ended hold)
    fn held_at(&self, at: Timestamp) -> Self;

    /// Field-wise blend with `later` at an instant strictly inside the
    /// bracket; callers go through [`sample_between`] instead
    fn interpolated(&self, later: &Self, at: Timestamp) -> Self;

    /// Difference from this sample to `later`
    fn delta_to(&self, later: &Self) -> Self::Delta;
}

/// Elapsed fraction of the bracket `[earlier, later]` at `at`.
///
/// Zero for a degenerate bracket; callers that need clamping get it from
/// [`sample_between`], not from here.
pub fn fraction_between(earlier: Timestamp, later: Timestamp, at: Timestamp) -> f64 {
    if later <= earlier {
        return 0.0;
    }
    seconds_between(earlier, at) / seconds_between(earlier, later)
}

/// Value of a series between two stored samples.
///
/// Applies the clamping rule before delegating to the series' own
/// [`Sample::interpolated`]. A degenerate bracket (later not after earlier)
/// holds whichever endpoint is closer to `at`.
pub fn sample_between<S: Sample>(earlier: &S, later: &S, at: Timestamp) -> S {
    if later.timestamp() <= earlier.timestamp() {
        return nearer_held(earlier, later, at);
    }
    if S::CLAMP_INTERPOLATION {
        if at <= earlier.timestamp() {
            return earlier.held_at(at);
        }
        if at >= later.timestamp() {
            return later.held_at(at);
        }
    }
    earlier.interpolated(later, at)
}

fn nearer_held<S: Sample>(earlier: &S, later: &S, at: Timestamp) -> S {
    if at.abs_diff(later.timestamp()) < at.abs_diff(earlier.timestamp()) {
        later.held_at(at)
    } else {
        earlier.held_at(at)
    }
}

/// Linear interpolation between two reals
pub fn lerp(a: f64, b: f64, fraction: f64) -> f64 {
    a + (b - a) * fraction
}

/// Linear interpolation between two integers, rounded to nearest
pub fn lerp_int(a: i64, b: i64, fraction: f64) -> i64 {
    a + libm::round((b - a) as f64 * fraction) as i64
}

/// Optional-field interpolation: blend when both present, hold the non-null
/// endpoint otherwise
pub fn lerp_opt(a: Option<f64>, b: Option<f64>, fraction: f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(lerp(a, b, fraction)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Optional-field difference: defined only when both endpoints carry the field
pub fn delta_opt(earlier: Option<f64>, later: Option<f64>) -> Option<f64> {
    match (earlier, later) {
        (Some(a), Some(b)) => Some(b - a),
        _ => None,
    }
}

/// Optional-field accumulation: an absent side contributes nothing
pub fn add_opt(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Optional-field scaling
pub fn scale_opt(value: Option<f64>, fraction: f64) -> Option<f64> {
    value.map(|v| v * fraction)
}

/// Delta for series whose fields never accumulate (categorical markers,
/// instantaneous readings): elapsed time is the only measurable difference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanDelta {
    /// Elapsed seconds, signed
    pub seconds: f64,
}

impl SpanDelta {
    /// Delta spanning the time between two samples
    pub fn between(earlier: Timestamp, later: Timestamp) -> Self {
        Self {
            seconds: seconds_between(earlier, later),
        }
    }
}

impl SampleDelta for SpanDelta {
    fn duration(&self) -> f64 {
        self.seconds
    }

    fn scaled(&self, fraction: f64) -> Self {
        Self {
            seconds: self.seconds * fraction,
        }
    }

    fn plus(&self, other: &Self) -> Self {
        Self {
            seconds: self.seconds + other.seconds,
        }
    }
}
