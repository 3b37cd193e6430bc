//! Segment marker series
//!
//! A segment marker is a workout reset: everything at or after it belongs
//! to the segment it opens, until the next marker. The marker's own
//! timestamp doubles as the segment's identity, which makes identities
//! totally ordered for free and lets "predates the requested segment" be a
//! plain comparison.

use serde::{Deserialize, Serialize};

use crate::sample::{Sample, SpanDelta};
use crate::time::Timestamp;

/// Identity of a segment: the timestamp of the marker that opened it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(pub Timestamp);

impl SegmentId {
    /// Instant the segment began
    pub const fn started_at(&self) -> Timestamp {
        self.0
    }
}

/// One segment marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSample {
    /// Marker instant
    pub timestamp: Timestamp,
    /// Segment this marker opens
    pub segment: SegmentId,
}

impl SegmentSample {
    /// Marker opening a new segment at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            segment: SegmentId(timestamp),
        }
    }
}

impl Sample for SegmentSample {
    type Delta = SpanDelta;

    fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    fn held_at(&self, at: Timestamp) -> Self {
        Self {
            timestamp: at,
            segment: self.segment,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_between;

    #[test]
    fn identity_survives_holding() {
        let marker = SegmentSample::new(60_000);
        let held = marker.held_at(90_000);
        assert_eq!(held.timestamp, 90_000);
        assert_eq!(held.segment, SegmentId(60_000));
    }

    #[test]
    fn interpolation_keeps_earlier_segment() {
        let a = SegmentSample::new(0);
        let b = SegmentSample::new(100_000);
        let mid = sample_between(&a, &b, 50_000);
        assert_eq!(mid.segment, SegmentId(0));
    }

    #[test]
    fn identities_order_by_start() {
        assert!(SegmentId(2_000) > SegmentId(1_000));
        assert_eq!(SegmentId(5_000).started_at(), 5_000);
    }
}
