//! Concrete sample types, one module per recorded quantity
//!
//! Every series fixes its field layout as a plain struct and implements the
//! shared algebra from [`crate::sample`]. Numeric fields follow the
//! field-wise interpolation rules; categorical fields are copied, never
//! blended. Cumulative quantities (distance, heart beats, pedometer
//! counters) carry real deltas; instantaneous and categorical quantities
//! carry [`crate::sample::SpanDelta`].

pub mod device;
pub mod heart;
pub mod intensity;
pub mod location;
pub mod motion;
pub mod pedometer;
pub mod segment;

pub use device::{BatterySample, BodyLocation, PeripheralSample, PeripheralState, PlacementSample};
pub use heart::{HeartBeatsDelta, HeartBeatsSample, HeartRateDelta, HeartRateSample, SkinContact};
pub use intensity::{Intensity, IntensitySample};
pub use location::{haversine_m, DistanceDelta, DistanceSample, LocationSample, TrackPoint};
pub use motion::{MotionClass, MotionSample};
pub use pedometer::{PedometerDelta, PedometerSample};
pub use segment::{SegmentId, SegmentSample};
