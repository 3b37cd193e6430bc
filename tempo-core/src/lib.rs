//! Temporal sample store and totals engine for workout telemetry
//!
//! Records multi-sensor sessions as ordered time series, answers
//! point-in-time queries by interpolation, and aggregates segment totals
//! on demand. Designed for wearables and other constrained hosts.
//!
//! Key constraints:
//! - Core works without `std`; persistence backends are feature-gated
//! - One writer per session, no internal locking
//! - Lookups never fabricate data beyond holding the nearest sample
//!
//! ```no_run
//! use tempo_core::{HeartRateProfile, Recorder, RecorderConfig};
//! use tempo_core::series::{HeartRateSample, LocationSample};
//!
//! let profile = HeartRateProfile::new(190.0, 50.0);
//! let mut recorder = Recorder::new(profile, RecorderConfig::default());
//!
//! recorder.mark_segment(0);
//! recorder.record_location(LocationSample::new(0, 47.3769, 8.5417));
//! recorder.record_heart_rate(HeartRateSample::new(0, 118.0));
//!
//! let status = recorder.status(500);
//! assert!(status.heart_rate.is_some());
//!
//! let totals = recorder.totals(500).expect("segment was marked");
//! assert!(!totals.is_empty());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod config;
pub mod constants;
pub mod errors;
pub mod profile;
pub mod recorder;
pub mod sample;
pub mod series;
pub mod store;
pub mod time;
pub mod totals;
pub mod vault;

// Public API
pub use config::RecorderConfig;
pub use errors::{TotalsError, TotalsResult, VaultError, VaultResult};
pub use profile::{HeartRateProfile, ZoneCrossing};
pub use recorder::{Recorder, StatusReport};
pub use sample::{Sample, SampleDelta};
pub use store::TemporalStore;
pub use time::{TimeSource, Timestamp};
pub use totals::{Snapshot, TotalsBucket, TotalsEngine, TotalsKey, TotalsMap};
pub use vault::Vault;

/// Crate version, from the package manifest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
