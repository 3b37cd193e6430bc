//! Basic Recording Session Example
//!
//! This example demonstrates the simplest use case of Tempo: feeding raw
//! sensor events into a recorder and asking for the state of the session
//! at any instant, including instants between readings.
//!
//! ## What You'll Learn
//!
//! - Creating a heart-rate profile and a recorder
//! - Recording GPS fixes and heart-rate readings
//! - Point-in-time status lookups with interpolation
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_basic_session
//! ```

use tempo_core::series::{HeartRateSample, LocationSample};
use tempo_core::{HeartRateProfile, Recorder, RecorderConfig};

fn main() {
    println!("Tempo Basic Session Example");
    println!("===========================\n");

    // Runner with a maximum of 190 bpm and a resting rate of 50
    let profile = HeartRateProfile::new(190.0, 50.0);
    println!("Zone floors: {:?} bpm\n", profile.zone_floors());

    let mut recorder = Recorder::new(profile, RecorderConfig::default());
    recorder.mark_segment(0);

    // One minute of northward jogging, a fix and a reading every 10 s
    println!("Recording events:");
    for i in 0..7u64 {
        let at = i * 10_000;
        let fix = LocationSample::new(at, 47.3769 + 0.0004 * i as f64, 8.5417);
        let reading = HeartRateSample::new(at, 110.0 + 6.0 * i as f64);
        println!(
            "  t={:6} ms  {:.4} N  {:5.1} bpm",
            at, fix.latitude, reading.bpm
        );
        recorder.record_location(fix);
        recorder.record_heart_rate(reading);
    }
    println!();

    // Lookups answer at any instant, not just reading instants
    println!("Status lookups:");
    for at in [5_000u64, 25_000, 45_000] {
        let status = recorder.status(at);
        let meters = status.distance.map_or(0.0, |d| d.meters);
        let bpm = status.heart_rate.map_or(0.0, |h| h.bpm);
        let zone = status.intensity.map_or("unclassified", |i| i.zone.name());
        println!(
            "  t={:6} ms  {:6.1} m  {:5.1} bpm  {} effort",
            at, meters, bpm, zone
        );
    }
}
