//! Segment Totals Example
//!
//! This example demonstrates the aggregation side of Tempo: marking
//! segments (laps), letting the engine split time by intensity zone, and
//! reading the derived quantities out of each bucket.
//!
//! ## What You'll Learn
//!
//! - Marking segments to scope aggregation to the current lap
//! - How zone crossings split totals at interpolated instants
//! - Reading duration, distance, pace and average heart rate per bucket
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 02_segment_totals
//! ```

use tempo_core::series::{HeartRateSample, LocationSample};
use tempo_core::{HeartRateProfile, Recorder, RecorderConfig};

fn main() {
    println!("Tempo Segment Totals Example");
    println!("============================\n");

    let profile = HeartRateProfile::new(190.0, 50.0);
    let mut recorder = Recorder::new(profile, RecorderConfig::default());

    // Lap 1: ten minutes of warm-up, climbing from 110 to 140 bpm
    recorder.mark_segment(0);
    for i in 0..=60u64 {
        let at = i * 10_000;
        recorder.record_location(LocationSample::new(at, 47.0 + 0.00025 * i as f64, 8.0));
        recorder.record_heart_rate(HeartRateSample::new(at, 110.0 + 0.5 * i as f64));
    }

    // Lap 2: a harder ten minutes; totals are scoped to this segment
    let lap = recorder.mark_segment(600_000);
    for i in 61..=120u64 {
        let at = i * 10_000;
        recorder.record_location(LocationSample::new(at, 47.0 + 0.00025 * i as f64, 8.0));
        recorder.record_heart_rate(HeartRateSample::new(at, 140.0 + 0.25 * (i - 60) as f64));
    }

    let totals = recorder.totals(1_200_000).expect("a segment was marked");
    println!("Current lap started at t={} ms", lap.started_at());
    println!("{} zone bucket(s):\n", totals.len());

    for (key, bucket) in &totals {
        let zone = key.intensity.map_or("unclassified", |z| z.name());
        println!("  [{zone}]");
        println!("    duration: {:7.1} s", bucket.duration_s());
        if let Some(meters) = bucket.distance_m() {
            println!("    distance: {:7.1} m", meters);
        }
        if let Some(bpm) = bucket.avg_heart_rate() {
            println!("    avg rate: {:7.1} bpm", bpm);
        }
        if let Some(pace) = bucket.pace_s_per_km() {
            println!("    pace:     {:7.1} s/km", pace);
        }
        if let Some(vdot) = bucket.vdot(recorder.profile()) {
            println!("    fitness:  {:7.1} (vdot)", vdot);
        }
    }
}
