//! Vault Persistence Example
//!
//! This example demonstrates the storage seam: archiving the settled
//! prefix of every series past a shared horizon, saving what remains, and
//! rehydrating the whole session from the vault.
//!
//! ## What You'll Learn
//!
//! - Archiving past a shared horizon to cap in-memory growth
//! - Saving dirty series and the dirty-flag lifecycle
//! - Hydrating a recorder from previously saved documents
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 03_vault_persistence
//! ```

use tempo_core::series::{HeartRateSample, LocationSample};
use tempo_core::vault::MemoryVault;
use tempo_core::{HeartRateProfile, Recorder, RecorderConfig};

fn main() {
    println!("Tempo Vault Persistence Example");
    println!("===============================\n");

    let profile = HeartRateProfile::new(190.0, 50.0);
    let mut vault = MemoryVault::new();

    // Five minutes of recording, one fix and one reading every 10 s
    let mut recorder = Recorder::new(profile, RecorderConfig::default());
    recorder.mark_segment(0);
    for i in 0..30u64 {
        let at = i * 10_000;
        recorder.record_location(LocationSample::new(at, 47.0 + 0.0003 * i as f64, 8.0));
        recorder.record_heart_rate(HeartRateSample::new(at, 115.0 + i as f64));
    }
    println!(
        "Recorded {} fixes, {} heart-rate readings",
        recorder.location_series().len(),
        recorder.heart_rate_series().len()
    );

    // Archive everything settled before 200 s, then save what remains
    recorder
        .archive_and_save(200_000, &mut vault)
        .expect("memory vault never fails");
    println!(
        "After archive+save: {} fixes in memory, {} documents in the vault",
        recorder.location_series().len(),
        vault.len()
    );
    println!(
        "Location series dirty after save: {}\n",
        recorder.location_series().is_dirty()
    );

    // A rehydrated recorder picks up exactly where the saved one left off
    let revived = Recorder::hydrated(profile, RecorderConfig::default(), &vault);
    let status = revived.status(250_000);
    println!("Rehydrated status at t=250 s:");
    println!(
        "  distance:   {:8.1} m",
        status.distance.map_or(0.0, |d| d.meters)
    );
    println!(
        "  heart rate: {:8.1} bpm",
        status.heart_rate.map_or(0.0, |h| h.bpm)
    );

    println!("\nVault documents:");
    for key in vault.keys() {
        println!("  {key}");
    }
}
