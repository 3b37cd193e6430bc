//! End-to-end recording sessions
//!
//! Drives a recorder with generated multi-sensor workouts and checks the
//! derived series and totals stay consistent with each other, including
//! across an archive, save, and rehydration cycle.

mod common;

use common::WorkoutGenerator;

use tempo_core::series::{haversine_m, Intensity, MotionClass};
use tempo_core::vault::MemoryVault;
use tempo_core::{HeartRateProfile, Recorder, RecorderConfig, Vault};

fn profile() -> HeartRateProfile {
    // default fractions of 190 put the zone floors at 114/133/152/171
    HeartRateProfile::new(190.0, 50.0)
}

#[test]
fn steady_run_keeps_derived_series_consistent() {
    let mut gen = WorkoutGenerator::new(0);
    let fixes = gen.gps_track(121, 5_000, 1.5);
    gen.rewind(0);
    let readings = gen.heart_ramp(121, 5_000, 110.0, 170.0, 2.0);
    gen.rewind(0);
    let steps = gen.cadence(21, 30_000, 170.0);

    let mut rec = Recorder::new(profile(), RecorderConfig::default());
    rec.mark_segment(0);
    rec.record_motion(gen.motion(MotionClass::Running));
    for fix in &fixes {
        rec.record_location(*fix);
    }
    for reading in &readings {
        rec.record_heart_rate(*reading);
    }
    for counter in &steps {
        rec.record_pedometer(*counter);
    }

    // distance is cumulative and never shrinks
    let distance = rec.distance_series();
    assert_eq!(distance.len(), fixes.len());
    for (a, b) in distance.iter().zip(distance.iter().skip(1)) {
        assert!(b.meters >= a.meters);
    }

    // the thinned track honors the spacing floor
    let track = rec.track_series();
    assert!(track.len() > 2);
    assert!(track.len() < fixes.len());
    for (a, b) in track.iter().zip(track.iter().skip(1)) {
        let gap = haversine_m(a.latitude, a.longitude, b.latitude, b.longitude);
        assert!(gap >= RecorderConfig::default().track_spacing_m - 1e-9);
    }

    // the beats integral grows with the ramp: ~140 bpm average over 600 s
    let beats = rec.heart_beats_series();
    for (a, b) in beats.iter().zip(beats.iter().skip(1)) {
        assert!(b.bpm_seconds >= a.bpm_seconds);
    }
    let total_beats = beats.last().unwrap().bpm_seconds;
    assert!((total_beats - 84_000.0).abs() < 2_500.0, "got {total_beats}");

    // intensity starts in recovery and climbs with the ramp
    let intensity = rec.intensity_series();
    assert_eq!(intensity.first().unwrap().zone, Intensity::Recovery);
    assert!(intensity.last().unwrap().zone >= Intensity::Hard);

    // totals cover the current lap exactly, whatever the zone split
    let lap = rec.mark_segment(300_000);
    let totals = rec.totals(600_000).unwrap();
    assert!(!totals.is_empty());
    for key in totals.keys() {
        assert_eq!(key.segment, lap);
    }

    let lap_seconds: f64 = totals.values().map(|b| b.duration_s()).sum();
    assert!((lap_seconds - 300.0).abs() < 1e-6, "got {lap_seconds}");

    let d_end = rec.distance_series().lookup(600_000).unwrap().meters;
    let d_lap = rec.distance_series().lookup(300_000).unwrap().meters;
    let lap_meters: f64 = totals.values().filter_map(|b| b.distance_m()).sum();
    assert!((lap_meters - (d_end - d_lap)).abs() < 1e-6, "got {lap_meters}");
}

#[test]
fn exact_ramp_splits_zone_time_at_interpolated_crossings() {
    let mut gen = WorkoutGenerator::new(0);
    // 110 -> 170 bpm over 10 minutes, no noise: crossings land exactly at
    // 40 s (114), 230 s (133) and 420 s (152); 171 is never reached
    let readings = gen.heart_ramp(121, 5_000, 110.0, 170.0, 0.0);

    let mut rec = Recorder::new(profile(), RecorderConfig::default());
    let segment = rec.mark_segment(0);
    for reading in &readings {
        rec.record_heart_rate(*reading);
    }
    assert_eq!(rec.intensity_series().len(), 4);

    let totals = rec.totals(600_000).unwrap();
    assert_eq!(totals.len(), 4);

    let duration_in = |zone: Intensity| {
        totals
            .iter()
            .find(|(key, _)| key.segment == segment && key.intensity == Some(zone))
            .map(|(_, bucket)| bucket.duration_s())
            .unwrap()
    };
    assert_eq!(duration_in(Intensity::Recovery), 40.0);
    assert_eq!(duration_in(Intensity::Light), 190.0);
    assert_eq!(duration_in(Intensity::Moderate), 190.0);
    assert_eq!(duration_in(Intensity::Hard), 180.0);

    // average heart rate per zone is the ramp midpoint of that window
    let hard_avg = totals
        .iter()
        .find(|(key, _)| key.intensity == Some(Intensity::Hard))
        .and_then(|(_, bucket)| bucket.avg_heart_rate())
        .unwrap();
    assert!((hard_avg - 161.0).abs() < 1e-9, "got {hard_avg}");
}

#[test]
fn session_survives_archive_save_and_rehydration() {
    let mut gen = WorkoutGenerator::new(0);
    let fixes = gen.gps_track(121, 5_000, 1.5);
    gen.rewind(0);
    let readings = gen.heart_ramp(121, 5_000, 110.0, 140.0, 1.0);
    let (early_fixes, late_fixes) = fixes.split_at(61);
    let (early_hr, late_hr) = readings.split_at(61);

    let mut rec = Recorder::new(profile(), RecorderConfig::default());
    rec.mark_segment(0);
    for fix in early_fixes {
        rec.record_location(*fix);
    }
    for reading in early_hr {
        rec.record_heart_rate(*reading);
    }

    let mut vault = MemoryVault::new();
    rec.archive_and_save(150_000, &mut vault).unwrap();
    assert!(vault.exists("location.samples"));
    assert!(vault.exists("heart_rate.meta"));
    assert!(vault.exists("totals.samples"));

    let mut revived = Recorder::hydrated(profile(), RecorderConfig::default(), &vault);
    assert_eq!(
        revived.location_series().len(),
        rec.location_series().len()
    );

    // both instances finish the session from the same persisted state
    for fix in late_fixes {
        rec.record_location(*fix);
        revived.record_location(*fix);
    }
    for reading in late_hr {
        rec.record_heart_rate(*reading);
        revived.record_heart_rate(*reading);
    }

    assert_eq!(rec.status(600_000), revived.status(600_000));
    assert_eq!(
        rec.totals(600_000).unwrap(),
        revived.totals(600_000).unwrap()
    );
}
