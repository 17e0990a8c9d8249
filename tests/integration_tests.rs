use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use pulseparse::engine::{AthleteContext, MetricsEngine};
use pulseparse::error::MetricsError;
use pulseparse::models::{Confidence, DailySample};

/// End-to-end scenarios against the full metrics engine

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 8, 1)
        .unwrap()
        .checked_add_days(chrono::Days::new(offset))
        .unwrap()
}

fn sample(date: NaiveDate, load: Decimal) -> DailySample {
    DailySample {
        date,
        resting_heart_rate: dec!(60),
        hrv: dec!(70),
        sleep_score: dec!(80),
        training_load: load,
    }
}

fn athlete() -> AthleteContext {
    AthleteContext {
        max_hr: 190,
        resting_hr: Some(55),
    }
}

/// 30 days of constant training: ratio at 1.0, stable high readiness,
/// target zone in a maintenance band
#[test]
fn test_steady_training_month() {
    let engine = MetricsEngine::new();
    let samples: Vec<DailySample> = (0..30).map(|d| sample(day(d), dec!(50))).collect();

    let report = engine.report(&samples, day(29), &athlete()).unwrap();

    assert_eq!(report.load_ratio.value().unwrap(), dec!(1));
    assert!(report.readiness.score >= dec!(85));
    assert_eq!(report.readiness.confidence, Confidence::High);

    // Maintenance band: well above recovery, below the all-out zone 5 top
    let zone = report.target_zone;
    assert!(zone.lower > 100);
    assert!(zone.upper < 190);
    assert!(zone.lower <= zone.upper);
}

/// 28 rest days then a sudden 100-load day: ratio spikes past 1.5 and the
/// target zone shifts conservative relative to the steady-state case
#[test]
fn test_sudden_spike_after_rest() {
    let engine = MetricsEngine::new();
    let mut samples: Vec<DailySample> = (0..28).map(|d| sample(day(d), dec!(0))).collect();
    samples.push(sample(day(28), dec!(100)));

    let report = engine.report(&samples, day(28), &athlete()).unwrap();
    assert!(report.load_ratio.value().unwrap() > dec!(1.5));

    let steady: Vec<DailySample> = (0..29).map(|d| sample(day(d), dec!(50))).collect();
    let steady_report = engine.report(&steady, day(28), &athlete()).unwrap();

    assert!(report.target_zone.upper < steady_report.target_zone.upper);
}

/// A single rest-day sample: low-confidence readiness, undefined ratio,
/// and a usable readiness-only zone instead of a failure
#[test]
fn test_single_day_degrades_gracefully() {
    let engine = MetricsEngine::new();
    let samples = vec![sample(day(0), dec!(0))];

    let report = engine.report(&samples, day(0), &athlete()).unwrap();
    assert_eq!(report.readiness.confidence, Confidence::Low);
    assert!(report.load_ratio.is_undefined());
    assert!(report.target_zone.lower >= 40);
    assert!(report.target_zone.upper <= 220);
}

/// A negative resting HR sample is excluded without aborting the rest
#[test]
fn test_invalid_sample_excluded() {
    let engine = MetricsEngine::new();
    let mut samples: Vec<DailySample> = (0..14).map(|d| sample(day(d), dec!(50))).collect();
    samples[7].resting_heart_rate = dec!(-60);

    let report = engine.report(&samples, day(13), &athlete()).unwrap();
    assert_eq!(report.rejected_samples, 1);
    assert_eq!(report.training_index.len(), 13);
    assert!(report
        .training_index
        .iter()
        .all(|p| p.date != day(7)));
}

#[test]
fn test_duplicate_dates_rejected_outright() {
    let engine = MetricsEngine::new();
    let samples = vec![sample(day(0), dec!(50)), sample(day(0), dec!(60))];

    let err = engine.report(&samples, day(0), &athlete()).unwrap_err();
    assert!(matches!(err, MetricsError::DuplicateDate { .. }));
}

/// Appending a new day never rewrites history (causality)
#[test]
fn test_series_is_append_only() {
    let engine = MetricsEngine::new();
    let samples: Vec<DailySample> = (0..30).map(|d| sample(day(d), dec!(50))).collect();

    let early = engine.report(&samples[..20], day(19), &athlete()).unwrap();
    let late = engine.report(&samples, day(29), &athlete()).unwrap();

    assert_eq!(&late.training_index[..20], &early.training_index[..]);
}

/// The import path feeds the engine end to end
#[test]
fn test_csv_import_to_report() {
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("samples.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "date,resting_heart_rate,hrv,sleep_score,training_load").unwrap();
    for d in 0..14 {
        writeln!(file, "{},60,70,80,50", day(d)).unwrap();
    }
    drop(file);

    let samples = pulseparse::import::import_samples(&path).unwrap();
    let engine = MetricsEngine::new();
    let report = engine.report(&samples, day(13), &athlete()).unwrap();

    assert_eq!(report.training_index.len(), 14);
    assert!(report.load_ratio.value().is_some());
}

/// Missing max HR context can be filled from age upstream of the engine
#[test]
fn test_age_estimated_max_hr() {
    let engine = MetricsEngine::new();
    let samples: Vec<DailySample> = (0..14).map(|d| sample(day(d), dec!(50))).collect();

    let max_hr = pulseparse::zones::estimate_max_hr_from_age(35).unwrap();
    assert_eq!(max_hr, 185);

    let report = engine
        .report(
            &samples,
            day(13),
            &AthleteContext {
                max_hr,
                resting_hr: None,
            },
        )
        .unwrap();
    assert!(report.target_zone.upper <= 185);
}
