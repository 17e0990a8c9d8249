//! Report and series export
//!
//! Writes a computed report as pretty JSON (the bundle the presentation
//! layer consumes) and the training index series as CSV for external
//! charting.

use std::fs;
use std::path::Path;

use crate::engine::MetricsReport;
use crate::error::Result;
use crate::models::TrainingIndexPoint;

/// Write a full report as pretty-printed JSON
pub fn export_report_json(report: &MetricsReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    tracing::info!(path = %path.display(), "report exported");
    Ok(())
}

/// Write the training index series as CSV with a header row
pub fn export_index_csv(points: &[TrainingIndexPoint], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    tracing::info!(
        rows = points.len(),
        path = %path.display(),
        "training index exported"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{AthleteContext, MetricsEngine};
    use crate::models::DailySample;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn samples() -> Vec<DailySample> {
        (0..14)
            .map(|d| DailySample {
                date: NaiveDate::from_ymd_opt(2024, 8, 1)
                    .unwrap()
                    .checked_add_days(chrono::Days::new(d))
                    .unwrap(),
                resting_heart_rate: dec!(60),
                hrv: dec!(70),
                sleep_score: dec!(80),
                training_load: dec!(50),
            })
            .collect()
    }

    #[test]
    fn test_export_report_json() {
        let engine = MetricsEngine::new();
        let samples = samples();
        let report = engine
            .report(
                &samples,
                samples.last().unwrap().date,
                &AthleteContext {
                    max_hr: 190,
                    resting_hr: Some(55),
                },
            )
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        export_report_json(&report, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let back: MetricsReport = serde_json::from_str(&contents).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_export_index_csv() {
        let points = vec![
            TrainingIndexPoint {
                date: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
                value: dec!(72.5),
            },
            TrainingIndexPoint {
                date: NaiveDate::from_ymd_opt(2024, 8, 2).unwrap(),
                value: dec!(68.0),
            },
        ];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.csv");
        export_index_csv(&points, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("date,value"));
        assert!(contents.contains("2024-08-01,72.5"));
    }
}
