//! Daily sample import
//!
//! Reads sample sequences exported by the data-retrieval layer, either as
//! CSV or as a JSON array, detected by file extension. Column headers
//! tolerate the common name variations wearable exports use.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{MetricsError, Result};
use crate::models::DailySample;

/// One row of an imported sample file, with tolerant header names
#[derive(Debug, Deserialize)]
struct SampleRecord {
    #[serde(alias = "day")]
    date: NaiveDate,

    #[serde(alias = "resting_hr", alias = "rhr")]
    resting_heart_rate: Decimal,

    #[serde(alias = "rmssd", alias = "hrv_ms")]
    hrv: Decimal,

    #[serde(alias = "sleep")]
    sleep_score: Decimal,

    #[serde(alias = "load", alias = "activity_load")]
    training_load: Decimal,
}

impl From<SampleRecord> for DailySample {
    fn from(record: SampleRecord) -> Self {
        DailySample {
            date: record.date,
            resting_heart_rate: record.resting_heart_rate,
            hrv: record.hrv,
            sleep_score: record.sleep_score,
            training_load: record.training_load,
        }
    }
}

/// Import samples from a file, detecting the format by extension
pub fn import_samples(path: &Path) -> Result<Vec<DailySample>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("csv") => import_csv(path),
        Some("json") => import_json(path),
        other => Err(MetricsError::Configuration(format!(
            "unsupported sample file format: {:?} ({})",
            other,
            path.display()
        ))),
    }
}

/// Import samples from a CSV file with a header row
pub fn import_csv(path: &Path) -> Result<Vec<DailySample>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut samples = Vec::new();
    for record in reader.deserialize::<SampleRecord>() {
        samples.push(DailySample::from(record?));
    }

    finish_import(samples, path)
}

/// Import samples from a JSON array
pub fn import_json(path: &Path) -> Result<Vec<DailySample>> {
    let contents = fs::read_to_string(path)?;
    let records: Vec<SampleRecord> = serde_json::from_str(&contents)?;
    let samples = records.into_iter().map(DailySample::from).collect();

    finish_import(samples, path)
}

fn finish_import(mut samples: Vec<DailySample>, path: &Path) -> Result<Vec<DailySample>> {
    // Files from export pipelines are occasionally newest-first; order by
    // date so downstream validation only has to reject true duplicates.
    samples.sort_by_key(|s| s.date);
    tracing::info!(
        count = samples.len(),
        path = %path.display(),
        "imported daily samples"
    );
    Ok(samples)
}
