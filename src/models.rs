use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::de::Error as DeError;
use serde::ser::Error as SerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{MetricsError, Result};

/// One calendar day of raw wearable data
///
/// Immutable once recorded; produced by the data-retrieval layer and
/// consumed by the metrics calculators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySample {
    /// Calendar date of the sample
    pub date: NaiveDate,

    /// Resting heart rate in beats per minute
    pub resting_heart_rate: Decimal,

    /// Heart rate variability (RMSSD) in milliseconds
    pub hrv: Decimal,

    /// Sleep score (0-100)
    pub sleep_score: Decimal,

    /// Training load for the day (e.g., duration x intensity)
    pub training_load: Decimal,
}

impl DailySample {
    /// Validate that all fields are within physiologically plausible ranges
    ///
    /// Plausible ranges:
    /// - Resting HR: 25-120 bpm
    /// - HRV (RMSSD): 0-500 ms
    /// - Sleep score: 0-100
    /// - Training load: non-negative
    pub fn validate(&self) -> Result<()> {
        if self.resting_heart_rate < dec!(25) || self.resting_heart_rate > dec!(120) {
            return Err(MetricsError::InvalidSample {
                date: self.date,
                reason: format!(
                    "resting heart rate {} outside 25-120 bpm",
                    self.resting_heart_rate
                ),
            });
        }
        if self.hrv < Decimal::ZERO || self.hrv > dec!(500) {
            return Err(MetricsError::InvalidSample {
                date: self.date,
                reason: format!("hrv {} outside 0-500 ms", self.hrv),
            });
        }
        if self.sleep_score < Decimal::ZERO || self.sleep_score > dec!(100) {
            return Err(MetricsError::InvalidSample {
                date: self.date,
                reason: format!("sleep score {} outside 0-100", self.sleep_score),
            });
        }
        if self.training_load < Decimal::ZERO {
            return Err(MetricsError::InvalidSample {
                date: self.date,
                reason: format!("training load {} is negative", self.training_load),
            });
        }
        Ok(())
    }
}

/// Confidence in a computed score, driven by how much history backs it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Less history than the recommended baseline window
    Low,
    /// Full baseline window available
    Normal,
    /// Full baseline window with stable measurements
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Normal => write!(f, "normal"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Daily readiness score (0-100) with a confidence flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessScore {
    /// Composite recovery score, 0-100
    pub score: Decimal,

    /// How much history backs this score
    pub confidence: Confidence,
}

/// Acute:chronic workload ratio
///
/// `Undefined` is an explicit sentinel for the case where the chronic
/// window has no recorded load. It is never encoded as zero, NaN, or
/// infinity: a defined ratio serializes as a JSON number, the sentinel as
/// the string `"undefined"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadRatio {
    /// Acute average divided by chronic average
    Ratio(Decimal),
    /// Chronic window average load is zero
    Undefined,
}

impl LoadRatio {
    /// Numeric value, if defined
    pub fn value(&self) -> Option<Decimal> {
        match self {
            LoadRatio::Ratio(v) => Some(*v),
            LoadRatio::Undefined => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, LoadRatio::Undefined)
    }
}

impl fmt::Display for LoadRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadRatio::Ratio(v) => write!(f, "{}", v.round_dp(2)),
            LoadRatio::Undefined => write!(f, "undefined"),
        }
    }
}

impl Serialize for LoadRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            // Decimal's default serde form is a string; the output contract
            // wants a plain number for the defined case
            LoadRatio::Ratio(v) => {
                let value = v
                    .to_f64()
                    .ok_or_else(|| S::Error::custom(format!("load ratio {} exceeds f64", v)))?;
                serializer.serialize_f64(value)
            }
            LoadRatio::Undefined => serializer.serialize_str("undefined"),
        }
    }
}

impl<'de> Deserialize<'de> for LoadRatio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(Decimal),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(v) => Ok(LoadRatio::Ratio(v)),
            Raw::Text(s) if s == "undefined" => Ok(LoadRatio::Undefined),
            Raw::Text(s) => {
                // Decimal itself serializes as a string, so retry the parse
                s.parse::<Decimal>()
                    .map(LoadRatio::Ratio)
                    .map_err(|_| D::Error::custom(format!("invalid load ratio: {}", s)))
            }
        }
    }
}

/// One point of the training index time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingIndexPoint {
    /// Date the index applies to
    pub date: NaiveDate,

    /// Composite index value (0-100)
    pub value: Decimal,
}

/// Recommended heart rate band in beats per minute
///
/// Invariant: `lower <= upper`, both within 40-220 bpm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateZone {
    pub lower: u16,
    pub upper: u16,
}

impl HeartRateZone {
    /// Check whether a heart rate falls inside this zone
    pub fn contains(&self, bpm: u16) -> bool {
        bpm >= self.lower && bpm <= self.upper
    }

    /// Zone width in bpm
    pub fn width(&self) -> u16 {
        self.upper - self.lower
    }
}

impl fmt::Display for HeartRateZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} bpm", self.lower, self.upper)
    }
}

/// A sample dropped during validation, with the reason it was rejected
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRejection {
    pub date: NaiveDate,
    pub reason: String,
}

/// Validated, chronologically ordered samples
#[derive(Debug, Clone)]
pub struct SanitizedSamples {
    /// Samples that passed validation, in ascending date order
    pub valid: Vec<DailySample>,

    /// Samples rejected individually (the sequence continues without them)
    pub rejected: Vec<SampleRejection>,
}

/// Validate an ordered sample sequence
///
/// Individual out-of-range samples are rejected and logged but do not abort
/// the sequence. Non-monotonic or duplicate dates are a hard failure since
/// they indicate corrupted input rather than sparse data.
pub fn validate_samples(samples: &[DailySample]) -> Result<SanitizedSamples> {
    let mut valid: Vec<DailySample> = Vec::with_capacity(samples.len());
    let mut rejected = Vec::new();
    let mut previous: Option<NaiveDate> = None;

    for sample in samples {
        if let Some(prev) = previous {
            if sample.date == prev {
                return Err(MetricsError::DuplicateDate { date: sample.date });
            }
            if sample.date < prev {
                return Err(MetricsError::NonMonotonicDates {
                    previous: prev,
                    current: sample.date,
                });
            }
        }
        previous = Some(sample.date);

        match sample.validate() {
            Ok(()) => valid.push(sample.clone()),
            Err(MetricsError::InvalidSample { date, reason }) => {
                tracing::warn!(%date, %reason, "rejecting invalid sample");
                rejected.push(SampleRejection { date, reason });
            }
            Err(other) => return Err(other),
        }
    }

    Ok(SanitizedSamples { valid, rejected })
}
