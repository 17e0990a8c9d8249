//! Metrics engine facade
//!
//! Ties the individual calculators together behind the input/output
//! contract used by the surrounding dashboard code: ordered daily samples
//! in, a `MetricsReport` out. The engine holds no mutable state between
//! invocations; every call is a pure function of its inputs and is safe to
//! run concurrently for independent users.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::MetricsConfig;
use crate::error::{MetricsError, Result};
use crate::index::{TrainingIndexCalculator, TrendAnalysis};
use crate::load::LoadCalculator;
use crate::models::{
    validate_samples, DailySample, HeartRateZone, LoadRatio, ReadinessScore, TrainingIndexPoint,
};
use crate::readiness::ReadinessCalculator;
use crate::zones::{ewma_resting_hr, ZoneCalculator};

/// Per-user context supplied by the caller
///
/// Max HR is user-supplied or estimated upstream (e.g. from age via
/// [`crate::zones::estimate_max_hr_from_age`]); estimation is not the
/// engine's concern. Resting HR falls back to an exponentially weighted
/// average of the recent samples when not given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AthleteContext {
    /// Maximum heart rate in bpm
    pub max_hr: u16,

    /// Resting heart rate in bpm; derived from samples when `None`
    pub resting_hr: Option<u16>,
}

/// Complete metrics bundle for one as-of date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Date the report applies to
    pub as_of: NaiveDate,

    /// Readiness score with confidence flag
    pub readiness: ReadinessScore,

    /// Acute:chronic workload ratio, or the undefined sentinel
    pub load_ratio: LoadRatio,

    /// Per-day training index series up to `as_of`
    pub training_index: Vec<TrainingIndexPoint>,

    /// Fitted trend over the training index, if enough points exist
    pub trend: Option<TrendAnalysis>,

    /// Recommended band for today's training
    pub target_zone: HeartRateZone,

    /// All five adapted zones, recovery through VO2 max
    pub zones: Vec<HeartRateZone>,

    /// Number of samples dropped during validation
    pub rejected_samples: usize,
}

/// Stateless metrics computation engine
pub struct MetricsEngine {
    readiness: ReadinessCalculator,
    load: LoadCalculator,
    index: TrainingIndexCalculator,
    zones: ZoneCalculator,
    resting_hr_span: u16,
}

impl MetricsEngine {
    pub fn new() -> Self {
        // Default configuration cannot fail validation
        Self::with_config(MetricsConfig::default()).expect("default config is valid")
    }

    pub fn with_config(config: MetricsConfig) -> Result<Self> {
        config.validate()?;
        let resting_hr_span = config.readiness.baseline_days;
        Ok(MetricsEngine {
            readiness: ReadinessCalculator::with_config(config.readiness.clone()),
            load: LoadCalculator::with_config(config.load.clone())?,
            index: TrainingIndexCalculator::with_config(
                config.index,
                config.readiness,
                config.load,
            )?,
            zones: ZoneCalculator::with_config(config.zones),
            resting_hr_span,
        })
    }

    /// Compute the full report for `as_of`
    ///
    /// Validates the sample sequence (individual invalid samples are
    /// dropped with a warning, structural problems are hard errors), then
    /// runs readiness, load ratio, training index, trend, and zones.
    pub fn report(
        &self,
        samples: &[DailySample],
        as_of: NaiveDate,
        athlete: &AthleteContext,
    ) -> Result<MetricsReport> {
        let sanitized = validate_samples(samples)?;
        if !sanitized.rejected.is_empty() {
            tracing::warn!(
                rejected = sanitized.rejected.len(),
                "samples dropped during validation"
            );
        }

        let visible: Vec<DailySample> = sanitized
            .valid
            .iter()
            .filter(|s| s.date <= as_of)
            .cloned()
            .collect();
        if visible.is_empty() {
            return Err(MetricsError::InsufficientData {
                calculation: "metrics report".to_string(),
                reason: format!("no valid samples on or before {}", as_of),
            });
        }

        let readiness = self.readiness.compute(&visible, as_of)?;
        let load_ratio = self.load.compute(&visible, as_of)?;
        let training_index = self.index.collect_series(&visible);
        let trend = self.index.analyze_trend(&training_index);

        let resting_hr = self.resting_hr(athlete, &visible);
        let target_zone = self
            .zones
            .target_zone(&readiness, &load_ratio, athlete.max_hr, resting_hr)?;
        let zones = self
            .zones
            .all_zones(&readiness, &load_ratio, athlete.max_hr, resting_hr)?;

        tracing::debug!(
            %as_of,
            readiness = %readiness.score,
            confidence = %readiness.confidence,
            load_ratio = %load_ratio,
            "metrics report computed"
        );

        Ok(MetricsReport {
            as_of,
            readiness,
            load_ratio,
            training_index,
            trend,
            target_zone,
            zones,
            rejected_samples: sanitized.rejected.len(),
        })
    }

    /// Training index series alone, without heart rate context
    pub fn training_index(&self, samples: &[DailySample]) -> Result<Vec<TrainingIndexPoint>> {
        let sanitized = validate_samples(samples)?;
        Ok(self.index.collect_series(&sanitized.valid))
    }

    /// Resting HR from the athlete context, or an EWMA over recent samples
    fn resting_hr(&self, athlete: &AthleteContext, samples: &[DailySample]) -> u16 {
        if let Some(resting_hr) = athlete.resting_hr {
            return resting_hr;
        }
        ewma_resting_hr(samples, self.resting_hr_span)
            .and_then(|v| v.round().to_u16())
            .unwrap_or(60)
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Confidence;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

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

    #[test]
    fn test_full_report() {
        let engine = MetricsEngine::new();
        let samples: Vec<DailySample> = (0..30).map(|d| sample(day(d), dec!(50))).collect();

        let report = engine.report(&samples, day(29), &athlete()).unwrap();
        assert_eq!(report.as_of, day(29));
        assert_eq!(report.load_ratio.value().unwrap(), dec!(1));
        assert_eq!(report.training_index.len(), 30);
        assert!(report.trend.is_some());
        assert!(report.target_zone.lower <= report.target_zone.upper);
        assert_eq!(report.zones.len(), 5);
        assert_eq!(report.rejected_samples, 0);
    }

    #[test]
    fn test_report_is_referentially_transparent() {
        let engine = MetricsEngine::new();
        let samples: Vec<DailySample> = (0..20).map(|d| sample(day(d), dec!(40))).collect();

        let first = engine.report(&samples, day(19), &athlete()).unwrap();
        let second = engine.report(&samples, day(19), &athlete()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_sample_excluded_not_fatal() {
        let engine = MetricsEngine::new();
        let mut samples: Vec<DailySample> = (0..20).map(|d| sample(day(d), dec!(40))).collect();
        samples[10].resting_heart_rate = dec!(-5);

        let report = engine.report(&samples, day(19), &athlete()).unwrap();
        assert_eq!(report.rejected_samples, 1);
        assert_eq!(report.training_index.len(), 19);
    }

    #[test]
    fn test_resting_hr_derived_from_samples() {
        let engine = MetricsEngine::new();
        let samples: Vec<DailySample> = (0..20).map(|d| sample(day(d), dec!(40))).collect();
        let no_resting = AthleteContext {
            max_hr: 190,
            resting_hr: None,
        };

        // Constant 60 bpm samples give a 60 bpm EWMA; zones must reflect it
        let derived = engine.report(&samples, day(19), &no_resting).unwrap();
        let explicit = engine
            .report(
                &samples,
                day(19),
                &AthleteContext {
                    max_hr: 190,
                    resting_hr: Some(60),
                },
            )
            .unwrap();
        assert_eq!(derived.target_zone, explicit.target_zone);
    }

    #[test]
    fn test_sparse_history_degrades_gracefully() {
        let engine = MetricsEngine::new();
        let samples = vec![sample(day(0), dec!(0))];

        let report = engine.report(&samples, day(0), &athlete()).unwrap();
        assert_eq!(report.readiness.confidence, Confidence::Low);
        assert!(report.load_ratio.is_undefined());
        assert!(report.target_zone.lower <= report.target_zone.upper);
    }

    #[test]
    fn test_no_samples_before_as_of_is_error() {
        let engine = MetricsEngine::new();
        let samples = vec![sample(day(10), dec!(50))];

        let err = engine.report(&samples, day(5), &athlete()).unwrap_err();
        assert!(matches!(err, MetricsError::InsufficientData { .. }));
    }

    #[test]
    fn test_report_serializes_with_sentinel() {
        let engine = MetricsEngine::new();
        let samples = vec![sample(day(0), dec!(0))];

        let report = engine.report(&samples, day(0), &athlete()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"load_ratio\":\"undefined\""));
    }

    #[test]
    fn test_report_serializes_defined_ratio_as_number() {
        let engine = MetricsEngine::new();
        let samples: Vec<DailySample> = (0..30).map(|d| sample(day(d), dec!(50))).collect();

        let report = engine.report(&samples, day(29), &athlete()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        // Steady load gives a ratio of exactly 1, emitted unquoted
        assert!(json.contains("\"load_ratio\":1.0"));
        assert!(!json.contains("\"load_ratio\":\"1"));
    }
}
