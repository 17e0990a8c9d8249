//! Daily readiness scoring
//!
//! Readiness summarizes recovery state for a day as a 0-100 composite of
//! three components measured against a trailing personal baseline:
//!
//! - **HRV**: today's RMSSD relative to the baseline average. Higher HRV
//!   means better recovery.
//! - **Sleep**: the device sleep score, already on a 0-100 scale.
//! - **Resting HR**: baseline average relative to today's value. A raised
//!   resting heart rate signals incomplete recovery.
//!
//! Each component is monotone in its input, so improved sleep or HRV can
//! never lower the score and a higher resting HR can never raise it.
//!
//! The baseline defaults to a 14-day trailing window. With less history the
//! score is still produced but flagged `Confidence::Low`; readiness
//! dashboards degrade gracefully rather than failing on sparse data.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::error::{MetricsError, Result};
use crate::models::{Confidence, DailySample, ReadinessScore};

/// Readiness calculation settings
///
/// Weights are configurable coefficients rather than hard-coded constants;
/// they are normalized by their sum, so they need not add up to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessConfig {
    /// Trailing baseline window in days (default: 14)
    pub baseline_days: u16,

    /// Minimum history for a non-degraded score (default: 7)
    pub min_baseline_days: u16,

    /// Weight of the HRV component
    pub hrv_weight: Decimal,

    /// Weight of the sleep component
    pub sleep_weight: Decimal,

    /// Weight of the resting heart rate component
    pub resting_hr_weight: Decimal,

    /// Baseline HRV coefficient of variation above which confidence is
    /// capped at Normal (default: 0.15)
    pub stability_cv_threshold: Decimal,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        ReadinessConfig {
            baseline_days: 14,
            min_baseline_days: 7,
            hrv_weight: dec!(0.35),
            sleep_weight: dec!(0.35),
            resting_hr_weight: dec!(0.30),
            stability_cv_threshold: dec!(0.15),
        }
    }
}

/// Readiness score calculator
///
/// Stateless: every call is a pure function of the provided samples.
pub struct ReadinessCalculator {
    config: ReadinessConfig,
}

impl ReadinessCalculator {
    pub fn new() -> Self {
        ReadinessCalculator {
            config: ReadinessConfig::default(),
        }
    }

    pub fn with_config(config: ReadinessConfig) -> Self {
        ReadinessCalculator { config }
    }

    /// Compute the readiness score for `as_of`
    ///
    /// Uses the latest sample at or before `as_of` as "today" and the
    /// preceding `baseline_days` of samples as the personal baseline.
    /// Returns `InsufficientData` only when no usable sample exists at all.
    pub fn compute(&self, samples: &[DailySample], as_of: NaiveDate) -> Result<ReadinessScore> {
        let history: Vec<&DailySample> = samples.iter().filter(|s| s.date <= as_of).collect();

        let today = history.last().copied().ok_or_else(|| {
            MetricsError::InsufficientData {
                calculation: "readiness".to_string(),
                reason: format!("no samples on or before {}", as_of),
            }
        })?;

        let baseline_start = today
            .date
            .checked_sub_days(chrono::Days::new(self.config.baseline_days as u64))
            .unwrap_or(today.date);
        let baseline: Vec<&DailySample> = history
            .iter()
            .copied()
            .filter(|s| s.date >= baseline_start && s.date < today.date)
            .collect();

        let hrv_component = self.hrv_component(today, &baseline);
        let sleep_component = today.sleep_score.clamp(Decimal::ZERO, dec!(100));
        let rhr_component = self.resting_hr_component(today, &baseline);

        let weight_sum =
            self.config.hrv_weight + self.config.sleep_weight + self.config.resting_hr_weight;
        if weight_sum <= Decimal::ZERO {
            return Err(MetricsError::InvalidParameter {
                parameter: "readiness weights".to_string(),
                value: weight_sum.to_string(),
                reason: "weights must sum to a positive value".to_string(),
            });
        }

        let score = (self.config.hrv_weight * hrv_component
            + self.config.sleep_weight * sleep_component
            + self.config.resting_hr_weight * rhr_component)
            / weight_sum;
        let score = score.clamp(Decimal::ZERO, dec!(100)).round_dp(1);

        let confidence = self.confidence(&baseline);

        Ok(ReadinessScore { score, confidence })
    }

    /// HRV component: today's RMSSD relative to the baseline mean
    ///
    /// Without a baseline, falls back to an absolute RMSSD scale where
    /// 20ms maps to 20 and 100ms to 100.
    fn hrv_component(&self, today: &DailySample, baseline: &[&DailySample]) -> Decimal {
        match Self::baseline_mean(baseline, |s| s.hrv) {
            Some(mean) if mean > Decimal::ZERO => {
                (today.hrv / mean * dec!(100)).clamp(Decimal::ZERO, dec!(100))
            }
            _ => today.hrv.clamp(dec!(20), dec!(100)),
        }
    }

    /// Resting HR component: baseline mean relative to today's value
    ///
    /// An elevated resting heart rate lowers the component. Without a
    /// baseline, falls back to an absolute scale anchored at 40 bpm.
    fn resting_hr_component(&self, today: &DailySample, baseline: &[&DailySample]) -> Decimal {
        match Self::baseline_mean(baseline, |s| s.resting_heart_rate) {
            Some(mean) if mean > Decimal::ZERO && today.resting_heart_rate > Decimal::ZERO => {
                (mean / today.resting_heart_rate * dec!(100)).clamp(Decimal::ZERO, dec!(100))
            }
            _ => (dec!(100) - (today.resting_heart_rate - dec!(40)) * dec!(1.25))
                .clamp(Decimal::ZERO, dec!(100)),
        }
    }

    fn baseline_mean(baseline: &[&DailySample], field: impl Fn(&DailySample) -> Decimal) -> Option<Decimal> {
        if baseline.is_empty() {
            return None;
        }
        let sum: Decimal = baseline.iter().map(|s| field(s)).sum();
        Some(sum / Decimal::from(baseline.len()))
    }

    /// Confidence from baseline depth and measurement stability
    fn confidence(&self, baseline: &[&DailySample]) -> Confidence {
        if baseline.len() < self.config.min_baseline_days as usize {
            return Confidence::Low;
        }

        let hrv_values: Vec<f64> = baseline
            .iter()
            .filter_map(|s| s.hrv.to_f64())
            .collect();
        let mean = hrv_values.iter().mean();
        let std_dev = hrv_values.iter().std_dev();

        let cv_threshold = self.config.stability_cv_threshold.to_f64().unwrap_or(0.15);
        if mean > 0.0 && std_dev / mean <= cv_threshold {
            Confidence::High
        } else {
            Confidence::Normal
        }
    }
}

impl Default for ReadinessCalculator {
    fn default() -> Self {
        Self::new()
    }
}
