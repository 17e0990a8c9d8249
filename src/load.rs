//! Acute:chronic workload ratio (ACWR)
//!
//! Compares the average training load over a short trailing window against
//! the average over a long trailing window, conventionally 7 and 28 days.
//! Values above ~1.5 indicate elevated overtraining risk; values below 1
//! indicate freshness or detraining.
//!
//! Days without a sample inside a window count as rest days (zero load).
//! When less history exists than the window length, the window shrinks to
//! the available days instead of failing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};
use crate::models::{DailySample, LoadRatio};

/// Load ratio window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Acute (short-term) window in days (default: 7)
    pub acute_days: u16,

    /// Chronic (long-term) window in days (default: 28)
    pub chronic_days: u16,
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig {
            acute_days: 7,
            chronic_days: 28,
        }
    }
}

impl LoadConfig {
    /// Validate window lengths: both positive, acute strictly shorter
    pub fn validate(&self) -> Result<()> {
        if self.acute_days == 0 || self.chronic_days == 0 {
            return Err(MetricsError::InvalidParameter {
                parameter: "window days".to_string(),
                value: format!("{}/{}", self.acute_days, self.chronic_days),
                reason: "windows must be positive".to_string(),
            });
        }
        if self.acute_days >= self.chronic_days {
            return Err(MetricsError::InvalidParameter {
                parameter: "acute_days".to_string(),
                value: self.acute_days.to_string(),
                reason: format!(
                    "acute window must be shorter than chronic window ({})",
                    self.chronic_days
                ),
            });
        }
        Ok(())
    }
}

/// Acute:chronic workload ratio calculator
pub struct LoadCalculator {
    config: LoadConfig,
}

impl LoadCalculator {
    pub fn new() -> Self {
        LoadCalculator {
            config: LoadConfig::default(),
        }
    }

    /// Create a calculator with custom windows, validating them
    pub fn with_config(config: LoadConfig) -> Result<Self> {
        config.validate()?;
        Ok(LoadCalculator { config })
    }

    /// Compute the acute:chronic ratio as of `as_of`
    ///
    /// Returns `LoadRatio::Undefined` iff the chronic-window average load is
    /// exactly zero. This never raises a division fault and never encodes
    /// the sentinel as zero or infinity.
    pub fn compute(&self, samples: &[DailySample], as_of: NaiveDate) -> Result<LoadRatio> {
        let history: Vec<&DailySample> = samples.iter().filter(|s| s.date <= as_of).collect();
        if history.is_empty() {
            return Err(MetricsError::InsufficientData {
                calculation: "load ratio".to_string(),
                reason: format!("no samples on or before {}", as_of),
            });
        }

        let first_date = history[0].date;
        let acute_avg = Self::window_average(&history, as_of, first_date, self.config.acute_days);
        let chronic_avg =
            Self::window_average(&history, as_of, first_date, self.config.chronic_days);

        if chronic_avg == Decimal::ZERO {
            return Ok(LoadRatio::Undefined);
        }

        Ok(LoadRatio::Ratio(acute_avg / chronic_avg))
    }

    /// Average load over a trailing window ending at `as_of` inclusive
    ///
    /// The window start is clamped to the first recorded sample, which
    /// shrinks the denominator when history is shorter than the window.
    fn window_average(
        history: &[&DailySample],
        as_of: NaiveDate,
        first_date: NaiveDate,
        window_days: u16,
    ) -> Decimal {
        let nominal_start = as_of
            .checked_sub_days(chrono::Days::new(window_days as u64 - 1))
            .unwrap_or(as_of);
        let start = nominal_start.max(first_date);

        let day_count = (as_of - start).num_days() + 1;
        if day_count <= 0 {
            return Decimal::ZERO;
        }

        let sum: Decimal = history
            .iter()
            .filter(|s| s.date >= start)
            .map(|s| s.training_load)
            .sum();

        sum / Decimal::from(day_count)
    }
}

impl Default for LoadCalculator {
    fn default() -> Self {
        Self::new()
    }
}
