//! Training index time series
//!
//! A per-day composite of readiness and load ratio used for trend charting.
//! Each point uses only samples up to and including its own day, so the
//! series stays causally valid for a live dashboard: appending new days
//! never changes historical values.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::load::{LoadCalculator, LoadConfig};
use crate::models::{DailySample, LoadRatio, TrainingIndexPoint};
use crate::readiness::{ReadinessCalculator, ReadinessConfig};

/// Training index composition settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Weight of the readiness component
    pub readiness_weight: Decimal,

    /// Weight of the load component
    pub load_weight: Decimal,

    /// Absolute slope (index units per day) below which a trend counts as
    /// stable (default: 0.05)
    pub stable_slope_threshold: Decimal,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            readiness_weight: dec!(0.5),
            load_weight: dec!(0.5),
            stable_slope_threshold: dec!(0.05),
        }
    }
}

/// Training index calculator
pub struct TrainingIndexCalculator {
    config: IndexConfig,
    readiness: ReadinessCalculator,
    load: LoadCalculator,
}

impl TrainingIndexCalculator {
    pub fn new() -> Self {
        TrainingIndexCalculator {
            config: IndexConfig::default(),
            readiness: ReadinessCalculator::new(),
            load: LoadCalculator::new(),
        }
    }

    pub fn with_config(
        config: IndexConfig,
        readiness: ReadinessConfig,
        load: LoadConfig,
    ) -> crate::error::Result<Self> {
        Ok(TrainingIndexCalculator {
            config,
            readiness: ReadinessCalculator::with_config(readiness),
            load: LoadCalculator::with_config(load)?,
        })
    }

    /// Lazy series over `samples`, one point per day
    ///
    /// The iterator borrows the input; calling `series` again restarts from
    /// the first day. The computation is pure, so two passes over the same
    /// samples yield identical output.
    pub fn series<'a>(&'a self, samples: &'a [DailySample]) -> TrainingIndexIter<'a> {
        TrainingIndexIter {
            calculator: self,
            samples,
            pos: 0,
        }
    }

    /// Collect the full series into a vector
    pub fn collect_series(&self, samples: &[DailySample]) -> Vec<TrainingIndexPoint> {
        self.series(samples).collect()
    }

    /// Index value for the day at `pos`, looking only backwards
    fn value_at(&self, samples: &[DailySample], pos: usize) -> Option<TrainingIndexPoint> {
        let day = samples.get(pos)?;
        let visible = &samples[..=pos];

        let readiness = self.readiness.compute(visible, day.date).ok()?;
        let load_ratio = self.load.compute(visible, day.date).ok()?;

        let value = match load_ratio {
            LoadRatio::Ratio(ratio) => {
                // Map the ratio onto 0-100 with 1.0 (neutral) at 50
                let load_component = (ratio * dec!(50)).clamp(Decimal::ZERO, dec!(100));
                let weight_sum = self.config.readiness_weight + self.config.load_weight;
                (self.config.readiness_weight * readiness.score
                    + self.config.load_weight * load_component)
                    / weight_sum
            }
            // No load history: the index degrades to readiness alone
            LoadRatio::Undefined => readiness.score,
        };

        Some(TrainingIndexPoint {
            date: day.date,
            value: value.clamp(Decimal::ZERO, dec!(100)).round_dp(1),
        })
    }

    /// Fit a least-squares line through the series and classify its slope
    ///
    /// Mirrors the trend line a dashboard overlays on the index chart.
    /// Returns `None` for fewer than two points.
    pub fn analyze_trend(&self, points: &[TrainingIndexPoint]) -> Option<TrendAnalysis> {
        if points.len() < 2 {
            return None;
        }

        let xs: Vec<f64> = (0..points.len()).map(|i| i as f64).collect();
        let ys: Vec<f64> = points.iter().filter_map(|p| p.value.to_f64()).collect();
        if ys.len() != points.len() {
            return None;
        }

        let x_mean = xs.iter().mean();
        let y_mean = ys.iter().mean();

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (x, y) in xs.iter().zip(ys.iter()) {
            numerator += (x - x_mean) * (y - y_mean);
            denominator += (x - x_mean) * (x - x_mean);
        }
        if denominator == 0.0 {
            return None;
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        let slope_dec = Decimal::from_f64(slope)?.round_dp(4);
        let threshold = self.config.stable_slope_threshold;
        let direction = if slope_dec > threshold {
            TrendDirection::Increasing
        } else if slope_dec < -threshold {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };

        Some(TrendAnalysis {
            direction,
            slope_per_day: slope_dec,
            intercept: Decimal::from_f64(intercept)?.round_dp(2),
        })
    }
}

impl Default for TrainingIndexCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy iterator over training index points
pub struct TrainingIndexIter<'a> {
    calculator: &'a TrainingIndexCalculator,
    samples: &'a [DailySample],
    pos: usize,
}

impl<'a> Iterator for TrainingIndexIter<'a> {
    type Item = TrainingIndexPoint;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.samples.len() {
            let pos = self.pos;
            self.pos += 1;
            if let Some(point) = self.calculator.value_at(self.samples, pos) {
                return Some(point);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.samples.len() - self.pos))
    }
}

/// Direction of the fitted trend line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    Increasing,
    Stable,
    Decreasing,
}

/// Least-squares trend over the training index series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    /// Classified direction of change
    pub direction: TrendDirection,

    /// Fitted slope in index units per day
    pub slope_per_day: Decimal,

    /// Fitted intercept at the first day of the series
    pub intercept: Decimal,
}
