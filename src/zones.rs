//! Adaptive heart rate zones
//!
//! Zones are computed with the Karvonen method (percentage of heart rate
//! reserve on top of resting HR) and then adapted by the day's readiness
//! score and acute:chronic ratio:
//!
//! - high readiness nudges the bands upward, low readiness downward;
//! - a load ratio above 1.0 pulls the bands down as fatigue protection;
//! - the combined modifier is clamped so zones never drift to extremes.
//!
//! The target zone picks which band to train in today: harder when fresh,
//! one band more conservative when the load ratio crosses the high-risk
//! threshold. With no load history the choice falls back to readiness
//! alone instead of failing.
//!
//! All bounds are clamped to the plausible 40-220 bpm range and always
//! satisfy `lower <= upper`.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};
use crate::models::{DailySample, HeartRateZone, LoadRatio, ReadinessScore};

/// Plausible heart rate floor in bpm
pub const MIN_PLAUSIBLE_HR: u16 = 40;
/// Plausible heart rate ceiling in bpm
pub const MAX_PLAUSIBLE_HR: u16 = 220;

/// Zone adaptation coefficients
///
/// Exact values are a policy choice, so they are configurable rather than
/// hard-coded. Defaults follow the adaptive Karvonen parameterization:
/// readiness maps to a 0.8-1.2 multiplier, each unit of load ratio above
/// 1.0 subtracts 0.3 from a 1.1 base, and the combined modifier is clamped
/// to [0.925, 1.075].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Readiness modifier at readiness 0 (default: 0.8)
    pub readiness_mod_base: Decimal,

    /// Readiness modifier span from 0 to 100 readiness (default: 0.4)
    pub readiness_mod_span: Decimal,

    /// Load modifier base for a neutral or low ratio (default: 1.1)
    pub acr_mod_base: Decimal,

    /// Load modifier decrease per unit of ratio above 1.0 (default: 0.3)
    pub acr_mod_slope: Decimal,

    /// Lower clamp on the combined modifier (default: 0.925)
    pub modifier_floor: Decimal,

    /// Upper clamp on the combined modifier (default: 1.075)
    pub modifier_ceiling: Decimal,

    /// Load ratio above which the target drops one band (default: 1.5)
    pub high_risk_ratio: Decimal,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        ZoneConfig {
            readiness_mod_base: dec!(0.8),
            readiness_mod_span: dec!(0.4),
            acr_mod_base: dec!(1.1),
            acr_mod_slope: dec!(0.3),
            modifier_floor: dec!(0.925),
            modifier_ceiling: dec!(1.075),
            high_risk_ratio: dec!(1.5),
        }
    }
}

/// Base Karvonen intensity bands as fractions of heart rate reserve
///
/// Zone 1 (recovery) through zone 5 (VO2 max).
fn base_intensities() -> [(Decimal, Decimal); 5] {
    [
        (dec!(0.50), dec!(0.60)),
        (dec!(0.60), dec!(0.70)),
        (dec!(0.70), dec!(0.80)),
        (dec!(0.80), dec!(0.90)),
        (dec!(0.90), dec!(1.00)),
    ]
}

/// Adaptive zone calculator
pub struct ZoneCalculator {
    config: ZoneConfig,
}

impl ZoneCalculator {
    pub fn new() -> Self {
        ZoneCalculator {
            config: ZoneConfig::default(),
        }
    }

    pub fn with_config(config: ZoneConfig) -> Self {
        ZoneCalculator { config }
    }

    /// All five adapted Karvonen zones for today
    pub fn all_zones(
        &self,
        readiness: &ReadinessScore,
        load_ratio: &LoadRatio,
        max_hr: u16,
        resting_hr: u16,
    ) -> Result<Vec<HeartRateZone>> {
        Self::validate_heart_rates(max_hr, resting_hr)?;

        let modifier = self.modifier(readiness, load_ratio);
        let reserve = Decimal::from(max_hr - resting_hr);
        let rest = Decimal::from(resting_hr);

        Ok(base_intensities()
            .into_iter()
            .map(|(low, high)| {
                let adj_low = (low * modifier).min(Decimal::ONE);
                let adj_high = (high * modifier).min(Decimal::ONE);
                let lower = Self::to_bpm(rest + reserve * adj_low);
                let upper = Self::to_bpm(rest + reserve * adj_high);
                HeartRateZone {
                    lower: lower.min(upper),
                    upper,
                }
            })
            .collect())
    }

    /// Target heart rate band for today's training
    ///
    /// Band selection is monotone in readiness: for a fixed load ratio, a
    /// higher readiness never yields a lower band.
    pub fn target_zone(
        &self,
        readiness: &ReadinessScore,
        load_ratio: &LoadRatio,
        max_hr: u16,
        resting_hr: u16,
    ) -> Result<HeartRateZone> {
        let zones = self.all_zones(readiness, load_ratio, max_hr, resting_hr)?;
        let band = self.target_band(readiness, load_ratio);
        Ok(zones[band - 1])
    }

    /// Recommended band number (1-5) before zone bounds are applied
    pub fn target_band(&self, readiness: &ReadinessScore, load_ratio: &LoadRatio) -> usize {
        let band = if readiness.score < dec!(40) {
            1
        } else if readiness.score < dec!(60) {
            2
        } else if readiness.score < dec!(80) {
            3
        } else {
            4
        };

        match load_ratio.value() {
            Some(ratio) if ratio > self.config.high_risk_ratio => band.max(2) - 1,
            _ => band,
        }
    }

    /// Combined readiness/load modifier, clamped to the configured range
    fn modifier(&self, readiness: &ReadinessScore, load_ratio: &LoadRatio) -> Decimal {
        let readiness_frac =
            (readiness.score / dec!(100)).clamp(Decimal::ZERO, Decimal::ONE);
        let readiness_mod =
            self.config.readiness_mod_base + self.config.readiness_mod_span * readiness_frac;

        let acr_mod = match load_ratio.value() {
            Some(ratio) => {
                let excess = (ratio - Decimal::ONE).max(Decimal::ZERO);
                self.config.acr_mod_base - self.config.acr_mod_slope * excess
            }
            // No load history: neutral, readiness drives the band alone
            None => Decimal::ONE,
        };

        (readiness_mod * acr_mod).clamp(self.config.modifier_floor, self.config.modifier_ceiling)
    }

    fn to_bpm(value: Decimal) -> u16 {
        let bpm = value.round().to_u16().unwrap_or(MAX_PLAUSIBLE_HR);
        bpm.clamp(MIN_PLAUSIBLE_HR, MAX_PLAUSIBLE_HR)
    }

    fn validate_heart_rates(max_hr: u16, resting_hr: u16) -> Result<()> {
        if max_hr < 100 || max_hr > MAX_PLAUSIBLE_HR {
            return Err(MetricsError::InvalidParameter {
                parameter: "max_hr".to_string(),
                value: max_hr.to_string(),
                reason: format!("must be between 100 and {} bpm", MAX_PLAUSIBLE_HR),
            });
        }
        if resting_hr < 25 || resting_hr >= max_hr {
            return Err(MetricsError::InvalidParameter {
                parameter: "resting_hr".to_string(),
                value: resting_hr.to_string(),
                reason: "must be at least 25 bpm and below max HR".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ZoneCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Estimate maximum heart rate from age (220 - age formula)
///
/// Estimation is a caller concern; this is a convenience for callers that
/// only know the user's age.
pub fn estimate_max_hr_from_age(age: u8) -> Result<u16> {
    if !(10..=100).contains(&age) {
        return Err(MetricsError::InvalidParameter {
            parameter: "age".to_string(),
            value: age.to_string(),
            reason: "must be between 10 and 100".to_string(),
        });
    }
    Ok(220u16.saturating_sub(age as u16))
}

/// Exponentially weighted resting heart rate over recent samples
///
/// Matches a pandas-style EWM with the given span: alpha = 2 / (span + 1).
/// Returns `None` for an empty slice.
pub fn ewma_resting_hr(samples: &[DailySample], span_days: u16) -> Option<Decimal> {
    if samples.is_empty() || span_days == 0 {
        return None;
    }

    let alpha = dec!(2) / Decimal::from(span_days as u32 + 1);
    let mut ewma = samples[0].resting_heart_rate;
    for sample in &samples[1..] {
        ewma = alpha * sample.resting_heart_rate + (Decimal::ONE - alpha) * ewma;
    }
    Some(ewma)
}
