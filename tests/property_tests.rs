use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use pulseparse::load::LoadCalculator;
use pulseparse::models::{Confidence, DailySample, LoadRatio, ReadinessScore};
use pulseparse::readiness::ReadinessCalculator;
use pulseparse::zones::{ZoneCalculator, MAX_PLAUSIBLE_HR, MIN_PLAUSIBLE_HR};

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .checked_add_days(chrono::Days::new(offset))
        .unwrap()
}

fn samples_from_loads(loads: &[u32]) -> Vec<DailySample> {
    loads
        .iter()
        .enumerate()
        .map(|(i, load)| DailySample {
            date: day(i as u64),
            resting_heart_rate: dec!(60),
            hrv: dec!(70),
            sleep_score: dec!(80),
            training_load: Decimal::from(*load),
        })
        .collect()
}

proptest! {
    /// The load ratio never faults and is undefined exactly when the
    /// chronic-window average is zero
    #[test]
    fn load_ratio_sentinel_iff_zero_chronic(loads in prop::collection::vec(0u32..500, 1..60)) {
        let calculator = LoadCalculator::new();
        let samples = samples_from_loads(&loads);
        let as_of = samples.last().unwrap().date;

        let ratio = calculator.compute(&samples, as_of).unwrap();

        let chronic_start = as_of
            .checked_sub_days(chrono::Days::new(27))
            .unwrap()
            .max(samples[0].date);
        let chronic_sum: u32 = samples
            .iter()
            .filter(|s| s.date >= chronic_start)
            .filter_map(|s| s.training_load.to_u32())
            .sum();

        prop_assert_eq!(ratio.is_undefined(), chronic_sum == 0);
        if let Some(value) = ratio.value() {
            prop_assert!(value >= Decimal::ZERO);
        }
    }

    /// Zone bounds are always ordered and within the plausible range
    #[test]
    fn zone_bounds_ordered_and_clamped(
        score in 0u32..=100,
        ratio_centi in 0u32..400,
        max_hr in 100u16..=220,
        resting_offset in 25u16..=80,
    ) {
        prop_assume!(resting_offset < max_hr);
        let calculator = ZoneCalculator::new();
        let readiness = ReadinessScore {
            score: Decimal::from(score),
            confidence: Confidence::Normal,
        };
        let ratio = LoadRatio::Ratio(Decimal::from(ratio_centi) / dec!(100));

        let zones = calculator
            .all_zones(&readiness, &ratio, max_hr, resting_offset)
            .unwrap();
        for zone in &zones {
            prop_assert!(zone.lower <= zone.upper);
            prop_assert!(zone.lower >= MIN_PLAUSIBLE_HR);
            prop_assert!(zone.upper <= MAX_PLAUSIBLE_HR);
        }

        let target = calculator
            .target_zone(&readiness, &ratio, max_hr, resting_offset)
            .unwrap();
        prop_assert!(target.lower <= target.upper);
    }

    /// Holding the load ratio fixed, a higher readiness never lowers the
    /// target zone's upper bound
    #[test]
    fn target_upper_monotone_in_readiness(
        lower_score in 0u32..100,
        bump in 1u32..=50,
        ratio_centi in 0u32..400,
    ) {
        let higher_score = (lower_score + bump).min(100);
        let calculator = ZoneCalculator::new();
        let ratio = LoadRatio::Ratio(Decimal::from(ratio_centi) / dec!(100));

        let low = calculator
            .target_zone(
                &ReadinessScore {
                    score: Decimal::from(lower_score),
                    confidence: Confidence::Normal,
                },
                &ratio,
                190,
                55,
            )
            .unwrap();
        let high = calculator
            .target_zone(
                &ReadinessScore {
                    score: Decimal::from(higher_score),
                    confidence: Confidence::Normal,
                },
                &ratio,
                190,
                55,
            )
            .unwrap();

        prop_assert!(high.upper >= low.upper);
    }

    /// Readiness always lands in 0-100 and sparse history flags low
    /// confidence instead of failing
    #[test]
    fn readiness_bounded_for_any_history(
        hrvs in prop::collection::vec(0u32..200, 1..40),
    ) {
        let calculator = ReadinessCalculator::new();
        let samples: Vec<DailySample> = hrvs
            .iter()
            .enumerate()
            .map(|(i, hrv)| DailySample {
                date: day(i as u64),
                resting_heart_rate: dec!(60),
                hrv: Decimal::from(*hrv),
                sleep_score: dec!(80),
                training_load: dec!(50),
            })
            .collect();

        let as_of = samples.last().unwrap().date;
        let readiness = calculator.compute(&samples, as_of).unwrap();

        prop_assert!(readiness.score >= Decimal::ZERO);
        prop_assert!(readiness.score <= dec!(100));
        if samples.len() <= 7 {
            prop_assert_eq!(readiness.confidence, Confidence::Low);
        }
    }
}
