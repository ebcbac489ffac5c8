//! Trend detection: observed counts against fair-wheel expectations.
//!
//! Every number 0–36 gets a deviation record, observed or not. A number is
//! hot when its percent deviation is above the hot threshold; it is cold only
//! when the deviation is below the negated threshold *and* it actually fell
//! short of its expectation. Category items (color, dozen, column, half,
//! parity) are flagged when the magnitude of their deviation exceeds the
//! category threshold.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::deviation::{DeviationRecord, PercentDeviation};
use crate::frequency::FrequencyTable;
use crate::outcome::Outcome;
use crate::status::StageStatus;
use crate::wheel::{Color, Column, Dozen, Half, Parity, POCKETS};

// ─── Fair-wheel probabilities ────────────────────────────────────────

pub const NUMBER_PROBABILITY: f64 = 1.0 / POCKETS as f64;
pub const EVEN_MONEY_PROBABILITY: f64 = 18.0 / POCKETS as f64;
pub const TWELVE_PROBABILITY: f64 = 12.0 / POCKETS as f64;

pub fn color_probability(color: Color) -> f64 {
    match color {
        Color::Red | Color::Black => EVEN_MONEY_PROBABILITY,
        Color::Green => NUMBER_PROBABILITY,
    }
}

// ─── Report types ────────────────────────────────────────────────────

/// A flagged number with its counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumberTrend {
    pub number: u8,
    pub actual: u32,
    pub expected: f64,
    pub percent_deviation: PercentDeviation,
}

/// Flagged items per category axis. Only items past the category threshold
/// appear.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTrends {
    pub colors: BTreeMap<Color, DeviationRecord>,
    pub dozens: BTreeMap<Dozen, DeviationRecord>,
    pub columns: BTreeMap<Column, DeviationRecord>,
    pub halves: BTreeMap<Half, DeviationRecord>,
    pub parities: BTreeMap<Parity, DeviationRecord>,
}

impl CategoryTrends {
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
            && self.dozens.is_empty()
            && self.columns.is_empty()
            && self.halves.is_empty()
            && self.parities.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub status: StageStatus,
    pub message: String,
    /// One record per number 0–36 once the stage has run; empty when gated.
    pub number_deviations: BTreeMap<u8, DeviationRecord>,
    pub hot_numbers: Vec<NumberTrend>,
    pub cold_numbers: Vec<NumberTrend>,
    pub category_trends: CategoryTrends,
}

impl TrendReport {
    /// The report for a history below the stage minimum.
    pub fn insufficient(required: usize, actual: usize) -> Self {
        Self {
            status: StageStatus::Insufficient { required, actual },
            message: format!(
                "Insufficient data for trend analysis (minimum {required} spins required, got {actual})."
            ),
            number_deviations: BTreeMap::new(),
            hot_numbers: Vec::new(),
            cold_numbers: Vec::new(),
            category_trends: CategoryTrends::default(),
        }
    }

    pub fn has_trends(&self) -> bool {
        !self.hot_numbers.is_empty()
            || !self.cold_numbers.is_empty()
            || !self.category_trends.is_empty()
    }
}

// ─── Detection ───────────────────────────────────────────────────────

fn flag_items<K, I>(
    items: I,
    count: impl Fn(K) -> u32,
    probability: impl Fn(K) -> f64,
    total_spins: usize,
    threshold: f64,
) -> BTreeMap<K, DeviationRecord>
where
    K: Copy + Ord,
    I: IntoIterator<Item = K>,
{
    items
        .into_iter()
        .map(|k| {
            (
                k,
                DeviationRecord::against_probability(count(k), probability(k), total_spins),
            )
        })
        .filter(|(_, record)| record.percent_deviation.magnitude_exceeds(threshold))
        .collect()
}

/// Compare observed counts against fair-wheel expectations.
pub fn identify_trends(frequencies: &FrequencyTable, config: &AnalysisConfig) -> TrendReport {
    let total = frequencies.total_spins;
    let status = config.gates.trend().classify(total);
    if let StageStatus::Insufficient { required, actual } = status {
        return TrendReport::insufficient(required, actual);
    }

    let hot = config.thresholds.hot_number;
    let mut number_deviations = BTreeMap::new();
    let mut hot_numbers = Vec::new();
    let mut cold_numbers = Vec::new();

    for outcome in Outcome::ALL {
        let record = DeviationRecord::against_probability(
            frequencies.number_count(outcome),
            NUMBER_PROBABILITY,
            total,
        );
        let trend = NumberTrend {
            number: outcome.value(),
            actual: record.actual,
            expected: record.expected,
            percent_deviation: record.percent_deviation,
        };
        let shortfall = f64::from(record.actual) < record.expected;
        if record.percent_deviation.is_above(hot) {
            hot_numbers.push(trend);
        } else if record.percent_deviation.is_below(-hot) && shortfall {
            cold_numbers.push(trend);
        }
        number_deviations.insert(outcome.value(), record);
    }

    let threshold = config.thresholds.category;
    let category_trends = CategoryTrends {
        colors: flag_items(
            Color::ALL,
            |c| frequencies.color_count(c),
            color_probability,
            total,
            threshold,
        ),
        dozens: flag_items(
            Dozen::ALL,
            |d| frequencies.dozen_count(d),
            |_| TWELVE_PROBABILITY,
            total,
            threshold,
        ),
        columns: flag_items(
            Column::ALL,
            |c| frequencies.column_count(c),
            |_| TWELVE_PROBABILITY,
            total,
            threshold,
        ),
        halves: flag_items(
            Half::ALL,
            |h| frequencies.half_count(h),
            |_| EVEN_MONEY_PROBABILITY,
            total,
            threshold,
        ),
        parities: flag_items(
            Parity::ALL,
            |p| frequencies.parity_count(p),
            |_| EVEN_MONEY_PROBABILITY,
            total,
            threshold,
        ),
    };

    let mut report = TrendReport {
        status,
        message: String::new(),
        number_deviations,
        hot_numbers,
        cold_numbers,
        category_trends,
    };
    report.message = match status {
        StageStatus::LowConfidence { spins } => format!(
            "Trend analysis performed, but results are based on a very small dataset ({spins} spins) \
             and may not be statistically significant. Interpret with extreme caution."
        ),
        _ if report.has_trends() => {
            "Trend analysis complete. Significant trends identified.".to_string()
        }
        _ => "Trend analysis performed. No significant trends identified with current \
              thresholds and data."
            .to_string(),
    };
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::calculate_frequencies;
    use crate::outcome::OutcomeSequence;

    fn trends_for(numbers: &[i64]) -> TrendReport {
        let seq = OutcomeSequence::from_numbers(numbers.iter().copied()).unwrap();
        identify_trends(&calculate_frequencies(&seq), &AnalysisConfig::default())
    }

    #[test]
    fn four_spins_is_insufficient() {
        let report = trends_for(&[1, 2, 3, 4]);
        assert_eq!(
            report.status,
            StageStatus::Insufficient {
                required: 5,
                actual: 4
            }
        );
        assert!(report.number_deviations.is_empty());
        assert!(report.hot_numbers.is_empty());
        assert!(report.cold_numbers.is_empty());
        assert!(report.category_trends.is_empty());
        assert!(report.message.contains("minimum 5 spins required, got 4"));
    }

    #[test]
    fn all_numbers_get_a_record() {
        let report = trends_for(&[7, 7, 7, 7, 7]);
        assert_eq!(report.number_deviations.len(), 37);
        assert_eq!(report.number_deviations[&7].actual, 5);
        assert_eq!(report.number_deviations[&8].actual, 0);
    }

    #[test]
    fn small_sample_marks_unobserved_numbers_cold() {
        // expected per number is 10/37 < 1; unobserved numbers are at -100%
        // and therefore cold, observed ones are hot.
        let report = trends_for(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert!(report.status.is_low_confidence());
        assert_eq!(report.hot_numbers.len(), 10);
        assert_eq!(report.cold_numbers.len(), 27);
        assert!(report.message.contains("very small dataset (10 spins)"));
    }

    #[test]
    fn uniform_history_has_no_number_trends() {
        let numbers: Vec<i64> = (0..37).chain(0..37).collect();
        let report = trends_for(&numbers);
        assert_eq!(report.status, StageStatus::Complete);
        assert!(report.hot_numbers.is_empty());
        assert!(report.cold_numbers.is_empty());
        for record in report.number_deviations.values() {
            assert_eq!(record.actual, 2);
            assert!((record.expected - 2.0).abs() < 1e-9);
        }
        // green: expected 2, actual 2 -> not flagged.
        assert!(report.category_trends.colors.is_empty());
        assert!(report.category_trends.dozens.is_empty());
        assert!(report.message.contains("No significant trends"));
    }

    #[test]
    fn dominant_number_is_hot_and_dozen_flagged() {
        let mut numbers: Vec<i64> = (0..37).collect();
        numbers.extend(std::iter::repeat(7).take(20));
        let report = trends_for(&numbers);
        assert_eq!(report.hot_numbers.len(), 1);
        assert_eq!(report.hot_numbers[0].number, 7);
        assert_eq!(report.hot_numbers[0].actual, 21);
        let first = report.category_trends.dozens[&Dozen::First];
        assert!(first.percent_deviation.is_above(0.25));
        assert!(report.message.contains("Significant trends identified"));
    }

    #[test]
    fn cold_requires_shortfall() {
        // 37 spins, number 0 never appears: expected 1, actual 0, -100%.
        let numbers: Vec<i64> = (1..37).chain([1]).collect();
        let report = trends_for(&numbers);
        assert!(report.cold_numbers.iter().any(|t| t.number == 0));
        assert!(report.category_trends.colors.contains_key(&Color::Green));
    }
}
