//! Order-sensitive streak detection over the raw spin history.
//!
//! Works on the sequence directly rather than on frequency counts:
//! - longest run of one raw number, plus every immediate repeat
//! - longest run of strictly alternating red/black
//! - longest run of one dozen and, independently, of one column
//!
//! Runs are maximal. On equal length the earliest run is kept.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::outcome::OutcomeSequence;
use crate::status::StageStatus;
use crate::wheel::{Color, Column, Dozen};

/// The longest maximal run seen for one projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord<T> {
    pub value: Option<T>,
    pub length: u32,
}

impl<T> Default for StreakRecord<T> {
    fn default() -> Self {
        Self {
            value: None,
            length: 0,
        }
    }
}

impl<T: Copy> StreakRecord<T> {
    /// The value, if its run reaches `min_length`.
    pub fn value_if_at_least(&self, min_length: u32) -> Option<T> {
        if self.length >= min_length {
            self.value
        } else {
            None
        }
    }
}

/// Tracks the current run and the best run so far for one projection.
#[derive(Debug)]
struct RunTracker<T> {
    current: Option<(T, u32)>,
    best: StreakRecord<T>,
}

impl<T: Copy + PartialEq> RunTracker<T> {
    fn new() -> Self {
        Self {
            current: None,
            best: StreakRecord::default(),
        }
    }

    fn observe(&mut self, value: T) {
        if let Some((v, len)) = &mut self.current {
            if *v == value {
                *len += 1;
                return;
            }
        }
        self.close();
        self.current = Some((value, 1));
    }

    /// Close the current run without starting a new one.
    fn reset(&mut self) {
        self.close();
        self.current = None;
    }

    fn close(&mut self) {
        if let Some((value, len)) = self.current {
            // Strictly longer only: ties keep the earlier run.
            if len > self.best.length {
                self.best = StreakRecord {
                    value: Some(value),
                    length: len,
                };
            }
        }
    }

    fn finish(mut self) -> StreakRecord<T> {
        self.close();
        self.best
    }
}

// ─── Report types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRepeats {
    pub longest: StreakRecord<u8>,
    /// Positions i where seq[i] == seq[i-1].
    pub total_immediate_repeats: u32,
    /// Immediate repeats per number.
    pub repeat_counts: BTreeMap<u8, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternReport {
    pub status: StageStatus,
    pub message: String,
    pub number_repeats: NumberRepeats,
    pub alternating_color_streak: u32,
    pub dozen_streak: StreakRecord<Dozen>,
    pub column_streak: StreakRecord<Column>,
}

impl PatternReport {
    pub fn insufficient(required: usize, actual: usize) -> Self {
        Self {
            status: StageStatus::Insufficient { required, actual },
            message: format!(
                "Insufficient data for pattern detection (minimum {required} spins required, got {actual})."
            ),
            number_repeats: NumberRepeats::default(),
            alternating_color_streak: 0,
            dozen_streak: StreakRecord::default(),
            column_streak: StreakRecord::default(),
        }
    }
}

// ─── Detection ───────────────────────────────────────────────────────

fn number_repeats(sequence: &OutcomeSequence) -> NumberRepeats {
    let mut tracker = RunTracker::new();
    let mut total_immediate_repeats = 0;
    let mut repeat_counts = BTreeMap::new();

    let mut previous = None;
    for outcome in sequence {
        if previous == Some(outcome) {
            total_immediate_repeats += 1;
            *repeat_counts.entry(outcome.value()).or_insert(0) += 1;
        }
        tracker.observe(outcome.value());
        previous = Some(outcome);
    }

    NumberRepeats {
        longest: tracker.finish(),
        total_immediate_repeats,
        repeat_counts,
    }
}

/// Longest run of red/black where each outcome differs in color from the
/// one before. A repeated color restarts the run at 1; green ends it and
/// clears the remembered color.
fn alternating_color_streak(sequence: &OutcomeSequence) -> u32 {
    let mut longest = 0;
    let mut current = 0;
    let mut last_color: Option<Color> = None;

    for outcome in sequence {
        match outcome.color() {
            Color::Green => {
                longest = longest.max(current);
                current = 0;
                last_color = None;
            }
            color => {
                if last_color == Some(color) {
                    longest = longest.max(current);
                    current = 1;
                } else {
                    current += 1;
                }
                last_color = Some(color);
            }
        }
    }
    longest.max(current)
}

/// Longest dozen and column runs. Zero closes both runs.
fn table_streaks(sequence: &OutcomeSequence) -> (StreakRecord<Dozen>, StreakRecord<Column>) {
    let mut dozens = RunTracker::new();
    let mut columns = RunTracker::new();

    for outcome in sequence {
        match (outcome.dozen(), outcome.column()) {
            (Some(dozen), Some(column)) => {
                dozens.observe(dozen);
                columns.observe(column);
            }
            _ => {
                dozens.reset();
                columns.reset();
            }
        }
    }
    (dozens.finish(), columns.finish())
}

/// Detect streaks in spin order.
pub fn detect_patterns(sequence: &OutcomeSequence, config: &AnalysisConfig) -> PatternReport {
    let status = config.gates.pattern().classify(sequence.len());
    if let StageStatus::Insufficient { required, actual } = status {
        return PatternReport::insufficient(required, actual);
    }

    let (dozen_streak, column_streak) = table_streaks(sequence);
    PatternReport {
        status,
        message: "Pattern detection complete.".to_string(),
        number_repeats: number_repeats(sequence),
        alternating_color_streak: alternating_color_streak(sequence),
        dozen_streak,
        column_streak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(numbers: &[i64]) -> OutcomeSequence {
        OutcomeSequence::from_numbers(numbers.iter().copied()).unwrap()
    }

    fn patterns_for(numbers: &[i64]) -> PatternReport {
        detect_patterns(&seq(numbers), &AnalysisConfig::default())
    }

    #[test]
    fn alternating_stops_at_zero() {
        let report = patterns_for(&[1, 2, 3, 4, 1, 2, 0, 3, 4]);
        assert_eq!(report.alternating_color_streak, 6);
    }

    #[test]
    fn ten_sevens() {
        let report = patterns_for(&[7; 10]);
        assert_eq!(
            report.number_repeats.longest,
            StreakRecord {
                value: Some(7),
                length: 10
            }
        );
        assert_eq!(report.number_repeats.total_immediate_repeats, 9);
        assert_eq!(report.number_repeats.repeat_counts, BTreeMap::from([(7, 9)]));
        assert_eq!(report.alternating_color_streak, 1);
        assert_eq!(report.dozen_streak.length, 10);
        assert_eq!(report.dozen_streak.value, Some(Dozen::First));
        assert_eq!(report.column_streak.value, Some(Column::First));
    }

    #[test]
    fn below_minimum_is_zeroed() {
        let report = patterns_for(&[7, 7, 7, 7]);
        assert!(report.status.is_insufficient());
        assert_eq!(report.number_repeats, NumberRepeats::default());
        assert_eq!(report.alternating_color_streak, 0);
        assert_eq!(report.dozen_streak, StreakRecord::default());
        assert!(report.message.contains("got 4"));
    }

    #[test]
    fn distinct_outcomes_keep_first_value() {
        let report = patterns_for(&[5, 17, 29, 33, 8]);
        assert_eq!(report.number_repeats.longest.value, Some(5));
        assert_eq!(report.number_repeats.longest.length, 1);
        assert_eq!(report.number_repeats.total_immediate_repeats, 0);
    }

    #[test]
    fn ties_keep_earliest_run() {
        let report = patterns_for(&[4, 4, 9, 9, 20]);
        assert_eq!(report.number_repeats.longest.value, Some(4));
        assert_eq!(report.number_repeats.longest.length, 2);
        assert_eq!(
            report.number_repeats.repeat_counts,
            BTreeMap::from([(4, 1), (9, 1)])
        );
    }

    #[test]
    fn zero_breaks_dozen_and_column_runs() {
        // 1, 2, 3 are dozen 1; the zero splits them.
        let report = patterns_for(&[1, 2, 0, 3, 4, 5, 25]);
        assert_eq!(report.dozen_streak.length, 3);
        assert_eq!(report.dozen_streak.value, Some(Dozen::First));
        // Columns: 1 -> first, 2 -> second, so no column run exceeds 1 except
        // 25 (first) after 5 (second).
        assert_eq!(report.column_streak.length, 1);
        assert_eq!(report.column_streak.value, Some(Column::First));
    }

    #[test]
    fn same_color_restarts_at_one() {
        // R B R R B R B: runs 3, then 4.
        let report = patterns_for(&[1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(report.alternating_color_streak, 4);
    }

    #[test]
    fn threshold_helper() {
        let record = StreakRecord {
            value: Some(Dozen::Second),
            length: 3,
        };
        assert_eq!(record.value_if_at_least(3), Some(Dozen::Second));
        assert_eq!(record.value_if_at_least(4), None);
    }
}
