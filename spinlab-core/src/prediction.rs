//! Prediction: ranked, justified candidates built from every analysis stage.
//!
//! Nominations per axis:
//! - number: hot numbers, members of hot wheel arcs, the longest-streak number
//! - dozen / column: positively trending items, the longest-streak value
//! - section: over-represented wheel sections
//! - half / parity: positively trending items
//!
//! Candidates rank by distinct reason count (descending), then by subject
//! (ascending), and each axis keeps its configured top N. Streak nominations
//! need a run of at least `prediction.min_streak`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bias::BiasReport;
use crate::cluster::ClusterReport;
use crate::config::AnalysisConfig;
use crate::deviation::DeviationRecord;
use crate::outcome::OutcomeSequence;
use crate::pattern::PatternReport;
use crate::trend::TrendReport;
use crate::wheel::{Column, Dozen, Half, Parity, Section};

pub const CONFIDENCE_NOTE: &str = "Predictions are based on statistical analysis of past results \
    and are not guarantees of future outcomes. The more data provided, the more meaningful (but \
    still not certain) the analysis.";

pub const NO_INDICATORS_NOTE: &str = "No strong indicators for specific predictions with current \
    data and thresholds. Consider more spins or adjusting analysis settings.";

pub const NO_DATA_NOTE: &str = "No data provided for analysis, so no predictions can be generated.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Number,
    Dozen,
    Column,
    Section,
    Half,
    Parity,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::Number,
        Axis::Dozen,
        Axis::Column,
        Axis::Section,
        Axis::Half,
        Axis::Parity,
    ];

    fn summary(self) -> &'static str {
        match self {
            Axis::Number => "Prioritizing numbers that are hot or in hot wheel zones.",
            Axis::Dozen => "Suggesting dozens that are trending or show recent streaks.",
            Axis::Column => "Suggesting columns that are trending or show recent streaks.",
            Axis::Section => "Highlighting biased wheel sections (Voisins, Tiers, Orphelins).",
            Axis::Half => "Suggesting halves (1-18/19-36) that are trending.",
            Axis::Parity => "Suggesting Even/Odd bets that are trending.",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Number => "number",
            Axis::Dozen => "dozen",
            Axis::Column => "column",
            Axis::Section => "section",
            Axis::Half => "half",
            Axis::Parity => "parity",
        };
        f.write_str(name)
    }
}

/// The value a candidate nominates. Ordering within an axis is the natural
/// ascending order of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "axis", content = "value", rename_all = "snake_case")]
pub enum Subject {
    Number(u8),
    Dozen(Dozen),
    Column(Column),
    Section(Section),
    Half(Half),
    Parity(Parity),
}

impl Subject {
    pub fn axis(self) -> Axis {
        match self {
            Subject::Number(_) => Axis::Number,
            Subject::Dozen(_) => Axis::Dozen,
            Subject::Column(_) => Axis::Column,
            Subject::Section(_) => Axis::Section,
            Subject::Half(_) => Axis::Half,
            Subject::Parity(_) => Axis::Parity,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Number(n) => write!(f, "{n}"),
            Subject::Dozen(d) => write!(f, "{d}"),
            Subject::Column(c) => write!(f, "{c}"),
            Subject::Section(s) => write!(f, "{s}"),
            Subject::Half(h) => write!(f, "{h}"),
            Subject::Parity(p) => write!(f, "{p}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub axis: Axis,
    pub subject: Subject,
    /// Distinct justifications, in nomination order.
    pub reasons: Vec<String>,
}

impl Candidate {
    pub fn reason_text(&self) -> String {
        self.reasons.join("; ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Every axis is present; an axis without nominations maps to an empty list.
    pub candidates: BTreeMap<Axis, Vec<Candidate>>,
    pub summary: Vec<String>,
    pub confidence_note: String,
}

impl PredictionReport {
    fn empty() -> Self {
        Self {
            candidates: Axis::ALL.iter().map(|&a| (a, Vec::new())).collect(),
            summary: Vec::new(),
            confidence_note: CONFIDENCE_NOTE.to_string(),
        }
    }

    pub fn for_axis(&self, axis: Axis) -> &[Candidate] {
        self.candidates
            .get(&axis)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Predicted numbers, best first.
    pub fn numbers(&self) -> Vec<u8> {
        self.for_axis(Axis::Number)
            .iter()
            .filter_map(|c| match c.subject {
                Subject::Number(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn top_dozen(&self) -> Option<Dozen> {
        self.for_axis(Axis::Dozen).iter().find_map(|c| match c.subject {
            Subject::Dozen(d) => Some(d),
            _ => None,
        })
    }

    pub fn top_column(&self) -> Option<Column> {
        self.for_axis(Axis::Column).iter().find_map(|c| match c.subject {
            Subject::Column(c) => Some(c),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.values().all(Vec::is_empty)
    }
}

/// Stage outputs the engine draws nominations from.
#[derive(Debug, Clone, Copy)]
pub struct PredictionInputs<'a> {
    pub trends: &'a TrendReport,
    pub patterns: &'a PatternReport,
    pub biases: &'a BiasReport,
    pub clusters: &'a ClusterReport,
}

// ─── Nomination ──────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Nominations {
    by_subject: BTreeMap<Subject, Vec<String>>,
}

impl Nominations {
    fn nominate(&mut self, subject: Subject, reason: String) {
        let reasons = self.by_subject.entry(subject).or_default();
        if !reasons.contains(&reason) {
            reasons.push(reason);
        }
    }

    fn ranked(&self, axis: Axis, limit: usize) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = self
            .by_subject
            .iter()
            .filter(|(subject, _)| subject.axis() == axis)
            .map(|(&subject, reasons)| Candidate {
                axis,
                subject,
                reasons: reasons.clone(),
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.reasons
                .len()
                .cmp(&a.reasons.len())
                .then_with(|| a.subject.cmp(&b.subject))
        });
        candidates.truncate(limit);
        candidates
    }
}

fn trending_reason(label: &str, record: &DeviationRecord) -> String {
    format!(
        "Trending {label} (actual: {}, expected: {:.1}, dev: {})",
        record.actual, record.expected, record.percent_deviation
    )
}

fn nominate_trending<K: Copy>(
    nominations: &mut Nominations,
    items: &BTreeMap<K, DeviationRecord>,
    subject: impl Fn(K) -> Subject,
    label: impl Fn(K) -> String,
) {
    for (&key, record) in items {
        if record.percent_deviation.is_above(0.0) {
            nominations.nominate(subject(key), trending_reason(&label(key), record));
        }
    }
}

fn collect(inputs: &PredictionInputs<'_>, min_streak: u32) -> Nominations {
    let mut n = Nominations::default();
    let categories = &inputs.trends.category_trends;

    for hot in &inputs.trends.hot_numbers {
        n.nominate(
            Subject::Number(hot.number),
            format!(
                "Hot number (actual: {}, expected: {:.1})",
                hot.actual, hot.expected
            ),
        );
    }
    for zone in &inputs.clusters.hot_zones {
        for &member in &zone.members {
            n.nominate(
                Subject::Number(member),
                format!(
                    "Part of hot wheel zone centered at {} (arc dev: {})",
                    zone.center, zone.percent_deviation
                ),
            );
        }
    }
    let longest = inputs.patterns.number_repeats.longest;
    if let Some(number) = longest.value_if_at_least(min_streak) {
        n.nominate(
            Subject::Number(number),
            format!("Part of longest recent streak of {}", longest.length),
        );
    }

    nominate_trending(&mut n, &categories.dozens, Subject::Dozen, |_| "dozen".into());
    let dozen_streak = inputs.patterns.dozen_streak;
    if let Some(dozen) = dozen_streak.value_if_at_least(min_streak) {
        n.nominate(
            Subject::Dozen(dozen),
            format!(
                "Recent longest streak of {} for dozen {dozen}",
                dozen_streak.length
            ),
        );
    }

    nominate_trending(&mut n, &categories.columns, Subject::Column, |_| "column".into());
    let column_streak = inputs.patterns.column_streak;
    if let Some(column) = column_streak.value_if_at_least(min_streak) {
        n.nominate(
            Subject::Column(column),
            format!(
                "Recent longest streak of {} for column {column}",
                column_streak.length
            ),
        );
    }

    for section in inputs.biases.over_represented() {
        n.nominate(
            Subject::Section(section.section),
            format!(
                "Over-represented in bias analysis (obs: {}, exp: {:.1}, dev: {})",
                section.observed, section.expected, section.percent_deviation
            ),
        );
    }

    nominate_trending(&mut n, &categories.halves, Subject::Half, |_| "half".into());
    nominate_trending(&mut n, &categories.parities, Subject::Parity, |p| p.to_string());

    n
}

/// Rank nominations from every stage into per-axis candidates.
///
/// An empty history short-circuits: no stage output is read and the report
/// carries only the no-data note.
pub fn generate_predictions(
    inputs: &PredictionInputs<'_>,
    sequence: &OutcomeSequence,
    config: &AnalysisConfig,
) -> PredictionReport {
    let mut report = PredictionReport::empty();
    if sequence.is_empty() {
        report.summary.push(NO_DATA_NOTE.to_string());
        return report;
    }

    let limits = &config.prediction;
    let nominations = collect(inputs, limits.min_streak);
    for axis in Axis::ALL {
        let limit = match axis {
            Axis::Number => limits.max_numbers,
            _ => limits.max_per_category,
        };
        let ranked = nominations.ranked(axis, limit);
        if !ranked.is_empty() {
            report.summary.push(axis.summary().to_string());
        }
        report.candidates.insert(axis, ranked);
    }

    if report.summary.is_empty() {
        report.summary.push(NO_INDICATORS_NOTE.to_string());
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bias::{ChiSquared, SectionBias, SectionStatus};
    use crate::cluster::ArcZone;
    use crate::deviation::PercentDeviation;
    use crate::pattern::{NumberRepeats, StreakRecord};
    use crate::status::StageStatus;
    use crate::trend::{CategoryTrends, NumberTrend};
    use crate::wheel::ArcSize;

    struct Fixture {
        trends: TrendReport,
        patterns: PatternReport,
        biases: BiasReport,
        clusters: ClusterReport,
    }

    impl Fixture {
        fn quiet() -> Self {
            Self {
                trends: TrendReport {
                    status: StageStatus::Complete,
                    message: String::new(),
                    number_deviations: BTreeMap::new(),
                    hot_numbers: Vec::new(),
                    cold_numbers: Vec::new(),
                    category_trends: CategoryTrends::default(),
                },
                patterns: PatternReport {
                    status: StageStatus::Complete,
                    message: String::new(),
                    number_repeats: NumberRepeats::default(),
                    alternating_color_streak: 0,
                    dozen_streak: StreakRecord::default(),
                    column_streak: StreakRecord::default(),
                },
                biases: BiasReport {
                    status: StageStatus::Complete,
                    message: String::new(),
                    chi_squared: ChiSquared::NotPerformed {
                        reason: String::new(),
                    },
                    sections: Vec::new(),
                    interpretation: String::new(),
                },
                clusters: ClusterReport {
                    status: StageStatus::Complete,
                    message: String::new(),
                    arc_size: ArcSize::default(),
                    hot_zones: Vec::new(),
                    cold_zones: Vec::new(),
                },
            }
        }

        fn inputs(&self) -> PredictionInputs<'_> {
            PredictionInputs {
                trends: &self.trends,
                patterns: &self.patterns,
                biases: &self.biases,
                clusters: &self.clusters,
            }
        }
    }

    fn history() -> OutcomeSequence {
        OutcomeSequence::from_numbers([1, 10, 1, 20, 1, 30, 7, 7, 7, 19, 25, 0]).unwrap()
    }

    fn hot(number: u8) -> NumberTrend {
        NumberTrend {
            number,
            actual: 3,
            expected: 0.32,
            percent_deviation: PercentDeviation::Finite(8.25),
        }
    }

    #[test]
    fn empty_history_gives_no_data_note() {
        let fixture = Fixture::quiet();
        let report =
            generate_predictions(&fixture.inputs(), &OutcomeSequence::new(), &AnalysisConfig::default());
        assert_eq!(report.summary, vec![NO_DATA_NOTE.to_string()]);
        assert!(report.is_empty());
        assert_eq!(report.candidates.len(), 6);
        assert_eq!(report.confidence_note, CONFIDENCE_NOTE);
    }

    #[test]
    fn no_nominations_gives_advisory() {
        let fixture = Fixture::quiet();
        let report = generate_predictions(&fixture.inputs(), &history(), &AnalysisConfig::default());
        assert!(report.is_empty());
        assert_eq!(report.summary, vec![NO_INDICATORS_NOTE.to_string()]);
    }

    #[test]
    fn reason_count_then_ascending_subject() {
        let mut fixture = Fixture::quiet();
        fixture.trends.hot_numbers = vec![hot(20), hot(1)];
        fixture.clusters.hot_zones = vec![ArcZone {
            center: 1,
            members: vec![33, 1, 20, 14, 31],
            observed: 9,
            expected: 1.6,
            percent_deviation: PercentDeviation::Finite(0.6),
        }];
        fixture.patterns.number_repeats.longest = StreakRecord {
            value: Some(20),
            length: 3,
        };
        let report = generate_predictions(&fixture.inputs(), &history(), &AnalysisConfig::default());

        // 20: hot + zone + streak; 1: hot + zone; 14, 31, 33: zone only.
        assert_eq!(report.numbers(), vec![20, 1, 14, 31, 33]);
        let top = &report.for_axis(Axis::Number)[0];
        assert_eq!(top.reasons.len(), 3);
        assert_eq!(top.reasons[2], "Part of longest recent streak of 3");
        assert!(top.reasons[1].contains("centered at 1 (arc dev: +60%)"));
        assert_eq!(
            report.summary,
            vec!["Prioritizing numbers that are hot or in hot wheel zones.".to_string()]
        );
    }

    #[test]
    fn number_limit_applies() {
        let mut fixture = Fixture::quiet();
        fixture.trends.hot_numbers = (1..=8).map(hot).collect();
        let mut config = AnalysisConfig::default();
        config.prediction.max_numbers = 3;
        let report = generate_predictions(&fixture.inputs(), &history(), &config);
        assert_eq!(report.numbers(), vec![1, 2, 3]);
    }

    #[test]
    fn short_streak_is_ignored() {
        let mut fixture = Fixture::quiet();
        fixture.patterns.number_repeats.longest = StreakRecord {
            value: Some(7),
            length: 2,
        };
        fixture.patterns.dozen_streak = StreakRecord {
            value: Some(Dozen::Second),
            length: 2,
        };
        let report = generate_predictions(&fixture.inputs(), &history(), &AnalysisConfig::default());
        assert!(report.is_empty());
    }

    #[test]
    fn dozen_trend_and_streak_combine() {
        let mut fixture = Fixture::quiet();
        fixture
            .trends
            .category_trends
            .dozens
            .insert(Dozen::First, DeviationRecord::new(6, 3.8));
        fixture
            .trends
            .category_trends
            .dozens
            .insert(Dozen::Third, DeviationRecord::new(0, 3.8));
        fixture.patterns.dozen_streak = StreakRecord {
            value: Some(Dozen::Second),
            length: 4,
        };
        let report = generate_predictions(&fixture.inputs(), &history(), &AnalysisConfig::default());
        // First (trend) and Second (streak) tie on one reason; First wins.
        assert_eq!(report.top_dozen(), Some(Dozen::First));
        assert_eq!(report.for_axis(Axis::Dozen).len(), 1);
        assert!(report.for_axis(Axis::Dozen)[0].reasons[0].starts_with("Trending dozen"));
    }

    #[test]
    fn sections_halves_and_parity() {
        let mut fixture = Fixture::quiet();
        fixture.biases.sections = vec![
            SectionBias {
                section: Section::Voisins,
                observed: 5,
                expected: 2.5,
                percent_deviation: PercentDeviation::Finite(1.0),
                status: SectionStatus::OverRepresented,
            },
            SectionBias {
                section: Section::Tiers,
                observed: 0,
                expected: 2.0,
                percent_deviation: PercentDeviation::Finite(-1.0),
                status: SectionStatus::UnderRepresented,
            },
        ];
        fixture
            .trends
            .category_trends
            .halves
            .insert(Half::Low, DeviationRecord::new(8, 5.8));
        fixture
            .trends
            .category_trends
            .parities
            .insert(Parity::Odd, DeviationRecord::new(9, 5.8));
        let report = generate_predictions(&fixture.inputs(), &history(), &AnalysisConfig::default());

        let section = &report.for_axis(Axis::Section)[0];
        assert_eq!(section.subject, Subject::Section(Section::Voisins));
        assert_eq!(
            section.reasons[0],
            "Over-represented in bias analysis (obs: 5, exp: 2.5, dev: +100%)"
        );
        assert_eq!(report.for_axis(Axis::Half)[0].subject, Subject::Half(Half::Low));
        assert!(report.for_axis(Axis::Parity)[0].reasons[0].starts_with("Trending odd"));
        assert_eq!(report.summary.len(), 3);
    }

    #[test]
    fn duplicate_reasons_count_once() {
        let mut n = Nominations::default();
        n.nominate(Subject::Number(4), "same".into());
        n.nominate(Subject::Number(4), "same".into());
        n.nominate(Subject::Number(9), "a".into());
        n.nominate(Subject::Number(9), "b".into());
        let ranked = n.ranked(Axis::Number, 5);
        assert_eq!(ranked[0].subject, Subject::Number(9));
        assert_eq!(ranked[1].reasons.len(), 1);
    }

    #[test]
    fn subject_serializes_with_axis_tag() {
        let json = serde_json::to_string(&Subject::Dozen(Dozen::Second)).unwrap();
        assert_eq!(json, r#"{"axis":"dozen","value":"second"}"#);
    }
}
