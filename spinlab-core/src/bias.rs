//! Bias detection: chi-squared goodness of fit plus wheel-section balance.
//!
//! The chi-squared statistic is summed over the 37 number bins and compared to
//! a fixed critical value (51.0 for df = 36 at p = 0.05 by default). The
//! upper-tail p-value is reported alongside. Small samples still produce a
//! statistic, graded by how many spins each bin is expected to hold.
//!
//! Section balance compares hits on Voisins, Tiers and Orphelins to their
//! share of the wheel and runs even when the chi-squared test cannot.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::deviation::{DeviationRecord, PercentDeviation};
use crate::frequency::FrequencyTable;
use crate::stats::chi_squared_survival;
use crate::status::StageStatus;
use crate::wheel::{Section, POCKETS};

pub const DEGREES_OF_FREEDOM: u32 = POCKETS as u32 - 1;

/// How far the chi-squared approximation can be trusted for a sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    Reliable,
    /// Fewer than 5 expected hits per number.
    Marginal,
    /// Fewer than 1 expected hit per number.
    Unreliable,
}

impl Reliability {
    pub fn grade(expected_per_number: f64) -> Self {
        if expected_per_number < 1.0 {
            Reliability::Unreliable
        } else if expected_per_number < 5.0 {
            Reliability::Marginal
        } else {
            Reliability::Reliable
        }
    }

    fn warning(self, expected_per_number: f64) -> Option<String> {
        match self {
            Reliability::Reliable => None,
            Reliability::Marginal => Some(format!(
                "Warning: Expected frequency per number ({expected_per_number:.2}) is less than 5. \
                 Chi-Squared test results may be less reliable. Consider more spins."
            )),
            Reliability::Unreliable => Some(format!(
                "Critical Warning: Expected frequency per number ({expected_per_number:.2}) is less \
                 than 1. Chi-Squared test is highly unreliable and results should be disregarded. \
                 Substantially more spins are needed."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquaredTest {
    pub statistic: f64,
    pub critical_value: f64,
    pub degrees_of_freedom: u32,
    /// P(X > statistic) under chi-squared(36).
    pub p_value: f64,
    pub suggests_bias: bool,
    pub reliability: Reliability,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChiSquared {
    Performed(ChiSquaredTest),
    NotPerformed { reason: String },
}

impl ChiSquared {
    pub fn test(&self) -> Option<&ChiSquaredTest> {
        match self {
            ChiSquared::Performed(test) => Some(test),
            ChiSquared::NotPerformed { .. } => None,
        }
    }

    pub fn suggests_bias(&self) -> bool {
        self.test().is_some_and(|t| t.suggests_bias)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    OverRepresented,
    UnderRepresented,
    AsExpected,
}

impl fmt::Display for SectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionStatus::OverRepresented => write!(f, "over-represented"),
            SectionStatus::UnderRepresented => write!(f, "under-represented"),
            SectionStatus::AsExpected => write!(f, "as expected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionBias {
    pub section: Section,
    pub observed: u32,
    pub expected: f64,
    pub percent_deviation: PercentDeviation,
    pub status: SectionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasReport {
    pub status: StageStatus,
    pub message: String,
    pub chi_squared: ChiSquared,
    /// In `Section::ALL` order; empty when gated.
    pub sections: Vec<SectionBias>,
    pub interpretation: String,
}

impl BiasReport {
    pub fn insufficient(required: usize, actual: usize) -> Self {
        Self {
            status: StageStatus::Insufficient { required, actual },
            message: format!(
                "Insufficient data for bias detection (minimum {required} spins required, got \
                 {actual}). Chi-Squared test not performed."
            ),
            chi_squared: ChiSquared::NotPerformed {
                reason: "Insufficient data.".to_string(),
            },
            sections: Vec::new(),
            interpretation: "More spins are needed for bias assessment.".to_string(),
        }
    }

    pub fn over_represented(&self) -> impl Iterator<Item = &SectionBias> {
        self.sections
            .iter()
            .filter(|s| s.status == SectionStatus::OverRepresented)
    }

    pub fn any_section_flagged(&self) -> bool {
        self.sections
            .iter()
            .any(|s| s.status != SectionStatus::AsExpected)
    }
}

// ─── Detection ───────────────────────────────────────────────────────

/// Σ (observed − expected)² / expected over all 37 bins. Bins missing from
/// `number_deviations` count as zero observations.
pub fn chi_squared_statistic(
    number_deviations: &BTreeMap<u8, DeviationRecord>,
    expected_per_number: f64,
) -> f64 {
    (0..POCKETS as u8)
        .map(|n| {
            let observed = number_deviations.get(&n).map_or(0.0, |r| f64::from(r.actual));
            let diff = observed - expected_per_number;
            diff * diff / expected_per_number
        })
        .sum()
}

fn run_chi_squared(
    number_deviations: &BTreeMap<u8, DeviationRecord>,
    total_spins: usize,
    critical_value: f64,
) -> ChiSquared {
    let expected = total_spins as f64 / POCKETS as f64;
    let reliability = Reliability::grade(expected);
    let warning = reliability.warning(expected);

    if number_deviations.is_empty() {
        let mut reason = "Chi-Squared test not performed as number deviation data is unavailable."
            .to_string();
        if let Some(w) = warning {
            reason.push(' ');
            reason.push_str(&w);
        }
        return ChiSquared::NotPerformed { reason };
    }

    let statistic = chi_squared_statistic(number_deviations, expected);
    let suggests_bias = statistic > critical_value;
    let mut message = if suggests_bias {
        "Chi-Squared statistic exceeds critical value, suggesting potential number distribution bias."
            .to_string()
    } else {
        "Chi-Squared statistic is within expected limits.".to_string()
    };
    if let Some(w) = warning {
        message.push(' ');
        message.push_str(&w);
    }

    ChiSquared::Performed(ChiSquaredTest {
        statistic,
        critical_value,
        degrees_of_freedom: DEGREES_OF_FREEDOM,
        p_value: chi_squared_survival(statistic, f64::from(DEGREES_OF_FREEDOM)),
        suggests_bias,
        reliability,
        message,
    })
}

fn section_bias(
    frequencies: &FrequencyTable,
    section: Section,
    threshold: f64,
) -> SectionBias {
    let share = section.expected_size() as f64 / POCKETS as f64;
    let record = DeviationRecord::against_probability(
        frequencies.section_hits(section),
        share,
        frequencies.total_spins,
    );
    let status = if record.percent_deviation.is_above(threshold) {
        SectionStatus::OverRepresented
    } else if record.percent_deviation.is_below(-threshold) {
        SectionStatus::UnderRepresented
    } else {
        SectionStatus::AsExpected
    };
    SectionBias {
        section,
        observed: record.actual,
        expected: record.expected,
        percent_deviation: record.percent_deviation,
        status,
    }
}

fn interpret(chi_squared: &ChiSquared, sections_flagged: bool) -> String {
    let Some(test) = chi_squared.test() else {
        return "Sectional bias analysis performed.".to_string();
    };
    let (lead, tail) = match (test.suggests_bias, sections_flagged) {
        (true, true) => (
            "Potential bias suggested by Chi-Squared test.",
            "Sectional analysis also shows imbalances. Further investigation or more data \
             recommended.",
        ),
        (true, false) => (
            "Potential bias suggested by Chi-Squared test.",
            "Sectional analysis does not strongly highlight specific areas, but overall number \
             distribution is suspect.",
        ),
        (false, true) => (
            "No strong evidence of overall bias from Chi-Squared test.",
            "However, some wheel sections show notable deviation, which might warrant closer \
             observation.",
        ),
        (false, false) => (
            "No strong evidence of overall bias from Chi-Squared test.",
            "Sectional distributions also appear relatively balanced.",
        ),
    };
    format!("{lead} {tail}")
}

/// Run the chi-squared test and section balance.
///
/// `number_deviations` is the per-number output of trend detection; when it
/// is empty the chi-squared test is skipped and section balance still runs.
pub fn detect_biases(
    frequencies: &FrequencyTable,
    number_deviations: &BTreeMap<u8, DeviationRecord>,
    config: &AnalysisConfig,
) -> BiasReport {
    let total = frequencies.total_spins;
    let status = config.gates.bias().classify(total);
    if let StageStatus::Insufficient { required, actual } = status {
        return BiasReport::insufficient(required, actual);
    }

    let chi_squared = run_chi_squared(
        number_deviations,
        total,
        config.thresholds.chi_squared_critical,
    );
    let sections: Vec<SectionBias> = Section::ALL
        .iter()
        .map(|&s| section_bias(frequencies, s, config.thresholds.section))
        .collect();
    let flagged = sections.iter().any(|s| s.status != SectionStatus::AsExpected);

    let (message, interpretation) = match status {
        StageStatus::LowConfidence { spins } => (
            format!(
                "Bias detection performed. However, with only {spins} spins, these results \
                 (especially Chi-Squared) have very low statistical reliability. Interpret with \
                 extreme caution."
            ),
            format!("Results based on a very small dataset ({spins} spins)."),
        ),
        _ => (
            "Bias detection performed.".to_string(),
            interpret(&chi_squared, flagged),
        ),
    };

    BiasReport {
        status,
        message,
        chi_squared,
        sections,
        interpretation,
    }
}
