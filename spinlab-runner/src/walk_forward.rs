//! Walk-forward evaluation: how often past predictions matched the next spin.
//!
//! For every prefix length `p` in `[warmup, n)` the history `seq[..p]` is
//! analyzed and its predictions are checked against `seq[p]`. Prefixes are
//! independent, so they run on a rayon pool; results are collected in prefix
//! order and are identical to a serial run.
//!
//! Purely descriptive: hit rates are reported next to the hit rate a blind
//! guess of the same size would have on a fair wheel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use spinlab_core::wheel::{Column, Dozen, POCKETS};
use spinlab_core::{analyze, AnalysisConfig, Outcome, OutcomeSequence};

// ─── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkForwardConfig {
    /// Spins analyzed before the first prediction is scored.
    pub warmup: usize,
    /// Evaluate prefixes on the rayon pool.
    pub parallel: bool,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            warmup: 20,
            parallel: true,
        }
    }
}

// ─── Result types ────────────────────────────────────────────────────

/// Predictions made from `seq[..index]` and the spin that followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub index: usize,
    pub actual: Outcome,
    pub predicted_numbers: Vec<u8>,
    pub predicted_dozen: Option<Dozen>,
    pub predicted_column: Option<Column>,
}

impl StepResult {
    pub fn number_hit(&self) -> bool {
        self.predicted_numbers.contains(&self.actual.value())
    }

    pub fn dozen_hit(&self) -> bool {
        self.predicted_dozen.is_some() && self.predicted_dozen == self.actual.dozen()
    }

    pub fn column_hit(&self) -> bool {
        self.predicted_column.is_some() && self.predicted_column == self.actual.column()
    }
}

/// Hit statistics for one prediction axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScore {
    /// Steps where the axis produced a prediction.
    pub predictions: usize,
    pub hits: usize,
    /// `hits / predictions`; `None` when nothing was predicted.
    pub hit_rate: Option<f64>,
    /// Expected hit rate of a blind guess of the same size.
    pub baseline_rate: Option<f64>,
}

impl AxisScore {
    fn from_steps(outcomes: impl Iterator<Item = (bool, f64)>) -> Self {
        let mut predictions = 0;
        let mut hits = 0;
        let mut coverage = 0.0;
        for (hit, covered) in outcomes {
            predictions += 1;
            coverage += covered;
            if hit {
                hits += 1;
            }
        }
        let rate = |x: f64| (predictions > 0).then(|| x / predictions as f64);
        Self {
            predictions,
            hits,
            hit_rate: rate(hits as f64),
            baseline_rate: rate(coverage),
        }
    }

    /// Hit rate minus baseline.
    pub fn edge(&self) -> Option<f64> {
        Some(self.hit_rate? - self.baseline_rate?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardResult {
    pub warmup: usize,
    pub steps: Vec<StepResult>,
    pub numbers: AxisScore,
    pub dozens: AxisScore,
    pub columns: AxisScore,
}

#[derive(Debug, Error)]
pub enum WalkForwardError {
    #[error("insufficient data: {total_spins} spins, need more than warmup {warmup}")]
    InsufficientData { total_spins: usize, warmup: usize },

    #[error("warmup must be at least 1")]
    ZeroWarmup,
}

// ─── Evaluation ──────────────────────────────────────────────────────

fn evaluate_step(sequence: &OutcomeSequence, index: usize, config: &AnalysisConfig) -> StepResult {
    let report = analyze(&sequence.prefix(index), config);
    let actual = sequence.as_slice()[index];
    StepResult {
        index,
        actual,
        predicted_numbers: report.predictions.numbers(),
        predicted_dozen: report.predictions.top_dozen(),
        predicted_column: report.predictions.top_column(),
    }
}

fn summarize(warmup: usize, steps: Vec<StepResult>) -> WalkForwardResult {
    let twelve = 12.0 / POCKETS as f64;
    let numbers = AxisScore::from_steps(
        steps
            .iter()
            .filter(|s| !s.predicted_numbers.is_empty())
            .map(|s| (s.number_hit(), s.predicted_numbers.len() as f64 / POCKETS as f64)),
    );
    let dozens = AxisScore::from_steps(
        steps
            .iter()
            .filter(|s| s.predicted_dozen.is_some())
            .map(|s| (s.dozen_hit(), twelve)),
    );
    let columns = AxisScore::from_steps(
        steps
            .iter()
            .filter(|s| s.predicted_column.is_some())
            .map(|s| (s.column_hit(), twelve)),
    );
    WalkForwardResult {
        warmup,
        steps,
        numbers,
        dozens,
        columns,
    }
}

/// Score predictions against the spin that followed each prefix.
pub fn run_walk_forward(
    sequence: &OutcomeSequence,
    analysis: &AnalysisConfig,
    config: &WalkForwardConfig,
) -> Result<WalkForwardResult, WalkForwardError> {
    if config.warmup == 0 {
        return Err(WalkForwardError::ZeroWarmup);
    }
    let total_spins = sequence.len();
    if total_spins <= config.warmup {
        return Err(WalkForwardError::InsufficientData {
            total_spins,
            warmup: config.warmup,
        });
    }

    let steps: Vec<StepResult> = if config.parallel {
        (config.warmup..total_spins)
            .into_par_iter()
            .map(|index| evaluate_step(sequence, index, analysis))
            .collect()
    } else {
        (config.warmup..total_spins)
            .map(|index| evaluate_step(sequence, index, analysis))
            .collect()
    };

    let result = summarize(config.warmup, steps);
    info!(
        steps = result.steps.len(),
        number_hits = result.numbers.hits,
        dozen_hits = result.dozens.hits,
        column_hits = result.columns.hits,
        "walk-forward complete"
    );
    Ok(result)
}
