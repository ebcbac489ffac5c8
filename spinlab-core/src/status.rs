//! Sample-size gating shared by every analysis stage.
//!
//! Each stage checks its own minimum and reports the outcome as data: a stage
//! with too few spins returns a well-formed `Insufficient` report instead of
//! raising.

use serde::{Deserialize, Serialize};

/// How much a stage's results can be trusted, given the sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageStatus {
    /// Below the stage minimum: results are empty.
    Insufficient { required: usize, actual: usize },
    /// Computed, but on a small sample.
    LowConfidence { spins: usize },
    Complete,
}

impl StageStatus {
    pub fn is_insufficient(&self) -> bool {
        matches!(self, StageStatus::Insufficient { .. })
    }

    pub fn is_low_confidence(&self) -> bool {
        matches!(self, StageStatus::LowConfidence { .. })
    }
}

/// Minimum and advisory sample sizes for one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gate {
    pub min_spins: usize,
    pub low_confidence_spins: usize,
}

impl Gate {
    pub fn new(min_spins: usize, low_confidence_spins: usize) -> Self {
        Self {
            min_spins,
            low_confidence_spins,
        }
    }

    /// A gate with no advisory band.
    pub fn minimum_only(min_spins: usize) -> Self {
        Self::new(min_spins, min_spins)
    }

    pub fn classify(&self, spins: usize) -> StageStatus {
        if spins < self.min_spins {
            StageStatus::Insufficient {
                required: self.min_spins,
                actual: spins,
            }
        } else if spins < self.low_confidence_spins {
            StageStatus::LowConfidence { spins }
        } else {
            StageStatus::Complete
        }
    }
}
