//! Observed-versus-expected deviation records.
//!
//! Percent deviation is `(actual - expected) / expected`. When the expected
//! count is zero the ratio is degenerate: it is reported as the explicit
//! `Undefined` sentinel if something was observed anyway, and as a plain zero
//! if nothing was expected and nothing happened.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relative deviation from an expected count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentDeviation {
    Finite(f64),
    /// Observations against an expectation of zero.
    Undefined,
}

impl PercentDeviation {
    pub fn compute(actual: f64, expected: f64) -> Self {
        if expected > 0.0 {
            PercentDeviation::Finite((actual - expected) / expected)
        } else if actual > 0.0 {
            PercentDeviation::Undefined
        } else {
            PercentDeviation::Finite(0.0)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            PercentDeviation::Finite(v) => Some(v),
            PercentDeviation::Undefined => None,
        }
    }

    pub fn is_undefined(self) -> bool {
        matches!(self, PercentDeviation::Undefined)
    }

    /// Strictly above `threshold`. `Undefined` only arises from a positive
    /// observation over a zero expectation, so it is above every threshold.
    pub fn is_above(self, threshold: f64) -> bool {
        match self {
            PercentDeviation::Finite(v) => v > threshold,
            PercentDeviation::Undefined => true,
        }
    }

    /// Strictly below `threshold`. Never true for `Undefined`.
    pub fn is_below(self, threshold: f64) -> bool {
        match self {
            PercentDeviation::Finite(v) => v < threshold,
            PercentDeviation::Undefined => false,
        }
    }

    /// `|deviation| > threshold`.
    pub fn magnitude_exceeds(self, threshold: f64) -> bool {
        match self {
            PercentDeviation::Finite(v) => v.abs() > threshold,
            PercentDeviation::Undefined => true,
        }
    }
}

impl fmt::Display for PercentDeviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentDeviation::Finite(v) => write!(f, "{:+.0}%", v * 100.0),
            PercentDeviation::Undefined => write!(f, "undefined"),
        }
    }
}

/// Actual vs expected count for one category item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviationRecord {
    pub actual: u32,
    pub expected: f64,
    pub deviation: f64,
    pub percent_deviation: PercentDeviation,
}

impl DeviationRecord {
    pub fn new(actual: u32, expected: f64) -> Self {
        let observed = f64::from(actual);
        Self {
            actual,
            expected,
            deviation: observed - expected,
            percent_deviation: PercentDeviation::compute(observed, expected),
        }
    }

    /// Expected count for an event of `probability` over `total_spins`.
    pub fn against_probability(actual: u32, probability: f64, total_spins: usize) -> Self {
        Self::new(actual, probability * total_spins as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_ratio() {
        let r = DeviationRecord::new(6, 4.0);
        assert_eq!(r.deviation, 2.0);
        assert_eq!(r.percent_deviation, PercentDeviation::Finite(0.5));
    }

    #[test]
    fn zero_expectation_sentinels() {
        assert_eq!(
            PercentDeviation::compute(3.0, 0.0),
            PercentDeviation::Undefined
        );
        assert_eq!(
            PercentDeviation::compute(0.0, 0.0),
            PercentDeviation::Finite(0.0)
        );
        assert_ne!(PercentDeviation::Undefined, PercentDeviation::Finite(0.0));
    }

    #[test]
    fn threshold_comparisons() {
        let hot = PercentDeviation::Finite(0.6);
        assert!(hot.is_above(0.5));
        assert!(!hot.is_below(-0.5));
        assert!(hot.magnitude_exceeds(0.25));

        let cold = PercentDeviation::Finite(-1.0);
        assert!(cold.is_below(-0.5));
        assert!(cold.magnitude_exceeds(0.25));

        let undefined = PercentDeviation::Undefined;
        assert!(undefined.is_above(0.5));
        assert!(!undefined.is_below(-0.5));
        assert!(undefined.magnitude_exceeds(0.25));
    }

    #[test]
    fn sentinel_serializes_as_tag() {
        let json = serde_json::to_string(&PercentDeviation::Undefined).unwrap();
        assert_eq!(json, "\"undefined\"");
        let json = serde_json::to_string(&PercentDeviation::Finite(0.25)).unwrap();
        assert_eq!(json, "{\"finite\":0.25}");
    }

    #[test]
    fn display() {
        assert_eq!(PercentDeviation::Finite(0.574).to_string(), "+57%");
        assert_eq!(PercentDeviation::Finite(-1.0).to_string(), "-100%");
        assert_eq!(PercentDeviation::Undefined.to_string(), "undefined");
    }
}
