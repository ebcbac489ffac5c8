//! Rolling feature windows for an external next-spin classifier.
//!
//! Each window pairs the previous `w` outcomes with the outcome that followed
//! them. Labels use the dozen of the next outcome, with 0 standing for zero.

use serde::{Deserialize, Serialize};

use crate::outcome::{Outcome, OutcomeSequence};

pub const DEFAULT_WINDOW_SIZE: usize = 5;

/// Fewer windows than this are too few to train on.
pub const MIN_TRAINING_WINDOWS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureWindow {
    pub features: Vec<u8>,
    pub next: u8,
    pub dozen_label: u8,
}

/// 0 for zero, otherwise the dozen index 1–3.
pub fn dozen_label(outcome: Outcome) -> u8 {
    outcome.dozen().map_or(0, |d| d.index())
}

/// Every (previous `window` outcomes → next outcome) pair, oldest first.
/// Empty when the history is not longer than the window or the window is 0.
pub fn extract_windows(sequence: &OutcomeSequence, window: usize) -> Vec<FeatureWindow> {
    if window == 0 || sequence.len() <= window {
        return Vec::new();
    }
    sequence
        .as_slice()
        .windows(window + 1)
        .map(|w| {
            let (features, next) = w.split_at(window);
            let next = next[0];
            FeatureWindow {
                features: features.iter().map(|o| o.value()).collect(),
                next: next.value(),
                dozen_label: dozen_label(next),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(numbers: &[i64]) -> OutcomeSequence {
        OutcomeSequence::from_numbers(numbers.iter().copied()).unwrap()
    }

    #[test]
    fn windows_slide_by_one() {
        let windows = extract_windows(&seq(&[1, 2, 3, 4, 5]), 3);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].features, vec![1, 2, 3]);
        assert_eq!(windows[0].next, 4);
        assert_eq!(windows[1].features, vec![2, 3, 4]);
        assert_eq!(windows[1].next, 5);
    }

    #[test]
    fn too_short_history_is_empty() {
        assert!(extract_windows(&seq(&[1, 2, 3]), 3).is_empty());
        assert!(extract_windows(&OutcomeSequence::new(), 3).is_empty());
        assert!(extract_windows(&seq(&[1, 2, 3]), 0).is_empty());
    }

    #[test]
    fn labels_follow_dozens() {
        let windows = extract_windows(&seq(&[10, 20, 5, 0, 15, 30, 0, 13]), 5);
        let labels: Vec<u8> = windows.iter().map(|w| w.dozen_label).collect();
        // next outcomes: 30, 0, 13
        assert_eq!(labels, vec![3, 0, 2]);
    }
}
