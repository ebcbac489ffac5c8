//! Outcomes and the append-only spin history they form.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wheel::{topology, Color, Column, Dozen, Half, Parity, Section, POCKETS};

/// Rejected input at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutcomeError {
    #[error("outcome {value} is outside the wheel range 0-36")]
    OutOfRange { value: i64 },

    #[error("outcome at position {position}: {source}")]
    AtPosition {
        position: usize,
        #[source]
        source: Box<OutcomeError>,
    },
}

/// A single spin result, guaranteed to be in 0–36.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Outcome(u8);

impl Outcome {
    pub const ZERO: Outcome = Outcome(0);

    /// Every pocket, in numeric order.
    pub const ALL: [Outcome; POCKETS] = {
        let mut all = [Outcome(0); POCKETS];
        let mut i = 0;
        while i < POCKETS {
            all[i] = Outcome(i as u8);
            i += 1;
        }
        all
    };

    pub fn new(value: i64) -> Result<Self, OutcomeError> {
        if (0..POCKETS as i64).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(OutcomeError::OutOfRange { value })
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn color(self) -> Color {
        topology().color_of(self)
    }

    pub fn dozen(self) -> Option<Dozen> {
        topology().dozen_of(self)
    }

    pub fn column(self) -> Option<Column> {
        topology().column_of(self)
    }

    pub fn half(self) -> Option<Half> {
        topology().half_of(self)
    }

    pub fn parity(self) -> Option<Parity> {
        topology().parity_of(self)
    }

    pub fn section(self) -> Section {
        topology().section_of(self)
    }
}

impl TryFrom<i64> for Outcome {
    type Error = OutcomeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Outcome> for u8 {
    fn from(outcome: Outcome) -> u8 {
        outcome.0
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered spin history. Insertion order is spin order.
///
/// Append-only: outcomes can be pushed or extended but never removed or
/// rewritten, so every analysis sees a consistent prefix of the history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutcomeSequence {
    outcomes: Vec<Outcome>,
}

impl OutcomeSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outcomes(outcomes: Vec<Outcome>) -> Self {
        Self { outcomes }
    }

    /// Validate raw integers into a sequence. The first out-of-range value
    /// fails the whole batch with its position; nothing is coerced.
    pub fn from_numbers<I, N>(numbers: I) -> Result<Self, OutcomeError>
    where
        I: IntoIterator<Item = N>,
        N: Into<i64>,
    {
        let outcomes = numbers
            .into_iter()
            .enumerate()
            .map(|(position, n)| {
                Outcome::new(n.into()).map_err(|e| OutcomeError::AtPosition {
                    position,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { outcomes })
    }

    pub fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    pub fn extend<I: IntoIterator<Item = Outcome>>(&mut self, outcomes: I) {
        self.outcomes.extend(outcomes);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn as_slice(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Outcome> {
        self.outcomes.iter()
    }

    pub fn last(&self) -> Option<Outcome> {
        self.outcomes.last().copied()
    }

    /// The first `len` spins as an independent sequence.
    pub fn prefix(&self, len: usize) -> OutcomeSequence {
        Self {
            outcomes: self.outcomes[..len.min(self.outcomes.len())].to_vec(),
        }
    }

    /// Raw values, in spin order.
    pub fn numbers(&self) -> Vec<u8> {
        self.outcomes.iter().map(|o| o.value()).collect()
    }
}

impl<'a> IntoIterator for &'a OutcomeSequence {
    type Item = &'a Outcome;
    type IntoIter = std::slice::Iter<'a, Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}

impl FromIterator<Outcome> for OutcomeSequence {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_range() {
        assert!(Outcome::new(0).is_ok());
        assert!(Outcome::new(36).is_ok());
        assert_eq!(
            Outcome::new(37),
            Err(OutcomeError::OutOfRange { value: 37 })
        );
        assert_eq!(
            Outcome::new(-1),
            Err(OutcomeError::OutOfRange { value: -1 })
        );
    }

    #[test]
    fn all_is_numeric_order() {
        for (i, o) in Outcome::ALL.iter().enumerate() {
            assert_eq!(o.value() as usize, i);
        }
    }

    #[test]
    fn from_numbers_reports_position() {
        let err = OutcomeSequence::from_numbers([1, 2, 40, 3]).unwrap_err();
        match err {
            OutcomeError::AtPosition { position, source } => {
                assert_eq!(position, 2);
                assert_eq!(*source, OutcomeError::OutOfRange { value: 40 });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sequence_preserves_order() {
        let mut seq = OutcomeSequence::from_numbers([5, 0, 36]).unwrap();
        seq.push(Outcome::new(17).unwrap());
        assert_eq!(seq.numbers(), vec![5, 0, 36, 17]);
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.last(), Some(Outcome::new(17).unwrap()));
        assert_eq!(seq.prefix(2).numbers(), vec![5, 0]);
        assert_eq!(seq.prefix(10).len(), 4);
    }

    #[test]
    fn serde_rejects_out_of_range() {
        let seq: OutcomeSequence = serde_json::from_str("[1, 0, 36]").unwrap();
        assert_eq!(seq.numbers(), vec![1, 0, 36]);
        assert!(serde_json::from_str::<OutcomeSequence>("[1, 37]").is_err());
        assert_eq!(serde_json::to_string(&seq).unwrap(), "[1,0,36]");
    }

    #[test]
    fn convenience_classifiers() {
        let seven = Outcome::new(7).unwrap();
        assert_eq!(seven.color(), Color::Red);
        assert_eq!(seven.dozen(), Some(Dozen::First));
        assert_eq!(seven.column(), Some(Column::First));
        assert_eq!(seven.half(), Some(Half::Low));
        assert_eq!(seven.parity(), Some(Parity::Odd));
        assert_eq!(seven.section(), Section::Voisins);
        assert!(Outcome::ZERO.is_zero());
    }
}
