//! Frequency aggregation: occurrence counts per category axis.
//!
//! Maps only hold observed keys. Number and color counts sum to
//! `total_spins`; the dozen, column, half and parity axes exclude zero and sum
//! to `total_spins - zero_count`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::outcome::{Outcome, OutcomeSequence};
use crate::wheel::{topology, Color, Column, Dozen, Half, Parity, Section};

/// Counts per category for one spin history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub total_spins: usize,
    pub numbers: BTreeMap<u8, u32>,
    pub colors: BTreeMap<Color, u32>,
    pub dozens: BTreeMap<Dozen, u32>,
    pub columns: BTreeMap<Column, u32>,
    pub halves: BTreeMap<Half, u32>,
    pub parities: BTreeMap<Parity, u32>,
}

impl FrequencyTable {
    pub fn number_count(&self, outcome: Outcome) -> u32 {
        self.numbers.get(&outcome.value()).copied().unwrap_or(0)
    }

    pub fn color_count(&self, color: Color) -> u32 {
        self.colors.get(&color).copied().unwrap_or(0)
    }

    pub fn dozen_count(&self, dozen: Dozen) -> u32 {
        self.dozens.get(&dozen).copied().unwrap_or(0)
    }

    pub fn column_count(&self, column: Column) -> u32 {
        self.columns.get(&column).copied().unwrap_or(0)
    }

    pub fn half_count(&self, half: Half) -> u32 {
        self.halves.get(&half).copied().unwrap_or(0)
    }

    pub fn parity_count(&self, parity: Parity) -> u32 {
        self.parities.get(&parity).copied().unwrap_or(0)
    }

    pub fn zero_count(&self) -> u32 {
        self.number_count(Outcome::ZERO)
    }

    /// Total hits on the members of a wheel section.
    pub fn section_hits(&self, section: Section) -> u32 {
        topology()
            .section_members(section)
            .iter()
            .map(|&n| self.number_count(n))
            .sum()
    }

    /// Total hits on an arbitrary set of pockets.
    pub fn hits_on(&self, pockets: &[Outcome]) -> u32 {
        pockets.iter().map(|&n| self.number_count(n)).sum()
    }
}

/// Count every outcome along each category axis. Never fails; an empty
/// history yields empty maps and `total_spins == 0`.
pub fn calculate_frequencies(sequence: &OutcomeSequence) -> FrequencyTable {
    let wheel = topology();
    let mut table = FrequencyTable {
        total_spins: sequence.len(),
        ..FrequencyTable::default()
    };

    for &outcome in sequence {
        *table.numbers.entry(outcome.value()).or_insert(0) += 1;
        *table.colors.entry(wheel.color_of(outcome)).or_insert(0) += 1;
        if let Some(dozen) = wheel.dozen_of(outcome) {
            *table.dozens.entry(dozen).or_insert(0) += 1;
        }
        if let Some(column) = wheel.column_of(outcome) {
            *table.columns.entry(column).or_insert(0) += 1;
        }
        if let Some(half) = wheel.half_of(outcome) {
            *table.halves.entry(half).or_insert(0) += 1;
        }
        if let Some(parity) = wheel.parity_of(outcome) {
            *table.parities.entry(parity).or_insert(0) += 1;
        }
    }

    table
}
