//! Wheel topology: the static tables of a single-zero European wheel.
//!
//! - Table classifications: color, dozen, column, half, parity
//! - Physical slot order (clockwise from zero) and its inverse
//! - The three named wheel sections (Voisins du Zéro, Tiers du Cylindre,
//!   Orphelins), which must partition all 37 pockets exactly once
//!
//! `topology()` builds and verifies the tables once per process. A broken
//! partition is a defect in the tables themselves, so it aborts loudly on
//! first access instead of surfacing as a per-call error.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::outcome::Outcome;

/// Number of pockets on a single-zero wheel.
pub const POCKETS: usize = 37;

/// Physical order of the pockets, clockwise starting at zero.
pub const WHEEL_ORDER: [u8; POCKETS] = [
    0, 32, 15, 19, 4, 21, 2, 25, 17, 34, 6, 27, 13, 36, 11, 30, 8, 23, 10, 5, 24, 16, 33, 1, 20,
    14, 31, 9, 22, 18, 29, 7, 28, 12, 35, 3, 26,
];

const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

const VOISINS_NUMBERS: [u8; 17] = [22, 18, 29, 7, 28, 12, 35, 3, 26, 0, 32, 15, 19, 4, 21, 2, 25];
const TIERS_NUMBERS: [u8; 12] = [33, 16, 24, 5, 10, 23, 8, 30, 11, 36, 13, 27];
const ORPHELINS_NUMBERS: [u8; 8] = [17, 34, 6, 1, 20, 14, 31, 9];

const STANDARD_SECTIONS: [(Section, &[u8]); 3] = [
    (Section::Voisins, &VOISINS_NUMBERS),
    (Section::Tiers, &TIERS_NUMBERS),
    (Section::Orphelins, &ORPHELINS_NUMBERS),
];

// ─── Classifications ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Red,
    Black,
    Green,
}

impl Color {
    pub const ALL: [Color; 3] = [Color::Red, Color::Black, Color::Green];
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "red"),
            Color::Black => write!(f, "black"),
            Color::Green => write!(f, "green"),
        }
    }
}

/// 1–12, 13–24, 25–36. Zero belongs to no dozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dozen {
    First,
    Second,
    Third,
}

impl Dozen {
    pub const ALL: [Dozen; 3] = [Dozen::First, Dozen::Second, Dozen::Third];

    pub fn index(self) -> u8 {
        match self {
            Dozen::First => 1,
            Dozen::Second => 2,
            Dozen::Third => 3,
        }
    }
}

impl fmt::Display for Dozen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Table columns: 1, 4, 7, … / 2, 5, 8, … / 3, 6, 9, …
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    First,
    Second,
    Third,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::First, Column::Second, Column::Third];

    pub fn index(self) -> u8 {
        match self {
            Column::First => 1,
            Column::Second => 2,
            Column::Third => 3,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Low (1–18) and high (19–36) halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Half {
    Low,
    High,
}

impl Half {
    pub const ALL: [Half; 2] = [Half::Low, Half::High];
}

impl fmt::Display for Half {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Half::Low => write!(f, "1 (1-18)"),
            Half::High => write!(f, "2 (19-36)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    pub const ALL: [Parity; 2] = [Parity::Even, Parity::Odd];
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::Even => write!(f, "even"),
            Parity::Odd => write!(f, "odd"),
        }
    }
}

/// The three classic wheel sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Voisins,
    Tiers,
    Orphelins,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Voisins, Section::Tiers, Section::Orphelins];

    pub fn name(self) -> &'static str {
        match self {
            Section::Voisins => "Voisins du Zero",
            Section::Tiers => "Tiers du Cylindre",
            Section::Orphelins => "Orphelins",
        }
    }

    pub fn expected_size(self) -> usize {
        match self {
            Section::Voisins => 17,
            Section::Tiers => 12,
            Section::Orphelins => 8,
        }
    }

    fn position(self) -> usize {
        match self {
            Section::Voisins => 0,
            Section::Tiers => 1,
            Section::Orphelins => 2,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─── Arc size ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("arc size {0} must be odd and between 3 and 37")]
pub struct InvalidArcSize(pub usize);

/// Number of physically contiguous pockets in a cluster arc.
///
/// Always odd so the arc has a well-defined center pocket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct ArcSize(usize);

impl ArcSize {
    pub fn new(size: usize) -> Result<Self, InvalidArcSize> {
        if size < 3 || size > POCKETS || size % 2 == 0 {
            return Err(InvalidArcSize(size));
        }
        Ok(Self(size))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Pockets on each side of the center.
    pub fn reach(self) -> usize {
        (self.0 - 1) / 2
    }
}

impl Default for ArcSize {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<usize> for ArcSize {
    type Error = InvalidArcSize;

    fn try_from(size: usize) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl From<ArcSize> for usize {
    fn from(size: ArcSize) -> usize {
        size.0
    }
}

// ─── Topology ────────────────────────────────────────────────────────

/// Integrity violations in the wheel tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("wheel order has {found} slots, expected 37")]
    WrongSlotCount { found: usize },

    #[error("number {number} is outside 0-36")]
    NumberOutOfRange { number: u8 },

    #[error("number {number} occupies more than one wheel slot")]
    DuplicateSlot { number: u8 },

    #[error("section {section} has {found} numbers, expected {expected}")]
    SectionSize {
        section: Section,
        expected: usize,
        found: usize,
    },

    #[error("number {number} belongs to both {first} and {second}")]
    SectionOverlap {
        number: u8,
        first: Section,
        second: Section,
    },

    #[error("number {number} is not covered by any section")]
    UncoveredNumber { number: u8 },
}

/// Verified wheel tables.
#[derive(Debug, Clone)]
pub struct WheelTopology {
    order: [Outcome; POCKETS],
    slots: [usize; POCKETS],
    colors: [Color; POCKETS],
    sections: [Section; POCKETS],
    members: [Vec<Outcome>; 3],
}

impl WheelTopology {
    /// Build the standard single-zero wheel.
    pub fn standard() -> Result<Self, TopologyError> {
        Self::build(&WHEEL_ORDER, &STANDARD_SECTIONS)
    }

    /// Build a topology from a physical order and section lists.
    ///
    /// Fails unless `order` is a permutation of 0–36 and the sections are an
    /// exact, non-overlapping cover of 0–36 with their canonical sizes.
    pub fn build(order: &[u8], sections: &[(Section, &[u8])]) -> Result<Self, TopologyError> {
        if order.len() != POCKETS {
            return Err(TopologyError::WrongSlotCount { found: order.len() });
        }

        let mut slot_of: [Option<usize>; POCKETS] = [None; POCKETS];
        let mut wheel = [Outcome::ZERO; POCKETS];
        for (slot, &number) in order.iter().enumerate() {
            let outcome = checked(number)?;
            if slot_of[number as usize].is_some() {
                return Err(TopologyError::DuplicateSlot { number });
            }
            slot_of[number as usize] = Some(slot);
            wheel[slot] = outcome;
        }
        // A 37-long list of distinct in-range numbers covers every pocket.
        let slots = slot_of.map(|s| s.unwrap_or_default());

        let mut section_of: [Option<Section>; POCKETS] = [None; POCKETS];
        for &(section, numbers) in sections {
            if numbers.len() != section.expected_size() {
                return Err(TopologyError::SectionSize {
                    section,
                    expected: section.expected_size(),
                    found: numbers.len(),
                });
            }
            for &number in numbers {
                checked(number)?;
                if let Some(first) = section_of[number as usize] {
                    return Err(TopologyError::SectionOverlap {
                        number,
                        first,
                        second: section,
                    });
                }
                section_of[number as usize] = Some(section);
            }
        }

        let mut assigned = [Section::Voisins; POCKETS];
        for (number, section) in section_of.iter().enumerate() {
            match section {
                Some(s) => assigned[number] = *s,
                None => {
                    return Err(TopologyError::UncoveredNumber {
                        number: number as u8,
                    })
                }
            }
        }

        // Members are kept in physical order.
        let mut members: [Vec<Outcome>; 3] = Default::default();
        for outcome in wheel {
            members[assigned[outcome.index()].position()].push(outcome);
        }

        let mut colors = [Color::Black; POCKETS];
        colors[0] = Color::Green;
        for n in RED_NUMBERS {
            colors[n as usize] = Color::Red;
        }

        Ok(Self {
            order: wheel,
            slots,
            colors,
            sections: assigned,
            members,
        })
    }

    pub fn color_of(&self, outcome: Outcome) -> Color {
        self.colors[outcome.index()]
    }

    pub fn dozen_of(&self, outcome: Outcome) -> Option<Dozen> {
        match outcome.value() {
            0 => None,
            1..=12 => Some(Dozen::First),
            13..=24 => Some(Dozen::Second),
            _ => Some(Dozen::Third),
        }
    }

    pub fn column_of(&self, outcome: Outcome) -> Option<Column> {
        match outcome.value() {
            0 => None,
            n => Some(Column::ALL[((n - 1) % 3) as usize]),
        }
    }

    pub fn half_of(&self, outcome: Outcome) -> Option<Half> {
        match outcome.value() {
            0 => None,
            1..=18 => Some(Half::Low),
            _ => Some(Half::High),
        }
    }

    pub fn parity_of(&self, outcome: Outcome) -> Option<Parity> {
        match outcome.value() {
            0 => None,
            n if n % 2 == 0 => Some(Parity::Even),
            _ => Some(Parity::Odd),
        }
    }

    /// Pockets in physical order, clockwise from zero.
    pub fn order(&self) -> &[Outcome; POCKETS] {
        &self.order
    }

    /// Physical slot index of a pocket.
    pub fn slot_of(&self, outcome: Outcome) -> usize {
        self.slots[outcome.index()]
    }

    pub fn section_of(&self, outcome: Outcome) -> Section {
        self.sections[outcome.index()]
    }

    /// Section members in physical order.
    pub fn section_members(&self, section: Section) -> &[Outcome] {
        &self.members[section.position()]
    }

    /// The `size` physically contiguous pockets centered on `center_slot`,
    /// wrapping around the zero boundary.
    pub fn arc(&self, center_slot: usize, size: ArcSize) -> Vec<Outcome> {
        let start = center_slot % POCKETS + POCKETS - size.reach();
        (0..size.get())
            .map(|i| self.order[(start + i) % POCKETS])
            .collect()
    }
}

fn checked(number: u8) -> Result<Outcome, TopologyError> {
    Outcome::new(i64::from(number)).map_err(|_| TopologyError::NumberOutOfRange { number })
}

/// The process-wide standard wheel, verified on first access.
///
/// # Panics
///
/// Panics if the static tables fail their partition check.
pub fn topology() -> &'static WheelTopology {
    static TOPOLOGY: OnceLock<WheelTopology> = OnceLock::new();
    TOPOLOGY.get_or_init(|| match WheelTopology::standard() {
        Ok(topology) => topology,
        Err(e) => panic!("wheel topology integrity check failed: {e}"),
    })
}
