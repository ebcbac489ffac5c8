//! Analysis fingerprinting: deterministic identification of inputs.
//!
//! - `SequenceHash`: BLAKE3 over the raw outcome bytes, in spin order.
//! - `ConfigHash`: BLAKE3 over a fixed binary encoding of an `AnalysisConfig`.
//! - `AnalysisFingerprint`: both hashes plus the spin count. Two reports with
//!   equal fingerprints were computed from identical inputs and are identical.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::outcome::OutcomeSequence;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceHash(pub String);

impl SequenceHash {
    pub fn of(sequence: &OutcomeSequence) -> Self {
        let mut hasher = blake3::Hasher::new();
        // Length prefix keeps distinct histories from colliding on framing.
        hasher.update(&(sequence.len() as u64).to_le_bytes());
        for outcome in sequence {
            hasher.update(&[outcome.value()]);
        }
        Self(hasher.finalize().to_hex().to_string())
    }

    /// First 12 hex characters, for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for SequenceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnalysisFingerprint {
    pub sequence_hash: SequenceHash,
    pub config_hash: ConfigHash,
    pub total_spins: usize,
}
