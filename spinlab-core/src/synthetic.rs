//! Seeded synthetic spin generators for demos, benches and tests.
//!
//! The same seed always yields the same history.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::outcome::{Outcome, OutcomeSequence};
use crate::wheel::POCKETS;

fn uniform_outcome(rng: &mut StdRng) -> Outcome {
    Outcome::ALL[rng.gen_range(0..POCKETS)]
}

/// `count` spins from a fair wheel.
pub fn uniform_spins(seed: u64, count: usize) -> OutcomeSequence {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| uniform_outcome(&mut rng)).collect()
}

/// `count` spins where each spin lands on one of `favored` with probability
/// `bias`, and on a fair-wheel pocket otherwise. `bias` is clamped to [0, 1];
/// an empty `favored` list degrades to a fair wheel.
pub fn biased_spins(seed: u64, count: usize, favored: &[Outcome], bias: f64) -> OutcomeSequence {
    let mut rng = StdRng::seed_from_u64(seed);
    let bias = if bias.is_finite() { bias.clamp(0.0, 1.0) } else { 0.0 };
    (0..count)
        .map(|_| {
            if rng.gen_bool(bias) {
                if let Some(&pick) = favored.choose(&mut rng) {
                    return pick;
                }
            }
            uniform_outcome(&mut rng)
        })
        .collect()
}
