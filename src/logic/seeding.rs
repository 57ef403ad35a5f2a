//! Round-one seeding: uniform random placement of teams and byes.

use crate::models::{Slot, TeamId};
use rand::seq::SliceRandom;
use rand::Rng;

/// Shuffle `teams` plus `byes` bye placeholders into round-one order.
///
/// Positions `(2i, 2i + 1)` become match `U-R1-M(i + 1)`. Every permutation is
/// equally likely; there is no seeding by strength.
pub fn seed_round_one<R: Rng + ?Sized>(teams: &[TeamId], byes: u32, rng: &mut R) -> Vec<Slot> {
    let mut slots: Vec<Slot> = teams
        .iter()
        .copied()
        .map(Slot::Team)
        .chain(std::iter::repeat(Slot::Bye).take(byes as usize))
        .collect();
    slots.shuffle(rng);
    slots
}
