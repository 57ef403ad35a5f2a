//! Bracket sizing: power-of-two bracket size, bye count and round counts.

use crate::models::{Bracket, MatchKey, TournamentError};
use serde::{Deserialize, Serialize};

/// Largest bracket a tournament may use unless configured otherwise.
pub const DEFAULT_MAX_BRACKET_SIZE: u32 = 64;

/// Limits applied when sizing a bracket.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BracketPolicy {
    /// Power of two, at least 2.
    pub max_bracket_size: u32,
}

impl Default for BracketPolicy {
    fn default() -> Self {
        Self {
            max_bracket_size: DEFAULT_MAX_BRACKET_SIZE,
        }
    }
}

/// Shape of a double-elimination bracket for a power-of-two size.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketLayout {
    pub size: u32,
    pub byes: u32,
    pub upper_rounds: u32,
    /// `2 * (upper_rounds - 1)`; zero for a two-team bracket.
    pub lower_rounds: u32,
}

impl BracketLayout {
    /// Layout for `size` slots of which `byes` are empty. None unless `size` is a
    /// power of two ≥ 2 and at least two slots hold teams.
    pub fn new(size: u32, byes: u32) -> Option<Self> {
        if size < 2 || !size.is_power_of_two() || byes > size - 2 {
            return None;
        }
        let upper_rounds = size.trailing_zeros();
        Some(Self {
            size,
            byes,
            upper_rounds,
            lower_rounds: (upper_rounds - 1) * 2,
        })
    }

    /// Number of matches in a round, or 0 if the round does not exist.
    pub fn matches_in_round(&self, bracket: Bracket, round: u32) -> u32 {
        match bracket {
            Bracket::Upper if (1..=self.upper_rounds).contains(&round) => self.size >> round,
            Bracket::Lower if (1..=self.lower_rounds).contains(&round) => {
                self.size >> (round.div_ceil(2) + 1)
            }
            Bracket::GrandFinal if round == 1 => 1,
            _ => 0,
        }
    }

    pub fn contains(&self, key: MatchKey) -> bool {
        (1..=self.matches_in_round(key.bracket, key.round)).contains(&key.number)
    }

    /// Every match key, upper bracket first, then lower, then the grand final.
    pub fn keys(&self) -> impl Iterator<Item = MatchKey> + '_ {
        let upper = (1..=self.upper_rounds).flat_map(move |r| {
            (1..=self.matches_in_round(Bracket::Upper, r)).map(move |n| MatchKey::upper(r, n))
        });
        let lower = (1..=self.lower_rounds).flat_map(move |r| {
            (1..=self.matches_in_round(Bracket::Lower, r)).map(move |n| MatchKey::lower(r, n))
        });
        upper.chain(lower).chain(std::iter::once(MatchKey::GRAND_FINAL))
    }

    pub fn total_matches(&self) -> usize {
        // upper: size - 1, lower: size - 2, grand final: 1
        (2 * self.size - 2) as usize
    }
}

/// Smallest power-of-two bracket holding `approved` teams, capped by the policy.
pub fn size_bracket(approved: usize, policy: &BracketPolicy) -> Result<BracketLayout, TournamentError> {
    if approved < 2 {
        return Err(TournamentError::NotEnoughTeams { approved });
    }
    let size = u32::try_from(approved)
        .ok()
        .and_then(u32::checked_next_power_of_two)
        .filter(|&size| size <= policy.max_bracket_size)
        .ok_or(TournamentError::TooManyTeams {
            approved,
            max_bracket_size: policy.max_bracket_size,
        })?;
    BracketLayout::new(size, size - approved as u32)
        .ok_or(TournamentError::NotEnoughTeams { approved })
}
