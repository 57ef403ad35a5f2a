//! Match records: bracket position keys, team slots and match status.

use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Which part of the double-elimination bracket a match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bracket {
    Upper,
    Lower,
    GrandFinal,
}

impl Bracket {
    fn prefix(self) -> &'static str {
        match self {
            Bracket::Upper => "U",
            Bracket::Lower => "L",
            Bracket::GrandFinal => "GF",
        }
    }
}

/// Position of a match in the bracket, 1-indexed.
///
/// The textual form is `U-R{round}-M{number}`, `L-R{round}-M{number}` or `GF-R1-M1`,
/// and parsing it back yields the same key. Keys order upper < lower < grand final,
/// then by round and number.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct MatchKey {
    pub bracket: Bracket,
    pub round: u32,
    pub number: u32,
}

impl MatchKey {
    pub const GRAND_FINAL: MatchKey = MatchKey {
        bracket: Bracket::GrandFinal,
        round: 1,
        number: 1,
    };

    pub fn upper(round: u32, number: u32) -> Self {
        Self {
            bracket: Bracket::Upper,
            round,
            number,
        }
    }

    pub fn lower(round: u32, number: u32) -> Self {
        Self {
            bracket: Bracket::Lower,
            round,
            number,
        }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-R{}-M{}", self.bracket.prefix(), self.round, self.number)
    }
}

/// A string that is not a valid match key.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseMatchKeyError(pub String);

impl fmt::Display for ParseMatchKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid match key '{}'", self.0)
    }
}

impl std::error::Error for ParseMatchKeyError {}

/// Parse `R3` / `M12` style components. Leading zeros and signs are rejected so that
/// every accepted string formats back to itself.
fn parse_index(part: &str, tag: char) -> Option<u32> {
    let digits = part.strip_prefix(tag)?;
    if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl FromStr for MatchKey {
    type Err = ParseMatchKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMatchKeyError(s.to_string());
        let mut parts = s.split('-');
        let (Some(prefix), Some(round), Some(number), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(err());
        };
        let bracket = match prefix {
            "U" => Bracket::Upper,
            "L" => Bracket::Lower,
            "GF" => Bracket::GrandFinal,
            _ => return Err(err()),
        };
        let round = parse_index(round, 'R').ok_or_else(err)?;
        let number = parse_index(number, 'M').ok_or_else(err)?;
        if bracket == Bracket::GrandFinal && (round, number) != (1, 1) {
            return Err(err());
        }
        Ok(Self {
            bracket,
            round,
            number,
        })
    }
}

impl Serialize for MatchKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MatchKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One of the two team positions of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

impl Side {
    /// Odd match numbers feed slot one of the next match, even numbers slot two.
    pub fn by_parity(number: u32) -> Self {
        if number % 2 == 1 {
            Side::One
        } else {
            Side::Two
        }
    }
}

/// Occupant of a match slot.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "team", rename_all = "snake_case")]
pub enum Slot {
    /// Waiting for the result of a feeder match.
    #[default]
    Unfilled,
    /// Permanently empty: no team will ever arrive here.
    Bye,
    Team(TeamId),
}

impl Slot {
    pub fn team(self) -> Option<TeamId> {
        match self {
            Slot::Team(id) => Some(id),
            Slot::Unfilled | Slot::Bye => None,
        }
    }

    pub fn is_unfilled(self) -> bool {
        self == Slot::Unfilled
    }
}

/// Lifecycle of a match. Only `Completed` matters for routing; `Scheduled` and
/// `Live` are informational.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    Scheduled,
    Live,
    Completed,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// A single bracket match between the occupants of two slots.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub key: MatchKey,
    pub status: MatchStatus,
    pub slot_1: Slot,
    pub slot_2: Slot,
    /// None until completed, and stays None for a walkover between two byes.
    pub winner: Option<TeamId>,
    /// True if the match was decided without play.
    pub walkover: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Match {
    /// An empty placeholder match.
    pub fn new(key: MatchKey) -> Self {
        Self::seeded(key, Slot::Unfilled, Slot::Unfilled)
    }

    pub fn seeded(key: MatchKey, slot_1: Slot, slot_2: Slot) -> Self {
        Self {
            key,
            status: MatchStatus::Pending,
            slot_1,
            slot_2,
            winner: None,
            walkover: false,
            completed_at: None,
        }
    }

    pub fn slot(&self, side: Side) -> Slot {
        match side {
            Side::One => self.slot_1,
            Side::Two => self.slot_2,
        }
    }

    pub fn slot_mut(&mut self, side: Side) -> &mut Slot {
        match side {
            Side::One => &mut self.slot_1,
            Side::Two => &mut self.slot_2,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Both teams, if both slots hold a real team.
    pub fn occupants(&self) -> Option<(TeamId, TeamId)> {
        Some((self.slot_1.team()?, self.slot_2.team()?))
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.slot_1 == Slot::Team(team) || self.slot_2 == Slot::Team(team)
    }

    /// The loser of a completed match that was actually played.
    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner?;
        let (a, b) = self.occupants()?;
        Some(if a == winner { b } else { a })
    }

    /// `(winner, loser)` slots if the match can be decided without play: a team
    /// facing a bye advances, two byes forward a bye each way.
    pub fn walkover_outcome(&self) -> Option<(Slot, Slot)> {
        match (self.slot_1, self.slot_2) {
            (Slot::Team(id), Slot::Bye) | (Slot::Bye, Slot::Team(id)) => {
                Some((Slot::Team(id), Slot::Bye))
            }
            (Slot::Bye, Slot::Bye) => Some((Slot::Bye, Slot::Bye)),
            _ => None,
        }
    }

    /// Mark the match completed. Callers check `is_completed` first.
    pub(crate) fn complete(&mut self, winner: Option<TeamId>, walkover: bool) {
        self.status = MatchStatus::Completed;
        self.winner = winner;
        self.walkover = walkover;
        self.completed_at = Some(Utc::now());
    }
}
