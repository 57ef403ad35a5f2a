//! Data structures for the clan tournament: teams, matches, tournament state.

mod game;
mod team;
mod tournament;

pub use game::{Bracket, Match, MatchKey, MatchStatus, ParseMatchKeyError, Side, Slot};
pub use team::{normalize_clan_tag, Team, TeamId, TeamStats, TeamStatus};
pub use tournament::{ErrorKind, Tournament, TournamentError, TournamentId, TournamentStatus};
