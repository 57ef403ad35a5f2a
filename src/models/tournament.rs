//! Tournament, TournamentStatus and TournamentError.

use crate::logic::{BracketLayout, RoutingTable};
use crate::models::game::{Bracket, Match, MatchKey, MatchStatus};
use crate::models::team::{normalize_clan_tag, Team, TeamId, TeamStats, TeamStatus};
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Broad class of a [`TournamentError`], used to pick a response status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Wrong status, quota or malformed input. Nothing was changed.
    Precondition,
    /// Unknown match or team. Nothing was changed.
    Referential,
    /// The store rejected or failed the commit. Safe to retry the whole operation.
    Storage,
    /// The stored bracket contradicts its own topology.
    Internal,
}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// Tournament is not in a state that allows this action.
    InvalidState { status: TournamentStatus },
    /// Fewer than two approved teams.
    NotEnoughTeams { approved: usize },
    /// More approved teams than the largest allowed bracket.
    TooManyTeams { approved: usize, max_bracket_size: u32 },
    /// Byes are disabled and the approved count does not match the target.
    QuotaNotFull { approved: usize, required: u32 },
    /// The approved count already reached the participant target.
    QuotaFull { max_participants: u32 },
    /// Participant target below two, or not a power of two when byes are disabled.
    InvalidParticipantTarget(u32),
    /// The same team was passed twice to bracket generation.
    DuplicateTeam(TeamId),
    /// A team with this name already exists (names are unique, case-insensitive).
    DuplicateTeamName,
    /// Team name is empty.
    InvalidTeamName,
    /// Clan tag is not `#` followed by 3 to 12 characters of `0-9A-Z`.
    InvalidClanTag(String),
    /// Team is pending or rejected.
    TeamNotApproved(TeamId),
    /// Team not found in this tournament.
    TeamNotFound(TeamId),
    /// Match not found in this tournament's bracket.
    MatchNotFound(MatchKey),
    /// A match slot is still waiting for a feeder result.
    MatchNotReady(MatchKey),
    /// The reported winner does not play in the match.
    NotAParticipant { key: MatchKey, team: TeamId },
    /// Requested match status change is not allowed.
    InvalidMatchStatus { key: MatchKey, status: MatchStatus },
    /// Routing tried to fill an occupied slot or reach a missing match.
    BracketCorrupted(MatchKey),
    /// The record store failed; the operation can be retried.
    Storage(StoreError),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            InvalidState { .. }
            | NotEnoughTeams { .. }
            | TooManyTeams { .. }
            | QuotaNotFull { .. }
            | QuotaFull { .. }
            | InvalidParticipantTarget(_)
            | DuplicateTeam(_)
            | DuplicateTeamName
            | InvalidTeamName
            | InvalidClanTag(_)
            | TeamNotApproved(_)
            | MatchNotReady(_)
            | InvalidMatchStatus { .. } => ErrorKind::Precondition,
            TeamNotFound(_) | MatchNotFound(_) | NotAParticipant { .. } => ErrorKind::Referential,
            Storage(StoreError::NotFound(_)) => ErrorKind::Referential,
            Storage(StoreError::AlreadyExists(_)) => ErrorKind::Precondition,
            Storage(_) => ErrorKind::Storage,
            BracketCorrupted(_) => ErrorKind::Internal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Storage
    }
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidState { status } => {
                write!(f, "Action not allowed while tournament is {}", status)
            }
            TournamentError::NotEnoughTeams { approved } => {
                write!(f, "Need at least 2 approved teams (have {})", approved)
            }
            TournamentError::TooManyTeams {
                approved,
                max_bracket_size,
            } => write!(
                f,
                "{} approved teams exceed the maximum bracket size of {}",
                approved, max_bracket_size
            ),
            TournamentError::QuotaNotFull { approved, required } => {
                write!(f, "Need exactly {} approved teams (have {})", required, approved)
            }
            TournamentError::QuotaFull { max_participants } => {
                write!(f, "All {} participant places are taken", max_participants)
            }
            TournamentError::InvalidParticipantTarget(n) => {
                write!(f, "Invalid participant target {}", n)
            }
            TournamentError::DuplicateTeam(id) => write!(f, "Team {} listed more than once", id),
            TournamentError::DuplicateTeamName => write!(f, "A team with this name already exists"),
            TournamentError::InvalidTeamName => write!(f, "Team name must not be empty"),
            TournamentError::InvalidClanTag(tag) => write!(f, "Invalid clan tag '{}'", tag),
            TournamentError::TeamNotApproved(id) => write!(f, "Team {} is not approved", id),
            TournamentError::TeamNotFound(id) => write!(f, "Team {} not found", id),
            TournamentError::MatchNotFound(key) => write!(f, "Match {} not found", key),
            TournamentError::MatchNotReady(key) => {
                write!(f, "Match {} is still waiting for its teams", key)
            }
            TournamentError::NotAParticipant { key, team } => {
                write!(f, "Team {} does not play in match {}", team, key)
            }
            TournamentError::InvalidMatchStatus { key, status } => {
                write!(f, "Match {} cannot be set to {}", key, status)
            }
            TournamentError::BracketCorrupted(key) => {
                write!(f, "Bracket routing is inconsistent at match {}", key)
            }
            TournamentError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for TournamentError {}

impl From<StoreError> for TournamentError {
    fn from(e: StoreError) -> Self {
        TournamentError::Storage(e)
    }
}

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Current phase of the tournament.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Created, registration not yet open.
    #[default]
    Draft,
    RegistrationOpen,
    /// Team list is frozen; the bracket can be generated.
    RegistrationClosed,
    /// Bracket generated; results are being reported.
    Ongoing,
    /// Grand final decided.
    Completed,
    Cancelled,
}

impl TournamentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TournamentStatus::Completed | TournamentStatus::Cancelled)
    }
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::RegistrationOpen => "registration_open",
            TournamentStatus::RegistrationClosed => "registration_closed",
            TournamentStatus::Ongoing => "ongoing",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Full tournament record: registered teams, bracket, and phase.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    /// Participant-count target; raised to the bracket size when byes are used.
    pub max_participants: u32,
    /// If false, the bracket needs exactly `max_participants` approved teams.
    pub allow_byes: bool,
    pub teams: Vec<Team>,
    /// Set once, when the bracket is generated.
    pub layout: Option<BracketLayout>,
    /// Winner/loser destination of every match, computed with the layout.
    pub routing: Option<RoutingTable>,
    pub matches: BTreeMap<MatchKey, Match>,
    pub champion: Option<TeamId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped by the store on every commit.
    pub version: u64,
}

impl Tournament {
    /// Create a tournament in Draft state with no teams.
    pub fn new(
        name: impl Into<String>,
        max_participants: u32,
        allow_byes: bool,
    ) -> Result<Self, TournamentError> {
        if max_participants < 2 || (!allow_byes && !max_participants.is_power_of_two()) {
            return Err(TournamentError::InvalidParticipantTarget(max_participants));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: TournamentStatus::Draft,
            max_participants,
            allow_byes,
            teams: Vec::new(),
            layout: None,
            routing: None,
            matches: BTreeMap::new(),
            champion: None,
            created_at: now,
            updated_at: now,
            version: 0,
        })
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    fn team_mut(&mut self, id: TeamId) -> Result<&mut Team, TournamentError> {
        self.teams
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TournamentError::TeamNotFound(id))
    }

    pub fn get_match(&self, key: MatchKey) -> Option<&Match> {
        self.matches.get(&key)
    }

    /// Ids of approved teams in registration order (the Team Registry contract).
    pub fn approved_team_ids(&self) -> Vec<TeamId> {
        self.teams
            .iter()
            .filter(|t| t.is_approved())
            .map(|t| t.id)
            .collect()
    }

    fn require_registration_open(&self) -> Result<(), TournamentError> {
        if self.status != TournamentStatus::RegistrationOpen {
            return Err(TournamentError::InvalidState {
                status: self.status,
            });
        }
        Ok(())
    }

    /// Register a team (RegistrationOpen only). Returns the new team's id.
    pub fn register_team(
        &mut self,
        name: impl Into<String>,
        clan_tag: &str,
    ) -> Result<TeamId, TournamentError> {
        self.require_registration_open()?;
        let name = name.into();
        let name_trimmed = name.trim();
        if name_trimmed.is_empty() {
            return Err(TournamentError::InvalidTeamName);
        }
        let is_duplicate = self
            .teams
            .iter()
            .any(|t| t.name.eq_ignore_ascii_case(name_trimmed));
        if is_duplicate {
            return Err(TournamentError::DuplicateTeamName);
        }
        let tag = normalize_clan_tag(clan_tag)
            .ok_or_else(|| TournamentError::InvalidClanTag(clan_tag.to_string()))?;
        let team = Team::new(name_trimmed, tag);
        let id = team.id;
        self.teams.push(team);
        self.touch();
        Ok(id)
    }

    /// Remove a team while registration is open.
    pub fn withdraw_team(&mut self, team_id: TeamId) -> Result<(), TournamentError> {
        self.require_registration_open()?;
        let idx = self
            .teams
            .iter()
            .position(|t| t.id == team_id)
            .ok_or(TournamentError::TeamNotFound(team_id))?;
        self.teams.remove(idx);
        self.touch();
        Ok(())
    }

    /// Approve a pending team. Refused once the participant target is reached.
    pub fn approve_team(&mut self, team_id: TeamId) -> Result<(), TournamentError> {
        self.require_registration_open()?;
        let approved = self.teams.iter().filter(|t| t.is_approved()).count();
        let max_participants = self.max_participants;
        let team = self.team_mut(team_id)?;
        if team.status == TeamStatus::Approved {
            return Ok(());
        }
        if approved >= max_participants as usize {
            return Err(TournamentError::QuotaFull { max_participants });
        }
        team.status = TeamStatus::Approved;
        self.touch();
        Ok(())
    }

    /// Reject a team; an approved team gives its place back.
    pub fn reject_team(&mut self, team_id: TeamId) -> Result<(), TournamentError> {
        self.require_registration_open()?;
        self.team_mut(team_id)?.status = TeamStatus::Rejected;
        self.touch();
        Ok(())
    }

    /// Cancel from any non-terminal status. Completed matches are kept as they are.
    pub fn cancel(&mut self) -> Result<(), TournamentError> {
        if self.status.is_terminal() {
            return Err(TournamentError::InvalidState {
                status: self.status,
            });
        }
        self.status = TournamentStatus::Cancelled;
        self.touch();
        log::info!("Tournament {} cancelled", self.id);
        Ok(())
    }

    /// Wins, losses and elimination of a team, derived from completed matches.
    /// A loss in the lower bracket or the grand final eliminates.
    pub fn team_stats(&self, team_id: TeamId) -> Result<TeamStats, TournamentError> {
        if self.team(team_id).is_none() {
            return Err(TournamentError::TeamNotFound(team_id));
        }
        let mut stats = TeamStats::default();
        for m in self.matches.values().filter(|m| m.is_completed() && m.involves(team_id)) {
            if m.winner == Some(team_id) {
                if m.walkover {
                    stats.walkovers += 1;
                } else {
                    stats.wins += 1;
                }
            } else if m.loser() == Some(team_id) {
                stats.losses += 1;
                if m.key.bracket != Bracket::Upper {
                    stats.eliminated = true;
                }
            }
        }
        Ok(stats)
    }
}
