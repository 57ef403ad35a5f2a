//! Bracket operations: generate the double-elimination bracket and report match results.

use crate::logic::byes::resolve_byes;
use crate::logic::progression::{propagate, Destination};
use crate::logic::seeding::seed_round_one;
use crate::logic::sizing::{size_bracket, BracketPolicy};
use crate::logic::topology::{build_matches, RoutingTable};
use crate::models::{
    MatchKey, MatchStatus, Slot, TeamId, Tournament, TournamentError, TournamentStatus,
};
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

/// Summary of a freshly generated bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketCreated {
    pub bracket_size: u32,
    pub byes: u32,
    pub matches: usize,
    /// Matches already decided by walkover, in completion order.
    pub walkovers: Vec<MatchKey>,
}

/// What happened to a reported result.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReportOutcome {
    Advanced(Advancement),
    /// The match was already completed; nothing changed.
    NoOp,
}

/// Routing applied for one reported match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Advancement {
    pub key: MatchKey,
    pub winner: TeamId,
    pub loser: TeamId,
    pub winner_destination: Destination,
    pub loser_destination: Destination,
    /// Matches decided by walkover as a consequence of this result.
    pub walkovers: Vec<MatchKey>,
    /// Set when this result decided the grand final.
    pub champion: Option<TeamId>,
}

fn validate_team_list(tournament: &Tournament, approved: &[TeamId]) -> Result<(), TournamentError> {
    let mut seen = HashSet::with_capacity(approved.len());
    for &id in approved {
        if !seen.insert(id) {
            return Err(TournamentError::DuplicateTeam(id));
        }
        let team = tournament
            .team(id)
            .ok_or(TournamentError::TeamNotFound(id))?;
        if !team.is_approved() {
            return Err(TournamentError::TeamNotApproved(id));
        }
    }
    Ok(())
}

/// Build the bracket for `approved` teams (RegistrationClosed only) and move the
/// tournament to Ongoing.
///
/// 1. Size the bracket to the next power of two; the rest are byes.
/// 2. Shuffle teams and byes into round one using `rng`.
/// 3. Create every upper, lower and grand-final match.
/// 4. Walk over round-one byes.
///
/// Nothing is changed on error.
pub fn generate_bracket<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    approved: &[TeamId],
    policy: &BracketPolicy,
    rng: &mut R,
) -> Result<BracketCreated, TournamentError> {
    if tournament.status != TournamentStatus::RegistrationClosed {
        return Err(TournamentError::InvalidState {
            status: tournament.status,
        });
    }
    validate_team_list(tournament, approved)?;
    let layout = size_bracket(approved.len(), policy)?;
    if !tournament.allow_byes && approved.len() != tournament.max_participants as usize {
        return Err(TournamentError::QuotaNotFull {
            approved: approved.len(),
            required: tournament.max_participants,
        });
    }

    let seeded = seed_round_one(approved, layout.byes, rng);
    let routing = RoutingTable::new(&layout);
    let mut matches = build_matches(&layout, &seeded);
    let resolved = resolve_byes(&mut matches, &routing)?;

    if layout.byes > 0 {
        tournament.max_participants = layout.size;
    }
    tournament.layout = Some(layout);
    tournament.routing = Some(routing);
    tournament.matches = matches;
    tournament.status = TournamentStatus::Ongoing;
    if let Some(champion) = resolved.champion {
        tournament.champion = Some(champion);
        tournament.status = TournamentStatus::Completed;
    }
    tournament.touch();

    log::info!(
        "Generated bracket for tournament {}: {} teams, size {}, {} byes, {} walkovers",
        tournament.id,
        approved.len(),
        layout.size,
        layout.byes,
        resolved.walkovers.len()
    );

    Ok(BracketCreated {
        bracket_size: layout.size,
        byes: layout.byes,
        matches: tournament.matches.len(),
        walkovers: resolved.walkovers,
    })
}

/// Record `winner` for match `key` and route both teams onward (Ongoing only).
///
/// Reporting a match that is already completed is a no-op, whichever winner is
/// given, so retried requests are harmless. Winning the grand final completes the
/// tournament. Nothing is changed on error.
pub fn report_match_result(
    tournament: &mut Tournament,
    key: MatchKey,
    winner: TeamId,
) -> Result<ReportOutcome, TournamentError> {
    if !matches!(
        tournament.status,
        TournamentStatus::Ongoing | TournamentStatus::Completed
    ) {
        return Err(TournamentError::InvalidState {
            status: tournament.status,
        });
    }
    let routing = tournament
        .routing
        .as_ref()
        .ok_or(TournamentError::InvalidState {
            status: tournament.status,
        })?;
    let m = tournament
        .matches
        .get(&key)
        .ok_or(TournamentError::MatchNotFound(key))?;

    if m.is_completed() {
        if m.winner == Some(winner) {
            log::info!("Duplicate result for {} in tournament {} ignored", key, tournament.id);
        } else {
            log::warn!(
                "Conflicting result for completed match {} in tournament {} ignored (recorded winner {:?}, reported {})",
                key,
                tournament.id,
                m.winner,
                winner
            );
        }
        return Ok(ReportOutcome::NoOp);
    }

    let (a, b) = m.occupants().ok_or(TournamentError::MatchNotReady(key))?;
    let loser = if winner == a {
        b
    } else if winner == b {
        a
    } else {
        return Err(TournamentError::NotAParticipant { key, team: winner });
    };
    let routes = routing
        .routes(key)
        .ok_or(TournamentError::BracketCorrupted(key))?;

    // Work on a copy so a routing failure leaves the bracket untouched.
    let mut matches = tournament.matches.clone();
    if let Some(m) = matches.get_mut(&key) {
        m.complete(Some(winner), false);
    }
    let propagation = propagate(
        &mut matches,
        routing,
        key,
        Slot::Team(winner),
        Slot::Team(loser),
    )?;
    tournament.matches = matches;

    if let Some(champion) = propagation.champion {
        tournament.champion = Some(champion);
        tournament.status = TournamentStatus::Completed;
        log::info!("Tournament {} completed, champion {}", tournament.id, champion);
    }
    tournament.touch();

    Ok(ReportOutcome::Advanced(Advancement {
        key,
        winner,
        loser,
        winner_destination: routes.winner,
        loser_destination: routes.loser,
        walkovers: propagation.walkovers,
        champion: propagation.champion,
    }))
}

/// Mark a match as scheduled or live (Ongoing only). Informational; routing ignores it.
pub fn set_match_status(
    tournament: &mut Tournament,
    key: MatchKey,
    status: MatchStatus,
) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::Ongoing {
        return Err(TournamentError::InvalidState {
            status: tournament.status,
        });
    }
    let m = tournament
        .matches
        .get_mut(&key)
        .ok_or(TournamentError::MatchNotFound(key))?;
    if m.is_completed() || !matches!(status, MatchStatus::Scheduled | MatchStatus::Live) {
        return Err(TournamentError::InvalidMatchStatus { key, status });
    }
    if m.occupants().is_none() {
        return Err(TournamentError::MatchNotReady(key));
    }
    m.status = status;
    tournament.touch();
    Ok(())
}
