//! Store-backed operations. Each call loads one tournament, applies a change to a
//! working copy and commits it in one write, or writes nothing.

use crate::logic::{self, BracketCreated, BracketPolicy, ReportOutcome};
use crate::models::{MatchKey, TeamId, Tournament, TournamentError, TournamentId};
use crate::store::TournamentStore;
use rand::Rng;

/// Run `f` on a copy of the tournament and commit it if `f` succeeds and changed it.
///
/// A concurrent writer that touched the same matches makes the commit fail with a
/// retryable storage error; the caller retries the whole call, which then sees
/// the other writer's result. Changes to other matches are merged by the store.
pub fn update<S, T, F>(store: &S, id: TournamentId, f: F) -> Result<(T, Tournament), TournamentError>
where
    S: TournamentStore + ?Sized,
    F: FnOnce(&mut Tournament) -> Result<T, TournamentError>,
{
    let original = store.load(id)?;
    let mut working = original.clone();
    let value = f(&mut working)?;
    if working == original {
        return Ok((value, working));
    }
    let committed = store.commit_changes(&original, &working)?;
    Ok((value, committed))
}

/// Create a tournament record.
pub fn create_tournament<S: TournamentStore + ?Sized>(
    store: &S,
    tournament: Tournament,
) -> Result<Tournament, TournamentError> {
    store.insert(tournament.clone())?;
    log::info!("Created tournament {} ({})", tournament.id, tournament.name);
    Ok(tournament)
}

/// GenerateBracket: build and persist the whole bracket in one commit.
pub fn generate_bracket<S, R>(
    store: &S,
    id: TournamentId,
    approved: &[TeamId],
    policy: &BracketPolicy,
    rng: &mut R,
) -> Result<BracketCreated, TournamentError>
where
    S: TournamentStore + ?Sized,
    R: Rng + ?Sized,
{
    update(store, id, |t| logic::generate_bracket(t, approved, policy, rng)).map(|(created, _)| created)
}

/// ReportMatchResult: complete a match and apply its routing in one commit.
/// A duplicate report writes nothing and returns [`ReportOutcome::NoOp`].
pub fn report_match_result<S: TournamentStore + ?Sized>(
    store: &S,
    id: TournamentId,
    key: MatchKey,
    winner: TeamId,
) -> Result<ReportOutcome, TournamentError> {
    update(store, id, |t| logic::report_match_result(t, key, winner)).map(|(outcome, _)| outcome)
}
