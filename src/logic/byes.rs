//! Bye auto-advance: round-one matches against a bye are decided at generation time.

use crate::logic::progression::{propagate, Propagation};
use crate::logic::topology::RoutingTable;
use crate::models::{Bracket, Match, MatchKey, TournamentError};
use std::collections::BTreeMap;

/// Complete every round-one upper match that has a bye in it and route its teams.
///
/// A team facing a bye advances into round two; its loser slot in the lower
/// bracket is marked as a bye so the lower match can walk over in turn. Two byes
/// forward a bye in both directions. Cascading walkovers are included in the
/// returned list in completion order.
pub fn resolve_byes(
    matches: &mut BTreeMap<MatchKey, Match>,
    routing: &RoutingTable,
) -> Result<Propagation, TournamentError> {
    let round_one: Vec<MatchKey> = matches
        .keys()
        .copied()
        .filter(|k| k.bracket == Bracket::Upper && k.round == 1)
        .collect();

    let mut resolved = Propagation::default();
    for key in round_one {
        let m = matches
            .get_mut(&key)
            .ok_or(TournamentError::BracketCorrupted(key))?;
        if m.is_completed() {
            continue;
        }
        let Some((winner, loser)) = m.walkover_outcome() else {
            continue;
        };
        m.complete(winner.team(), true);
        resolved.walkovers.push(key);

        let cascade = propagate(matches, routing, key, winner, loser)?;
        resolved.walkovers.extend(cascade.walkovers);
        if cascade.champion.is_some() {
            resolved.champion = cascade.champion;
        }
    }
    Ok(resolved)
}
