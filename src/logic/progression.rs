//! Match progression: where the winner and loser of each match go next.
//!
//! Routing is pure arithmetic on `(bracket, round, number)`:
//!
//! * Upper round `r` winners go to upper `r + 1`, match `ceil(n / 2)`, slot by parity.
//!   The upper final winner takes grand-final slot one.
//! * Upper round 1 losers fill lower round 1 pairwise. Upper round `r > 1` losers
//!   drop into lower round `2(r - 1)`, same match number, slot two.
//! * Odd lower rounds feed the next round one-to-one into slot one, where the team
//!   waits for an upper dropper. Even lower rounds pair up like the upper bracket.
//!   The lower final winner takes grand-final slot two.
//! * Lower and grand-final losers are eliminated.
//!
//! A two-team bracket has no lower bracket; the loser of the single upper match
//! goes straight to grand-final slot two.

use crate::logic::topology::RoutingTable;
use crate::logic::BracketLayout;
use crate::models::{Bracket, Match, MatchKey, Side, Slot, TeamId, TournamentError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Where a team goes after a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    Match { key: MatchKey, side: Side },
    Eliminated,
    Champion,
}

impl Destination {
    fn to(key: MatchKey, side: Side) -> Self {
        Destination::Match { key, side }
    }
}

/// Winner and loser destinations of one match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Routes {
    pub winner: Destination,
    pub loser: Destination,
}

/// Compute the routes of `key`, or None if the key is outside the layout.
pub fn route(layout: &BracketLayout, key: MatchKey) -> Option<Routes> {
    if !layout.contains(key) {
        return None;
    }
    let MatchKey { round, number, .. } = key;
    let halved = number.div_ceil(2);
    let routes = match key.bracket {
        Bracket::Upper => {
            let winner = if round < layout.upper_rounds {
                Destination::to(MatchKey::upper(round + 1, halved), Side::by_parity(number))
            } else {
                Destination::to(MatchKey::GRAND_FINAL, Side::One)
            };
            let loser = if layout.lower_rounds == 0 {
                Destination::to(MatchKey::GRAND_FINAL, Side::Two)
            } else if round == 1 {
                Destination::to(MatchKey::lower(1, halved), Side::by_parity(number))
            } else {
                Destination::to(MatchKey::lower(2 * (round - 1), number), Side::Two)
            };
            Routes { winner, loser }
        }
        Bracket::Lower => {
            let winner = if round == layout.lower_rounds {
                Destination::to(MatchKey::GRAND_FINAL, Side::Two)
            } else if round % 2 == 1 {
                Destination::to(MatchKey::lower(round + 1, number), Side::One)
            } else {
                Destination::to(MatchKey::lower(round + 1, halved), Side::by_parity(number))
            };
            Routes {
                winner,
                loser: Destination::Eliminated,
            }
        }
        Bracket::GrandFinal => Routes {
            winner: Destination::Champion,
            loser: Destination::Eliminated,
        },
    };
    Some(routes)
}

/// Result of pushing one completed match through the bracket.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Propagation {
    /// Matches completed as walkovers along the way, in completion order.
    pub walkovers: Vec<MatchKey>,
    pub champion: Option<TeamId>,
}

/// Place the winner and loser of the already-completed match `key` into their
/// destinations, then complete every walkover this makes possible.
pub(crate) fn propagate(
    matches: &mut BTreeMap<MatchKey, Match>,
    routing: &RoutingTable,
    key: MatchKey,
    winner: Slot,
    loser: Slot,
) -> Result<Propagation, TournamentError> {
    let mut result = Propagation::default();
    let mut queue = VecDeque::from([(key, winner, loser)]);

    while let Some((from, winner, loser)) = queue.pop_front() {
        let routes = routing
            .routes(from)
            .ok_or(TournamentError::BracketCorrupted(from))?;

        for (destination, slot) in [(routes.winner, winner), (routes.loser, loser)] {
            match destination {
                Destination::Match { key: to, side } => {
                    place(matches, from, to, side, slot)?;
                    let next = matches
                        .get_mut(&to)
                        .ok_or(TournamentError::BracketCorrupted(to))?;
                    if next.is_completed() {
                        continue;
                    }
                    if let Some((w, l)) = next.walkover_outcome() {
                        next.complete(w.team(), true);
                        log::debug!("Match {} decided by walkover ({:?})", to, w);
                        result.walkovers.push(to);
                        queue.push_back((to, w, l));
                    }
                }
                Destination::Champion => {
                    result.champion = slot.team();
                }
                Destination::Eliminated => {
                    if let Some(team) = slot.team() {
                        log::debug!("Team {} eliminated in {}", team, from);
                    }
                }
            }
        }
    }
    Ok(result)
}

fn place(
    matches: &mut BTreeMap<MatchKey, Match>,
    from: MatchKey,
    to: MatchKey,
    side: Side,
    slot: Slot,
) -> Result<(), TournamentError> {
    let target = matches
        .get_mut(&to)
        .ok_or(TournamentError::BracketCorrupted(to))?;
    let current = target.slot_mut(side);
    if !current.is_unfilled() {
        return Err(TournamentError::BracketCorrupted(to));
    }
    *current = slot;
    log::debug!("{} -> {} {:?}: {:?}", from, to, side, slot);
    Ok(())
}
