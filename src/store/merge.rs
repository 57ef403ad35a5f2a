//! Rebasing a change onto a record that moved on since it was loaded.
//!
//! Conflicts are detected per match field: two writers may touch the same match
//! as long as they set different fields, like the two winners of neighbouring
//! matches filling both slots of their next match.

use crate::models::{Match, Tournament};
use crate::store::StoreError;

/// Apply the difference between `base` and `working` on top of `stored`.
///
/// Fails with [`StoreError::Conflict`] if anything outside the matches changed
/// on either side since `base` (the update time excepted), if both sides changed
/// the same match field, or if the merge would leave a bye match undecided.
pub(crate) fn rebase(
    stored: &Tournament,
    base: &Tournament,
    working: &Tournament,
) -> Result<Tournament, StoreError> {
    let conflict = || StoreError::Conflict {
        id: base.id,
        expected: base.version,
        found: stored.version,
    };

    if !same_header(stored, base) {
        return Err(conflict());
    }
    if working.matches.len() != base.matches.len() || stored.matches.len() != base.matches.len() {
        return Err(conflict());
    }

    let mut merged = working.clone();
    merged.matches = stored.matches.clone();
    merged.updated_at = working.updated_at.max(stored.updated_at);
    merged.version = stored.version;

    for (key, ours) in &working.matches {
        let (Some(before), Some(theirs)) = (base.matches.get(key), stored.matches.get(key)) else {
            return Err(conflict());
        };
        if ours == before {
            continue;
        }
        let m = merge_match(before, ours, theirs).ok_or_else(conflict)?;
        log::debug!("Merged concurrent change to {} in tournament {}", key, base.id);
        merged.matches.insert(*key, m);
    }
    Ok(merged)
}

/// Everything except the matches, the update time and the version.
fn same_header(a: &Tournament, b: &Tournament) -> bool {
    a.id == b.id
        && a.name == b.name
        && a.status == b.status
        && a.max_participants == b.max_participants
        && a.allow_byes == b.allow_byes
        && a.teams == b.teams
        && a.layout == b.layout
        && a.routing == b.routing
        && a.champion == b.champion
        && a.created_at == b.created_at
}

fn pick<T: Copy + PartialEq>(before: T, ours: T, theirs: T) -> Option<T> {
    if ours == before {
        Some(theirs)
    } else if theirs == before {
        Some(ours)
    } else {
        None
    }
}

fn merge_match(before: &Match, ours: &Match, theirs: &Match) -> Option<Match> {
    let merged = Match {
        key: before.key,
        status: pick(before.status, ours.status, theirs.status)?,
        slot_1: pick(before.slot_1, ours.slot_1, theirs.slot_1)?,
        slot_2: pick(before.slot_2, ours.slot_2, theirs.slot_2)?,
        winner: pick(before.winner, ours.winner, theirs.winner)?,
        walkover: pick(before.walkover, ours.walkover, theirs.walkover)?,
        completed_at: pick(before.completed_at, ours.completed_at, theirs.completed_at)?,
    };
    // Neither writer saw both slots, so neither could have decided the walkover.
    if !merged.is_completed() && merged.walkover_outcome().is_some() {
        return None;
    }
    Some(merged)
}
