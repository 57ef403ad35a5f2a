//! Bracket topology: the full match set and its precomputed routing table.

use crate::logic::progression::{route, Routes};
use crate::logic::BracketLayout;
use crate::models::{Match, MatchKey, Slot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Winner and loser destination for every match key of one layout.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingTable(BTreeMap<MatchKey, Routes>);

impl RoutingTable {
    pub fn new(layout: &BracketLayout) -> Self {
        Self(
            layout
                .keys()
                .filter_map(|key| route(layout, key).map(|routes| (key, routes)))
                .collect(),
        )
    }

    pub fn routes(&self, key: MatchKey) -> Option<Routes> {
        self.0.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Create every match of the layout. Round-one upper matches take their slots
/// pairwise from `seeded`; all other matches start empty.
pub fn build_matches(layout: &BracketLayout, seeded: &[Slot]) -> BTreeMap<MatchKey, Match> {
    debug_assert_eq!(seeded.len(), layout.size as usize);
    let mut matches: BTreeMap<MatchKey, Match> =
        layout.keys().map(|key| (key, Match::new(key))).collect();
    for (i, pair) in seeded.chunks_exact(2).enumerate() {
        let key = MatchKey::upper(1, i as u32 + 1);
        matches.insert(key, Match::seeded(key, pair[0], pair[1]));
    }
    matches
}
