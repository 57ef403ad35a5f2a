//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use clan_bracket_web::logic::{
    build_matches, close_registration, open_registration, report_match_result, resolve_byes,
    BracketLayout, ReportOutcome, RoutingTable,
};
use clan_bracket_web::{Match, MatchKey, Slot, TeamId, Tournament, TournamentStatus};
use rand::Rng;

/// A tournament with `n` approved teams and registration closed, ready for a bracket.
pub fn closed_tournament(n: usize) -> (Tournament, Vec<TeamId>) {
    let mut t = Tournament::new("Clan Cup", n.max(2) as u32, true).unwrap();
    open_registration(&mut t).unwrap();
    let ids: Vec<TeamId> = (0..n)
        .map(|i| t.register_team(format!("Team {i}"), &format!("#CLAN{i}")).unwrap())
        .collect();
    for &id in &ids {
        t.approve_team(id).unwrap();
    }
    close_registration(&mut t).unwrap();
    (t, ids)
}

/// An ongoing tournament whose round one is laid out exactly as `seeded`, byes resolved.
pub fn tournament_with_seeding(seeded: &[Slot]) -> Tournament {
    let size = seeded.len() as u32;
    let byes = seeded.iter().filter(|s| **s == Slot::Bye).count() as u32;
    let layout = BracketLayout::new(size, byes).unwrap();
    let routing = RoutingTable::new(&layout);
    let mut matches = build_matches(&layout, seeded);
    resolve_byes(&mut matches, &routing).unwrap();

    let mut t = Tournament::new("Fixed Cup", size, true).unwrap();
    t.layout = Some(layout);
    t.routing = Some(routing);
    t.matches = matches;
    t.status = TournamentStatus::Ongoing;
    t
}

/// Matches that can be reported right now: not completed, two real teams.
pub fn playable(t: &Tournament) -> Vec<(MatchKey, TeamId, TeamId)> {
    t.matches
        .values()
        .filter(|m| !m.is_completed())
        .filter_map(|m| m.occupants().map(|(a, b)| (m.key, a, b)))
        .collect()
}

pub fn slot(t: &Tournament, key: &str, side: clan_bracket_web::Side) -> Slot {
    match_at(t, key).slot(side)
}

pub fn match_at<'a>(t: &'a Tournament, key: &str) -> &'a Match {
    t.get_match(key.parse().unwrap()).unwrap()
}

/// Report random winners until no match is playable. Returns the reported keys in order.
pub fn play_out<R: Rng>(t: &mut Tournament, rng: &mut R) -> Vec<MatchKey> {
    let mut reported = Vec::new();
    for _ in 0..1_000 {
        let open = playable(t);
        if open.is_empty() {
            break;
        }
        let (key, a, b) = open[rng.gen_range(0..open.len())];
        let winner = if rng.gen_bool(0.5) { a } else { b };
        let outcome = report_match_result(t, key, winner).unwrap();
        assert!(matches!(outcome, ReportOutcome::Advanced(_)));
        reported.push(key);
    }
    reported
}
