//! Integration tests for match keys and winner/loser routing.

use clan_bracket_web::logic::{route, BracketLayout, RoutingTable};
use clan_bracket_web::{Bracket, Destination, MatchKey, Side};
use std::collections::HashMap;

fn key(s: &str) -> MatchKey {
    s.parse().unwrap()
}

fn to(s: &str, side: Side) -> Destination {
    Destination::Match { key: key(s), side }
}

#[test]
fn match_keys_format_and_parse() {
    assert_eq!(MatchKey::upper(1, 3).to_string(), "U-R1-M3");
    assert_eq!(MatchKey::lower(4, 1).to_string(), "L-R4-M1");
    assert_eq!(MatchKey::GRAND_FINAL.to_string(), "GF-R1-M1");
    assert_eq!(key("L-R12-M7"), MatchKey::lower(12, 7));
    assert_eq!(key("GF-R1-M1"), MatchKey::GRAND_FINAL);
}

#[test]
fn malformed_match_keys_rejected() {
    for bad in [
        "", "U-R1", "U-R1-M1-M2", "X-R1-M1", "U-R0-M1", "U-R1-M0", "U-R01-M1", "U-R+1-M1",
        "u-r1-m1", "GF-R2-M1", "GF-R1-M2", "U-1-M1",
    ] {
        assert!(bad.parse::<MatchKey>().is_err(), "{bad:?} should not parse");
    }
}

#[test]
fn match_key_serializes_as_string() {
    let json = serde_json::to_string(&MatchKey::lower(2, 1)).unwrap();
    assert_eq!(json, "\"L-R2-M1\"");
    let back: MatchKey = serde_json::from_str(&json).unwrap();
    assert_eq!(back, MatchKey::lower(2, 1));
    assert!(serde_json::from_str::<MatchKey>("\"Q-R1-M1\"").is_err());
}

#[test]
fn eight_team_routes() {
    let layout = BracketLayout::new(8, 0).unwrap();
    let cases = [
        ("U-R1-M1", to("U-R2-M1", Side::One), to("L-R1-M1", Side::One)),
        ("U-R1-M2", to("U-R2-M1", Side::Two), to("L-R1-M1", Side::Two)),
        ("U-R1-M4", to("U-R2-M2", Side::Two), to("L-R1-M2", Side::Two)),
        ("U-R2-M1", to("U-R3-M1", Side::One), to("L-R2-M1", Side::Two)),
        ("U-R2-M2", to("U-R3-M1", Side::Two), to("L-R2-M2", Side::Two)),
        ("U-R3-M1", to("GF-R1-M1", Side::One), to("L-R4-M1", Side::Two)),
        ("L-R1-M2", to("L-R2-M2", Side::One), Destination::Eliminated),
        ("L-R2-M1", to("L-R3-M1", Side::One), Destination::Eliminated),
        ("L-R2-M2", to("L-R3-M1", Side::Two), Destination::Eliminated),
        ("L-R3-M1", to("L-R4-M1", Side::One), Destination::Eliminated),
        ("L-R4-M1", to("GF-R1-M1", Side::Two), Destination::Eliminated),
        ("GF-R1-M1", Destination::Champion, Destination::Eliminated),
    ];
    for (from, winner, loser) in cases {
        let routes = route(&layout, key(from)).unwrap();
        assert_eq!(routes.winner, winner, "winner of {from}");
        assert_eq!(routes.loser, loser, "loser of {from}");
    }
}

#[test]
fn sixteen_team_upper_droppers_meet_lower_survivors() {
    let layout = BracketLayout::new(16, 0).unwrap();
    // upper round 3 losers land in lower round 4, slot two
    assert_eq!(
        route(&layout, key("U-R3-M2")).unwrap().loser,
        to("L-R4-M2", Side::Two)
    );
    assert_eq!(
        route(&layout, key("L-R3-M2")).unwrap().winner,
        to("L-R4-M2", Side::One)
    );
    assert_eq!(
        route(&layout, key("U-R4-M1")).unwrap().loser,
        to("L-R6-M1", Side::Two)
    );
}

#[test]
fn two_team_loser_goes_to_grand_final() {
    let layout = BracketLayout::new(2, 0).unwrap();
    let routes = route(&layout, key("U-R1-M1")).unwrap();
    assert_eq!(routes.winner, to("GF-R1-M1", Side::One));
    assert_eq!(routes.loser, to("GF-R1-M1", Side::Two));
}

#[test]
fn keys_outside_layout_have_no_route() {
    let layout = BracketLayout::new(8, 0).unwrap();
    assert!(route(&layout, key("U-R4-M1")).is_none());
    assert!(route(&layout, key("U-R1-M5")).is_none());
    assert!(route(&layout, key("L-R5-M1")).is_none());
    assert!(route(&layout, key("L-R3-M2")).is_none());
}

/// Every slot outside upper round one is fed by exactly one (match, outcome).
#[test]
fn every_later_slot_has_exactly_one_feeder() {
    for exp in 1..=6 {
        let layout = BracketLayout::new(1 << exp, 0).unwrap();
        let table = RoutingTable::new(&layout);
        assert_eq!(table.len(), layout.total_matches());

        let mut feeders: HashMap<(MatchKey, Side), u32> = HashMap::new();
        let mut champions = 0;
        for from in layout.keys() {
            let routes = table.routes(from).unwrap();
            for dest in [routes.winner, routes.loser] {
                match dest {
                    Destination::Match { key, side } => {
                        assert!(layout.contains(key), "{from} routes to missing {key}");
                        *feeders.entry((key, side)).or_default() += 1;
                    }
                    Destination::Champion => champions += 1,
                    Destination::Eliminated => {}
                }
            }
        }
        assert_eq!(champions, 1);
        for target in layout.keys() {
            let expected = if target.bracket == Bracket::Upper && target.round == 1 { 0 } else { 1 };
            for side in [Side::One, Side::Two] {
                assert_eq!(
                    feeders.get(&(target, side)).copied().unwrap_or(0),
                    expected,
                    "size {} slot {} {:?}",
                    layout.size,
                    target,
                    side
                );
            }
        }
    }
}
