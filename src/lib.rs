//! Clan tournament web app: library with models, double-elimination bracket logic,
//! record store and REST API.

pub mod api;
pub mod config;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use logic::{
    generate_bracket, report_match_result, Advancement, BracketCreated, BracketLayout,
    BracketPolicy, Destination, ReportOutcome, RoutingTable,
};
pub use models::{
    Bracket, Match, MatchKey, MatchStatus, Side, Slot, Team, TeamId, TeamStats, TeamStatus,
    Tournament, TournamentError, TournamentId, TournamentStatus,
};
pub use store::{InMemoryStore, StoreError, TournamentStore};
