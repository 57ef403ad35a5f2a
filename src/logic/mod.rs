//! Tournament business logic: registration, bracket sizing, seeding, topology and progression.

mod bracket;
mod byes;
mod progression;
mod registration;
mod seeding;
mod sizing;
mod topology;

pub use bracket::{
    generate_bracket, report_match_result, set_match_status, Advancement, BracketCreated,
    ReportOutcome,
};
pub use byes::resolve_byes;
pub use progression::{route, Destination, Propagation, Routes};
pub use registration::{
    close_registration, import_teams_csv, open_registration, ImportReport, RejectedRow,
};
pub use seeding::seed_round_one;
pub use sizing::{size_bracket, BracketLayout, BracketPolicy, DEFAULT_MAX_BRACKET_SIZE};
pub use topology::{build_matches, RoutingTable};
