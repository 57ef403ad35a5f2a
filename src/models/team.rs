//! Team and TeamStats data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in match slots and lookups).
pub type TeamId = Uuid;

/// Registration state of a team. Only approved teams are placed in a bracket.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Statistics view of a team (for API / display), derived from completed matches.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub wins: u32,
    pub losses: u32,
    /// Walkovers won against a bye; not counted in `wins`.
    pub walkovers: u32,
    pub eliminated: bool,
}

/// A clan team registered for a tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// In-game clan tag, normalized to `#` followed by upper-case alphanumerics.
    pub clan_tag: String,
    pub status: TeamStatus,
    pub registered_at: DateTime<Utc>,
}

impl Team {
    /// Create a pending team. The clan tag must already be normalized.
    pub fn new(name: impl Into<String>, clan_tag: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            clan_tag: clan_tag.into(),
            status: TeamStatus::Pending,
            registered_at: Utc::now(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == TeamStatus::Approved
    }
}

/// Normalize a clan tag: trim, upper-case, prepend `#` if missing.
/// Returns None unless the body is 3..=12 characters of `0-9A-Z`.
pub fn normalize_clan_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix('#').unwrap_or(trimmed).to_ascii_uppercase();
    let valid = (3..=12).contains(&body.len())
        && body.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());
    valid.then(|| format!("#{body}"))
}
