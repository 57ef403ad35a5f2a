//! Tournament record store: the persistence contract and an in-memory implementation.

mod memory;
mod merge;

pub use memory::InMemoryStore;

use crate::models::{Tournament, TournamentId};

/// Errors reported by a [`TournamentStore`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// No tournament with this id.
    NotFound(TournamentId),
    /// A tournament with this id already exists.
    AlreadyExists(TournamentId),
    /// The record changed since it was loaded; nothing was written.
    Conflict { id: TournamentId, expected: u64, found: u64 },
    /// The backend could not be reached or failed mid-write; nothing was written.
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "Tournament {} not found", id),
            StoreError::AlreadyExists(id) => write!(f, "Tournament {} already exists", id),
            StoreError::Conflict {
                id,
                expected,
                found,
            } => write!(
                f,
                "Tournament {} was modified concurrently (expected version {}, found {})",
                id, expected, found
            ),
            StoreError::Unavailable(reason) => write!(f, "Store unavailable: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable storage for tournament records, each holding its teams and matches.
///
/// `commit` replaces the whole record at once, so every write of a bracket or a
/// result is all-or-nothing. Writers are serialized by the record version, or by
/// the touched match fields with `commit_changes`.
pub trait TournamentStore: Send + Sync {
    fn insert(&self, tournament: Tournament) -> Result<(), StoreError>;

    fn load(&self, id: TournamentId) -> Result<Tournament, StoreError>;

    fn list(&self) -> Result<Vec<Tournament>, StoreError>;

    /// Store `tournament` if the stored version still equals `tournament.version`.
    /// Returns the new version.
    fn commit(&self, tournament: &Tournament) -> Result<u64, StoreError>;

    /// Store the change from `base` to `working`, both at `base.version`.
    ///
    /// Backends that can compare match records may accept the change on top of a
    /// newer version when no concurrent writer touched the same match fields, so
    /// reports for different matches do not conflict. The default requires the
    /// whole record to be unchanged. Returns the record as stored.
    fn commit_changes(
        &self,
        base: &Tournament,
        working: &Tournament,
    ) -> Result<Tournament, StoreError> {
        debug_assert_eq!(base.version, working.version);
        let version = self.commit(working)?;
        Ok(Tournament {
            version,
            ..working.clone()
        })
    }
}
