//! In-memory store: many tournaments by id behind one lock.

use crate::models::{Tournament, TournamentId};
use crate::store::merge::rebase;
use crate::store::{StoreError, TournamentStore};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    tournaments: RwLock<HashMap<TournamentId, Tournament>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<TournamentId, Tournament>>, StoreError> {
        self.tournaments
            .read()
            .map_err(|_| StoreError::Unavailable("lock error".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<TournamentId, Tournament>>, StoreError> {
        self.tournaments
            .write()
            .map_err(|_| StoreError::Unavailable("lock error".to_string()))
    }
}

impl TournamentStore for InMemoryStore {
    fn insert(&self, tournament: Tournament) -> Result<(), StoreError> {
        let mut g = self.write()?;
        if g.contains_key(&tournament.id) {
            return Err(StoreError::AlreadyExists(tournament.id));
        }
        g.insert(tournament.id, tournament);
        Ok(())
    }

    fn load(&self, id: TournamentId) -> Result<Tournament, StoreError> {
        self.read()?.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    fn list(&self) -> Result<Vec<Tournament>, StoreError> {
        let mut all: Vec<Tournament> = self.read()?.values().cloned().collect();
        all.sort_by_key(|t| t.created_at);
        Ok(all)
    }

    fn commit(&self, tournament: &Tournament) -> Result<u64, StoreError> {
        let mut g = self.write()?;
        let stored = g
            .get_mut(&tournament.id)
            .ok_or(StoreError::NotFound(tournament.id))?;
        if stored.version != tournament.version {
            return Err(StoreError::Conflict {
                id: tournament.id,
                expected: tournament.version,
                found: stored.version,
            });
        }
        let mut next = tournament.clone();
        next.version += 1;
        *stored = next;
        Ok(stored.version)
    }

    fn commit_changes(
        &self,
        base: &Tournament,
        working: &Tournament,
    ) -> Result<Tournament, StoreError> {
        let mut g = self.write()?;
        let stored = g.get_mut(&base.id).ok_or(StoreError::NotFound(base.id))?;
        let mut next = if stored.version == base.version {
            working.clone()
        } else {
            rebase(stored, base, working)?
        };
        next.version = stored.version + 1;
        *stored = next;
        Ok(stored.clone())
    }
}
