//! In-process contact repository.
//!
//! Mirrors the SQLite repository contract (ascending ids, no id reuse,
//! (email, phone_number) uniqueness) without a database. `scan` evaluates
//! predicates in memory.

use crate::model::contact::{ContactEntity, ContactId};
use crate::query::Predicate;
use crate::repo::contact_repo::{
    duplicate_contact_message, ContactRepository, RepoError, RepoResult,
};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    last_id: ContactId,
    rows: BTreeMap<ContactId, ContactEntity>,
}

impl MemoryState {
    fn has_duplicate(&self, contact: &ContactEntity, except: Option<ContactId>) -> bool {
        self.rows.values().any(|row| {
            Some(row.id) != except
                && row.email == contact.email
                && row.phone_number == contact.phone_number
        })
    }
}

/// Mutex-guarded in-memory contact store.
#[derive(Debug, Default)]
pub struct InMemoryContactRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored contacts.
    pub fn len(&self) -> RepoResult<usize> {
        Ok(self.lock()?.rows.len())
    }

    pub fn is_empty(&self) -> RepoResult<bool> {
        Ok(self.lock()?.rows.is_empty())
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| RepoError::Unavailable("in-memory contact store lock poisoned".to_string()))
    }
}

impl ContactRepository for InMemoryContactRepository {
    fn get_all(&self, limit: u32) -> RepoResult<Vec<ContactEntity>> {
        let state = self.lock()?;
        Ok(state
            .rows
            .values()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn get_by_id(&self, id: ContactId) -> RepoResult<Option<ContactEntity>> {
        Ok(self.lock()?.rows.get(&id).cloned())
    }

    fn scan(&self, predicate: &Predicate, limit: u32) -> RepoResult<Vec<ContactEntity>> {
        let state = self.lock()?;
        Ok(state
            .rows
            .values()
            .filter(|row| predicate.matches(row))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn insert(&self, contact: &ContactEntity) -> RepoResult<ContactEntity> {
        let mut state = self.lock()?;
        if state.has_duplicate(contact, None) {
            return Err(RepoError::Conflict(duplicate_contact_message()));
        }

        state.last_id += 1;
        let stored = ContactEntity {
            id: state.last_id,
            ..contact.clone()
        };
        state.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    fn update(&self, contact: &ContactEntity) -> RepoResult<()> {
        let mut state = self.lock()?;
        if !state.rows.contains_key(&contact.id) {
            return Err(RepoError::NotFound(contact.id));
        }
        if state.has_duplicate(contact, Some(contact.id)) {
            return Err(RepoError::Conflict(duplicate_contact_message()));
        }
        state.rows.insert(contact.id, contact.clone());
        Ok(())
    }

    fn delete(&self, id: ContactId) -> RepoResult<()> {
        match self.lock()?.rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound(id)),
        }
    }
}
