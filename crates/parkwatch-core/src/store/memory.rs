//! In-process session store.

use std::sync::RwLock;

use super::{insert, open_index, replace, SessionStore, StoreError, StoreResult};
use crate::config::StorageBackend;
use crate::types::{NewSession, VehicleSession};

/// Sessions held in memory, lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: RwLock<Vec<VehicleSession>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn create(&self, new: NewSession) -> StoreResult<VehicleSession> {
        let mut sessions = self.sessions.write().map_err(|_| StoreError::Poisoned)?;
        insert(&mut sessions, new)
    }

    fn update(&self, session: &VehicleSession) -> StoreResult<()> {
        let mut sessions = self.sessions.write().map_err(|_| StoreError::Poisoned)?;
        replace(&mut sessions, session).map(|_| ())
    }

    fn find_all(&self) -> StoreResult<Vec<VehicleSession>> {
        let sessions = self.sessions.read().map_err(|_| StoreError::Poisoned)?;
        Ok(sessions.clone())
    }

    fn find_open_by_plate(&self, plate: &str) -> StoreResult<Option<VehicleSession>> {
        let sessions = self.sessions.read().map_err(|_| StoreError::Poisoned)?;
        Ok(open_index(&sessions, plate).map(|i| sessions[i].clone()))
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
