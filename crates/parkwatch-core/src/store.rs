//! Persistent storage for vehicle sessions.
//!
//! The [`SessionStore`] trait is the only way the service touches session
//! records. Two implementations ship with the crate:
//!
//! - [`MemoryStore`] keeps sessions in process memory.
//! - [`JsonFileStore`] keeps them in a single JSON file.
//!
//! Both refuse to create a second open session for a plate, so the
//! one-open-session-per-plate rule holds even if a caller bypasses the
//! service's plate locks.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::StorageBackend;
use crate::types::{NewSession, SessionId, VehicleSession};

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// File name of the JSON store inside the data directory.
pub const SESSIONS_FILE: &str = "sessions.json";

/// Errors raised by session stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A session for this plate is already open.
    #[error("An open session already exists for plate '{plate}'")]
    OpenSessionExists {
        /// The plate.
        plate: String,
    },

    /// No stored session has this id.
    #[error("Session {0} does not exist")]
    NotFound(SessionId),

    /// Reading the backing file failed.
    #[error("Failed to read {}: {source}", path.display())]
    ReadError {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Writing the backing file failed.
    #[error("Failed to write {}: {source}", path.display())]
    WriteError {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The backing file is not valid session JSON.
    #[error("Failed to parse {}: {source}", path.display())]
    ParseError {
        /// File path.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Sessions could not be serialized.
    #[error("Failed to serialize sessions: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// A thread panicked while holding the store lock.
    #[error("Session store lock poisoned")]
    Poisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// CRUD over session records.
///
/// Implementations must make `create` atomic with respect to the open
/// session check for the same plate.
pub trait SessionStore: Send + Sync {
    /// Persist a new open session and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// `OpenSessionExists` if the plate already has an open session, or a
    /// storage failure.
    fn create(&self, new: NewSession) -> StoreResult<VehicleSession>;

    /// Replace the stored record with the same id.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is unknown, or a storage failure.
    fn update(&self, session: &VehicleSession) -> StoreResult<()>;

    /// Every stored session in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a storage failure.
    fn find_all(&self) -> StoreResult<Vec<VehicleSession>>;

    /// The open session for `plate`, if any.
    ///
    /// # Errors
    ///
    /// Returns a storage failure.
    fn find_open_by_plate(&self, plate: &str) -> StoreResult<Option<VehicleSession>>;

    /// Which backend this is.
    fn backend(&self) -> StorageBackend;
}

/// Default data directory.
///
/// On Linux: `/var/lib/parkwatch/`.
/// Elsewhere: the platform data directory.
#[must_use]
pub fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/var/lib/parkwatch")
    }
    #[cfg(not(target_os = "linux"))]
    {
        directories::ProjectDirs::from("", "", "parkwatch")
            .map_or_else(|| PathBuf::from("./data"), |dirs| dirs.data_dir().to_path_buf())
    }
}

// Shared bookkeeping for the Vec-backed stores.

fn open_index(sessions: &[VehicleSession], plate: &str) -> Option<usize> {
    sessions
        .iter()
        .position(|s| s.is_open() && s.plate == plate)
}

fn insert(sessions: &mut Vec<VehicleSession>, new: NewSession) -> StoreResult<VehicleSession> {
    if open_index(sessions, &new.plate).is_some() {
        return Err(StoreError::OpenSessionExists { plate: new.plate });
    }
    let session = VehicleSession::open(SessionId::generate(), new);
    sessions.push(session.clone());
    Ok(session)
}

/// Returns the previous record so callers can roll back.
fn replace(
    sessions: &mut [VehicleSession],
    session: &VehicleSession,
) -> StoreResult<VehicleSession> {
    let slot = sessions
        .iter_mut()
        .find(|s| s.id == session.id)
        .ok_or(StoreError::NotFound(session.id))?;
    Ok(std::mem::replace(slot, session.clone()))
}
