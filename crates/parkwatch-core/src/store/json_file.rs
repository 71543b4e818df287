//! Session store backed by a single JSON file.
//!
//! The whole session list is rewritten on every mutation. Writes go to a
//! sibling temporary file that is flushed to disk and then renamed over the
//! target, so a crash leaves either the old or the new contents on disk.
//! A failed write leaves the in-memory list as it was before the call.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::{insert, open_index, replace, SessionStore, StoreError, StoreResult, SESSIONS_FILE};
use crate::config::StorageBackend;
use crate::types::{NewSession, VehicleSession};

/// On-disk layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    sessions: Vec<VehicleSession>,
}

/// Sessions persisted to `<data_dir>/sessions.json`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    sessions: Mutex<Vec<VehicleSession>>,
}

impl JsonFileStore {
    /// Open the store in `data_dir`, loading any existing sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or an existing
    /// file cannot be read or parsed.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir).map_err(|source| StoreError::WriteError {
            path: data_dir.to_path_buf(),
            source,
        })?;
        let path = data_dir.join(SESSIONS_FILE);
        let sessions = Self::load(&path)?;
        tracing::info!(
            path = %path.display(),
            sessions = sessions.len(),
            "Opened session store"
        );
        Ok(Self {
            path,
            sessions: Mutex::new(sessions),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> StoreResult<Vec<VehicleSession>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let file: SessionFile =
            serde_json::from_str(&content).map_err(|source| StoreError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(file.sessions)
    }

    fn persist(&self, sessions: &[VehicleSession]) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(&SessionFileRef { sessions })?;
        let tmp = self.path.with_extension("json.tmp");
        let write_tmp = || -> std::io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()
        };
        write_tmp().map_err(|source| StoreError::WriteError {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::WriteError {
            path: self.path.clone(),
            source,
        })
    }
}

#[derive(Serialize)]
struct SessionFileRef<'a> {
    sessions: &'a [VehicleSession],
}

impl SessionStore for JsonFileStore {
    fn create(&self, new: NewSession) -> StoreResult<VehicleSession> {
        let mut sessions = self.sessions.lock().map_err(|_| StoreError::Poisoned)?;
        let session = insert(&mut sessions, new)?;
        if let Err(err) = self.persist(&sessions) {
            sessions.pop();
            return Err(err);
        }
        Ok(session)
    }

    fn update(&self, session: &VehicleSession) -> StoreResult<()> {
        let mut sessions = self.sessions.lock().map_err(|_| StoreError::Poisoned)?;
        let previous = replace(&mut sessions, session)?;
        if let Err(err) = self.persist(&sessions) {
            replace(&mut sessions, &previous)?;
            return Err(err);
        }
        Ok(())
    }

    fn find_all(&self) -> StoreResult<Vec<VehicleSession>> {
        let sessions = self.sessions.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(sessions.clone())
    }

    fn find_open_by_plate(&self, plate: &str) -> StoreResult<Option<VehicleSession>> {
        let sessions = self.sessions.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(open_index(&sessions, plate).map(|i| sessions[i].clone()))
    }

    fn backend(&self) -> StorageBackend {
        StorageBackend::Json
    }
}
