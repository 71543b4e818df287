//! Vehicle session lifecycle and fee computation.
//!
//! A session is opened by [`ParkingService::check_in`] and closed exactly
//! once by [`ParkingService::check_out`]:
//!
//! ```text
//! Open --check_out--> Closed
//! ```
//!
//! Check-in and check-out for the same plate are serialized through a
//! per-plate async mutex. Different plates never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::StorageBackend;
use crate::error::{ParkingError, Result};
use crate::messages::Locale;
use crate::store::SessionStore;
use crate::tariff::TariffTable;
use crate::types::{NewSession, VehicleSession, VehicleType};

/// Plates may hold any printable text except '/', which cannot travel
/// in a path segment.
static PLATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^/\p{Cc}]+$").expect("plate pattern is valid"));

/// Trim `raw` and check it is a usable plate.
///
/// # Errors
///
/// Returns `InvalidPlate` for empty plates and plates holding '/' or
/// control characters.
pub fn normalize_plate(raw: &str) -> Result<String> {
    let plate = raw.trim();
    let invalid = |reason| ParkingError::InvalidPlate {
        plate: raw.to_string(),
        reason,
    };

    if plate.is_empty() {
        return Err(invalid("plate is empty"));
    }
    if !PLATE_PATTERN.is_match(plate) {
        return Err(invalid("plate may not contain '/' or control characters"));
    }
    Ok(plate.to_string())
}

/// Outcome of billing a stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fee {
    /// Whole hours charged, at least one.
    pub billed_hours: u64,
    /// `billed_hours * rate`.
    pub total_cost: u64,
}

/// Whole hours between `entry` and `exit`, truncated, with a one hour
/// minimum. An exit before entry bills the minimum.
#[must_use]
pub fn billed_hours(entry: DateTime<Utc>, exit: DateTime<Utc>) -> u64 {
    let hours = (exit - entry).num_hours();
    u64::try_from(hours).unwrap_or(0).max(1)
}

/// Fee for a stay from `entry` to `exit` at `hourly_rate`.
#[must_use]
pub fn compute_fee(entry: DateTime<Utc>, exit: DateTime<Utc>, hourly_rate: u64) -> Fee {
    let billed_hours = billed_hours(entry, exit);
    Fee {
        billed_hours,
        total_cost: billed_hours.saturating_mul(hourly_rate),
    }
}

/// Per-plate mutual exclusion.
#[derive(Debug, Default)]
struct PlateLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl PlateLocks {
    async fn acquire(&self, plate: &str) -> PlateGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(plate.to_string()).or_default())
        };
        let guard = lock.lock_owned().await;
        PlateGuard {
            table: self,
            plate: plate.to_string(),
            _guard: guard,
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

struct PlateGuard<'a> {
    table: &'a PlateLocks,
    plate: String,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for PlateGuard<'_> {
    fn drop(&mut self) {
        let mut locks = self
            .table
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Two references left means the table's and ours: nobody is waiting.
        if locks
            .get(&self.plate)
            .is_some_and(|lock| Arc::strong_count(lock) <= 2)
        {
            locks.remove(&self.plate);
        }
    }
}

/// Check-in, check-out and lookup of vehicle sessions.
pub struct ParkingService {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    tariffs: Arc<dyn TariffTable>,
    locks: PlateLocks,
}

impl ParkingService {
    /// Create a service over the given collaborators.
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        tariffs: Arc<dyn TariffTable>,
    ) -> Self {
        Self {
            store,
            clock,
            tariffs,
            locks: PlateLocks::default(),
        }
    }

    /// Tariff table used for labels and rates.
    #[must_use]
    pub fn tariffs(&self) -> &dyn TariffTable {
        self.tariffs.as_ref()
    }

    /// Backend holding the sessions.
    #[must_use]
    pub fn storage_backend(&self) -> StorageBackend {
        self.store.backend()
    }

    /// Register a vehicle entering the facility.
    ///
    /// `vehicle_type` is a category label in `locale`, compared ignoring
    /// case (`"carro"`/`"moto"` in Spanish, `"car"`/`"motorcycle"` in
    /// English).
    ///
    /// # Errors
    ///
    /// - `InvalidPlate` if the plate is malformed
    /// - `DuplicateOpenSession` if the plate is already parked
    /// - `InvalidVehicleType` if the label matches no category
    /// - `Store` on persistence failure
    pub async fn check_in(
        &self,
        plate: &str,
        vehicle_type: &str,
        locale: Locale,
    ) -> Result<VehicleSession> {
        self.open_session(plate, || {
            self.tariffs
                .parse_label(vehicle_type, locale)
                .ok_or_else(|| ParkingError::InvalidVehicleType {
                    input: vehicle_type.to_string(),
                })
        })
        .await
    }

    /// Register a vehicle whose category is already known.
    ///
    /// # Errors
    ///
    /// Same as [`check_in`](Self::check_in), minus `InvalidVehicleType`.
    pub async fn check_in_as(
        &self,
        plate: &str,
        vehicle_type: VehicleType,
    ) -> Result<VehicleSession> {
        self.open_session(plate, || Ok(vehicle_type)).await
    }

    async fn open_session(
        &self,
        plate: &str,
        resolve_type: impl FnOnce() -> Result<VehicleType> + Send,
    ) -> Result<VehicleSession> {
        let plate = normalize_plate(plate)?;
        let _lock = self.locks.acquire(&plate).await;

        if self.store.find_open_by_plate(&plate)?.is_some() {
            warn!(plate = %plate, "Check-in refused: vehicle already parked");
            return Err(ParkingError::DuplicateOpenSession { plate });
        }

        let vehicle_type = resolve_type()?;
        let session = self.store.create(NewSession {
            plate,
            vehicle_type,
            entry_time: self.clock.now(),
        })?;

        info!(
            plate = %session.plate,
            session_id = %session.id,
            vehicle_type = %session.vehicle_type,
            "Vehicle checked in"
        );
        Ok(session)
    }

    /// Register a vehicle leaving and bill its stay.
    ///
    /// # Errors
    ///
    /// - `InvalidPlate` if the plate is malformed
    /// - `SessionNotFound` if the plate has no open session
    /// - `Store` on persistence failure
    pub async fn check_out(&self, plate: &str) -> Result<VehicleSession> {
        let plate = normalize_plate(plate)?;
        let _lock = self.locks.acquire(&plate).await;

        let Some(mut session) = self.store.find_open_by_plate(&plate)? else {
            return Err(ParkingError::SessionNotFound { plate });
        };

        let exit_time = self.clock.now();
        let rate = self.tariffs.hourly_rate(session.vehicle_type);
        let fee = compute_fee(session.entry_time, exit_time, rate);

        session.exit_time = Some(exit_time);
        session.total_cost = fee.total_cost;
        self.store.update(&session)?;

        info!(
            plate = %session.plate,
            session_id = %session.id,
            billed_hours = fee.billed_hours,
            total_cost = fee.total_cost,
            "Vehicle checked out"
        );
        Ok(session)
    }

    /// The open session for `plate`.
    ///
    /// # Errors
    ///
    /// - `InvalidPlate` if the plate is malformed
    /// - `SessionNotFound` if the plate has no open session
    /// - `Store` on persistence failure
    pub fn find_open(&self, plate: &str) -> Result<VehicleSession> {
        let plate = normalize_plate(plate)?;
        debug!(plate = %plate, "Looking up open session");
        self.store
            .find_open_by_plate(&plate)?
            .ok_or(ParkingError::SessionNotFound { plate })
    }

    /// Every session ever recorded, open and closed, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `Store` on persistence failure.
    pub fn list_all(&self) -> Result<Vec<VehicleSession>> {
        Ok(self.store.find_all()?)
    }
}
