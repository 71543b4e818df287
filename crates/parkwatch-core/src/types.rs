//! Shared types and OpenAPI schemas.
//!
//! The vehicle session is the only persisted entity. Everything else here
//! is either an identifier or a small enum derived from a session.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Opaque identifier of a stored vehicle session.
///
/// Assigned by the store on creation. UUID v7 values are time-ordered, so
/// ids sort in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid, example = "01932c4e-8f3a-7b2e-9d41-5a6c7e8f9a0b")]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh, time-ordered identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Vehicle category. Determines the hourly tariff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    /// Passenger car.
    Car,
    /// Motorcycle.
    Motorcycle,
}

impl VehicleType {
    /// Every known category, in display order.
    pub const ALL: [Self; 2] = [Self::Car, Self::Motorcycle];

    /// Stable machine-readable key for this category.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Motorcycle => "motorcycle",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Lifecycle state of a session. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Vehicle is inside the facility.
    Open,
    /// Vehicle has left and the fee was computed.
    Closed,
}

/// Input for creating a session; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    /// Normalized plate.
    pub plate: String,
    /// Vehicle category.
    pub vehicle_type: VehicleType,
    /// When the vehicle entered.
    pub entry_time: DateTime<Utc>,
}

/// A single stay of a vehicle in the facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VehicleSession {
    /// Store-assigned identifier.
    pub id: SessionId,

    /// Vehicle plate.
    #[schema(example = "ABC-123")]
    pub plate: String,

    /// Vehicle category.
    pub vehicle_type: VehicleType,

    /// When the vehicle entered (UTC).
    pub entry_time: DateTime<Utc>,

    /// When the vehicle left (UTC). Absent while the session is open.
    pub exit_time: Option<DateTime<Utc>>,

    /// Fee charged at checkout. Zero while the session is open.
    #[schema(example = 4000)]
    pub total_cost: u64,
}

impl VehicleSession {
    /// Build the stored record for a new session.
    #[must_use]
    pub fn open(id: SessionId, new: NewSession) -> Self {
        Self {
            id,
            plate: new.plate,
            vehicle_type: new.vehicle_type,
            entry_time: new.entry_time,
            exit_time: None,
            total_cost: 0,
        }
    }

    /// Whether the vehicle is still inside.
    #[inline]
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        if self.is_open() {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    /// Hours that were billed, once the session is closed.
    #[must_use]
    pub fn billed_hours(&self) -> Option<u64> {
        self.exit_time
            .map(|exit| crate::service::billed_hours(self.entry_time, exit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample() -> VehicleSession {
        VehicleSession::open(
            SessionId::generate(),
            NewSession {
                plate: "ABC-123".into(),
                vehicle_type: VehicleType::Car,
                entry_time: Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
            },
        )
    }

    #[test]
    fn test_new_session_is_open() {
        let session = sample();
        assert!(session.is_open());
        assert_eq!(session.state(), SessionState::Open);
        assert_eq!(session.total_cost, 0);
        assert_eq!(session.billed_hours(), None);
    }

    #[test]
    fn test_closed_session_reports_billed_hours() {
        let mut session = sample();
        session.exit_time = Some(session.entry_time + Duration::minutes(150));
        assert_eq!(session.state(), SessionState::Closed);
        assert_eq!(session.billed_hours(), Some(2));
    }

    #[test]
    fn test_vehicle_type_serializes_snake_case() {
        let json = serde_json::to_string(&VehicleType::Motorcycle).unwrap();
        assert_eq!(json, "\"motorcycle\"");
        assert_eq!(VehicleType::Car.to_string(), "car");
    }

    #[test]
    fn test_session_ids_are_time_ordered() {
        let first = SessionId::generate();
        let second = SessionId::generate();
        assert!(first < second);
    }

    #[test]
    fn test_session_id_serializes_as_plain_string() {
        let id = SessionId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
