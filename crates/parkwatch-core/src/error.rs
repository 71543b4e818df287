//! Unified error types for the parkwatch core library.
//!
//! [`ParkingError`] covers every failure a service operation can report.
//! Stores and configuration have their own error types ([`StoreError`],
//! [`ConfigError`]) that convert into it.
//!
//! # Example
//!
//! ```rust
//! use parkwatch_core::error::{ParkingError, Result};
//!
//! fn require_plate(plate: &str) -> Result<()> {
//!     if plate.is_empty() {
//!         return Err(ParkingError::InvalidPlate {
//!             plate: plate.to_string(),
//!             reason: "plate is empty",
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::config::ConfigError;
use crate::messages::{Locale, MessageCatalog, MessageId};
use crate::store::StoreError;

/// The unified error type for all parkwatch operations.
#[derive(Debug, Error)]
pub enum ParkingError {
    // =========================================================================
    // SESSION ERRORS
    // =========================================================================
    /// Check-in for a plate that is already parked.
    #[error("Vehicle with plate '{plate}' already has an open session")]
    DuplicateOpenSession {
        /// The plate.
        plate: String,
    },

    /// Check-in with a type that matches no category label.
    #[error("Invalid vehicle type '{input}'")]
    InvalidVehicleType {
        /// What the caller sent.
        input: String,
    },

    /// Check-out or lookup for a plate without an open session.
    #[error("No open session for plate '{plate}'")]
    SessionNotFound {
        /// The plate.
        plate: String,
    },

    /// The plate is empty or malformed.
    #[error("Invalid plate '{plate}': {reason}")]
    InvalidPlate {
        /// What the caller sent.
        plate: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    // =========================================================================
    // INFRASTRUCTURE ERRORS
    // =========================================================================
    /// The session store failed.
    #[error(transparent)]
    Store(StoreError),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A specialized [`Result`] type for parkwatch operations.
pub type Result<T> = std::result::Result<T, ParkingError>;

impl ParkingError {
    /// Returns `true` for errors caused by the request rather than the system.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DuplicateOpenSession { .. }
                | Self::InvalidVehicleType { .. }
                | Self::SessionNotFound { .. }
                | Self::InvalidPlate { .. }
        )
    }

    /// Returns an HTTP-appropriate status code for this error.
    #[inline]
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed input
            Self::InvalidVehicleType { .. } | Self::InvalidPlate { .. } => 400,

            // 404 Not Found
            Self::SessionNotFound { .. } => 404,

            // 409 Conflict - plate already parked
            Self::DuplicateOpenSession { .. } => 409,

            // 500 Internal Server Error
            Self::Store(_) | Self::Config(_) => 500,
        }
    }

    /// Returns a machine-readable error code for API responses.
    #[inline]
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateOpenSession { .. } => "DUPLICATE_OPEN_SESSION",
            Self::InvalidVehicleType { .. } => "INVALID_VEHICLE_TYPE",
            Self::SessionNotFound { .. } => "SESSION_NOT_FOUND",
            Self::InvalidPlate { .. } => "INVALID_PLATE",
            Self::Store(_) => "STORE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Catalog message describing this error to an end user, if any.
    #[must_use]
    pub const fn message_id(&self) -> Option<MessageId> {
        match self {
            Self::DuplicateOpenSession { .. } => Some(MessageId::VehicleExists),
            Self::InvalidVehicleType { .. } => Some(MessageId::VehicleTypeInvalid),
            Self::SessionNotFound { .. } => Some(MessageId::VehicleNotFound),
            Self::InvalidPlate { .. } => Some(MessageId::PlateInvalid),
            Self::Store(_) | Self::Config(_) => None,
        }
    }

    /// User-facing text in `locale`, falling back to the English
    /// `Display` text for infrastructure errors.
    #[must_use]
    pub fn localized(&self, catalog: &MessageCatalog, locale: Locale) -> String {
        let Some(id) = self.message_id() else {
            return self.to_string();
        };
        match self {
            Self::DuplicateOpenSession { plate } | Self::InvalidPlate { plate, .. } => {
                catalog.text(locale, id, &[plate])
            }
            _ => catalog.text(locale, id, &[]),
        }
    }
}

// =============================================================================
// CONVERSIONS FROM MODULE-SPECIFIC ERRORS
// =============================================================================

impl From<StoreError> for ParkingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OpenSessionExists { plate } => Self::DuplicateOpenSession { plate },
            other => Self::Store(other),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
