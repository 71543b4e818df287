//! # parkwatch-core
//!
//! Core business logic for the parkwatch vehicle parking tracker.
//!
//! This crate provides:
//! - Vehicle check-in with a duplicate-entry guard
//! - Check-out with hourly, truncated, minimum-one-hour billing
//! - Lookup of parked vehicles and the full session history
//! - Configuration, localized messages and session persistence
//!
//! ## Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`service`] - Session lifecycle, per-plate locking and fee computation
//! - [`store`] - The `SessionStore` trait with memory and JSON file backends
//! - [`tariff`] - Hourly rates and category labels
//! - [`messages`] - Locales and the localized message catalog
//! - [`clock`] - Time source abstraction
//! - [`config`] - Application configuration loading, saving, and validation
//! - [`error`] - Unified error types for the crate
//! - [`types`] - The vehicle session model and OpenAPI schemas

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod error;
pub mod messages;
pub mod service;
pub mod store;
pub mod tariff;
pub mod types;

// Re-export primary types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    default_log_dir, ConfigError, ConfigResult, FacilityConfig, LocaleConfig, LoggingConfig,
    ParkingConfig, ServerConfig, StorageBackend, StorageConfig, TariffConfig,
};
pub use error::{ParkingError, Result};
pub use messages::{Locale, MessageCatalog, MessageId};
pub use service::{billed_hours, compute_fee, normalize_plate, Fee, ParkingService};
pub use store::{
    default_data_dir, JsonFileStore, MemoryStore, SessionStore,
    StoreError, StoreResult,
};
pub use tariff::{ConfiguredTariffs, TariffTable};
pub use types::{NewSession, SessionId, SessionState, VehicleSession, VehicleType};
