//! Application state shared across handlers.

use std::sync::Arc;

use chrono_tz::Tz;
use parkwatch_core::{
    Clock, ConfiguredTariffs, JsonFileStore, Locale, MemoryStore, MessageCatalog, ParkingConfig,
    ParkingError, ParkingService, SessionStore, StorageBackend, SystemClock,
};

/// Handle passed to every handler.
pub type SharedState = Arc<AppState>;

/// Shared application state.
pub struct AppState {
    /// Session lifecycle operations.
    pub service: ParkingService,
    /// Localized message lookup.
    pub catalog: Arc<MessageCatalog>,
    /// Locale used when a request names none.
    pub default_locale: Locale,
    /// Facility timezone for local time rendering.
    pub timezone: Tz,
}

impl AppState {
    /// Build state from configuration, opening the configured store.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the JSON store
    /// cannot be opened.
    pub fn from_config(config: &ParkingConfig) -> Result<SharedState, ParkingError> {
        config.validate()?;

        let store: Arc<dyn SessionStore> = match config.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory session store; sessions are lost on restart");
                Arc::new(MemoryStore::new())
            }
            StorageBackend::Json => Arc::new(JsonFileStore::open(&config.storage.data_dir)?),
        };
        Ok(Self::with_parts(config, store, Arc::new(SystemClock)))
    }

    /// Build state around an explicit store and clock.
    #[must_use]
    pub fn with_parts(
        config: &ParkingConfig,
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> SharedState {
        let catalog = Arc::new(MessageCatalog::default());
        let tariffs = Arc::new(ConfiguredTariffs::new(config.tariffs, Arc::clone(&catalog)));

        Arc::new(Self {
            service: ParkingService::new(store, clock, tariffs),
            catalog,
            default_locale: config.locale.default,
            timezone: config.facility.tz(),
        })
    }
}
