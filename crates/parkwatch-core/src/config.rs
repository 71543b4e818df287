//! Application configuration management.
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `PARKWATCH__SECTION__KEY` environment variables.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//!
//! [tariffs]
//! car_hourly_rate = 2000
//! motorcycle_hourly_rate = 1000
//!
//! [locale]
//! default = "es"
//!
//! [facility]
//! timezone = "America/Bogota"
//!
//! [storage]
//! backend = "json"
//! data_dir = "/var/lib/parkwatch"
//!
//! [logging]
//! production = false
//! level = "info"
//! directory = "/var/log/parkwatch"
//! file_prefix = "parkwatch"
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::messages::Locale;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "PARKWATCH_CONFIG";

/// Prefix for per-key environment overrides.
pub const ENV_PREFIX: &str = "PARKWATCH";

/// Errors raised while loading, saving or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// The config file could not be written.
    #[error("Failed to write {path}: {source}")]
    WriteError {
        /// Target path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration could not be rendered as TOML.
    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// A single field holds an invalid value.
    #[error("Invalid value for '{field}': {message}")]
    ValidationError {
        /// Dotted field path.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// Several fields are invalid.
    #[error("Configuration has {} errors", .0.len())]
    MultipleValidationErrors(Vec<ConfigError>),
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkingConfig {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Hourly rates.
    pub tariffs: TariffConfig,
    /// Language used when a request does not ask for one.
    pub locale: LocaleConfig,
    /// Facility settings.
    pub facility: FacilityConfig,
    /// Where sessions are kept.
    pub storage: StorageConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Hourly rates per vehicle category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TariffConfig {
    /// Rate per started-and-completed hour for cars.
    pub car_hourly_rate: u64,
    /// Rate per hour for motorcycles.
    pub motorcycle_hourly_rate: u64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            car_hourly_rate: 2000,
            motorcycle_hourly_rate: 1000,
        }
    }
}

/// Locale settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    /// Fallback locale.
    pub default: Locale,
}

/// Facility settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityConfig {
    /// IANA timezone used to render local entry/exit times.
    pub timezone: String,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            timezone: "America/Bogota".to_string(),
        }
    }
}

impl FacilityConfig {
    /// Parsed timezone, UTC if the name is unknown.
    #[must_use]
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}

/// Session store selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile, process-local store.
    Memory,
    /// JSON file under `data_dir`.
    #[default]
    Json,
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Which store to use.
    pub backend: StorageBackend,
    /// Directory for the JSON store.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: crate::store::default_data_dir(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// JSON file logs plus compact stdout instead of pretty stdout.
    pub production: bool,
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for the rolling log files in production.
    pub directory: PathBuf,
    /// Log file name prefix; files roll daily as `<prefix>.<date>.log`.
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            production: false,
            level: "info".to_string(),
            directory: default_log_dir(),
            file_prefix: "parkwatch".to_string(),
        }
    }
}

impl ParkingConfig {
    /// Load configuration from the file named by `PARKWATCH_CONFIG`, or the
    /// platform default path, applying environment overrides.
    ///
    /// A missing file is not an error; defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result is invalid.
    pub fn load() -> ConfigResult<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map_or_else(default_config_path, PathBuf::from);
        Self::load_from(&path)
    }

    /// Load configuration from `path` with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result is invalid.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        tracing::debug!(path = %path.display(), "Loading configuration");

        let loaded: Self = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Self::default())?)
            .add_source(::config::File::from(path).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Write this configuration to `path` as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::WriteError {
                path: parent.display().to_string(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| ConfigError::WriteError {
            path: path.display().to_string(),
            source,
        })
    }

    /// Check every field, collecting all violations.
    ///
    /// # Errors
    ///
    /// Returns the single violation, or `MultipleValidationErrors`.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();
        let mut invalid = |field: &str, message: String| {
            errors.push(ConfigError::ValidationError {
                field: field.to_string(),
                message,
            });
        };

        if self.server.host.parse::<IpAddr>().is_err() {
            invalid(
                "server.host",
                format!("'{}' is not an IP address", self.server.host),
            );
        }
        if self.server.port == 0 {
            invalid("server.port", "must be between 1 and 65535".to_string());
        }
        if self.tariffs.car_hourly_rate == 0 {
            invalid("tariffs.car_hourly_rate", "must be positive".to_string());
        }
        if self.tariffs.motorcycle_hourly_rate == 0 {
            invalid(
                "tariffs.motorcycle_hourly_rate",
                "must be positive".to_string(),
            );
        }
        if self.facility.timezone.parse::<Tz>().is_err() {
            invalid(
                "facility.timezone",
                format!("'{}' is not an IANA timezone", self.facility.timezone),
            );
        }
        if self.storage.backend == StorageBackend::Json
            && self.storage.data_dir.as_os_str().is_empty()
        {
            invalid(
                "storage.data_dir",
                "required for the json backend".to_string(),
            );
        }
        if self.logging.level.trim().is_empty() {
            invalid("logging.level", "must not be empty".to_string());
        }
        if self.logging.production && self.logging.directory.as_os_str().is_empty() {
            invalid(
                "logging.directory",
                "required for production logging".to_string(),
            );
        }
        if self.logging.file_prefix.is_empty() || self.logging.file_prefix.contains('/') {
            invalid(
                "logging.file_prefix",
                format!("'{}' is not a file name", self.logging.file_prefix),
            );
        }

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ConfigError::MultipleValidationErrors(errors)),
        }
    }

    /// Address the HTTP server binds to.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `server.host` is not an IP address.
    pub fn socket_addr(&self) -> ConfigResult<SocketAddr> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::ValidationError {
                field: "server.host".to_string(),
                message: format!("'{}' is not an IP address", self.server.host),
            })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

/// Default config file location.
///
/// On Linux: `/etc/parkwatch/config.toml`.
/// Elsewhere: the platform config directory.
#[must_use]
pub fn default_config_path() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/etc/parkwatch/config.toml")
    }
    #[cfg(not(target_os = "linux"))]
    {
        directories::ProjectDirs::from("", "", "parkwatch").map_or_else(
            || PathBuf::from("./config.toml"),
            |dirs| dirs.config_dir().join("config.toml"),
        )
    }
}

/// Default log directory.
///
/// On Linux: `/var/log/parkwatch`.
/// Elsewhere: a `logs` directory under the platform data directory.
#[must_use]
pub fn default_log_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/var/log/parkwatch")
    }
    #[cfg(not(target_os = "linux"))]
    {
        directories::ProjectDirs::from("", "", "parkwatch")
            .map_or_else(|| PathBuf::from("./logs"), |dirs| dirs.data_dir().join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    /// Held by every test that reads the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_guard() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = ParkingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tariffs.car_hourly_rate, 2000);
        assert_eq!(config.tariffs.motorcycle_hourly_rate, 1000);
        assert_eq!(config.locale.default, Locale::Es);
    }

    #[test]
    fn test_single_violation_reported_directly() {
        let mut config = ParkingConfig::default();
        config.tariffs.car_hourly_rate = 0;
        match config.validate() {
            Err(ConfigError::ValidationError { field, .. }) => {
                assert_eq!(field, "tariffs.car_hourly_rate");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_all_violations_collected() {
        let mut config = ParkingConfig::default();
        config.server.host = "not-an-ip".into();
        config.server.port = 0;
        config.facility.timezone = "Mars/Olympus_Mons".into();
        match config.validate() {
            Err(ConfigError::MultipleValidationErrors(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_save_then_load_from_file() {
        let _env = env_guard();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ParkingConfig::default();
        config.server.port = 8088;
        config.tariffs.car_hourly_rate = 2500;
        config.locale.default = Locale::En;
        config.storage.backend = StorageBackend::Memory;
        config.save(&path).unwrap();

        let loaded = ParkingConfig::load_from(&path).unwrap();
        assert_eq!(loaded.server.port, 8088);
        assert_eq!(loaded.tariffs.car_hourly_rate, 2500);
        assert_eq!(loaded.locale.default, Locale::En);
        assert_eq!(loaded.storage.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let _env = env_guard();
        let dir = tempfile::tempdir().unwrap();
        let loaded = ParkingConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.tariffs, TariffConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let _env = env_guard();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tariffs]\nmotorcycle_hourly_rate = 800\n").unwrap();

        let loaded = ParkingConfig::load_from(&path).unwrap();
        assert_eq!(loaded.tariffs.motorcycle_hourly_rate, 800);
        assert_eq!(loaded.tariffs.car_hourly_rate, 2000);
        assert_eq!(loaded.server.port, 3000);
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let _env = env_guard();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[facility]\ntimezone = \"Nowhere/Special\"\n").unwrap();

        assert!(matches!(
            ParkingConfig::load_from(&path),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_socket_addr() {
        let config = ParkingConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_facility_tz_falls_back_to_utc() {
        let facility = FacilityConfig {
            timezone: "bogus".into(),
        };
        assert_eq!(facility.tz(), chrono_tz::UTC);
        assert_eq!(FacilityConfig::default().tz(), chrono_tz::America::Bogota);
    }

    #[test]
    fn test_environment_overrides_file() {
        let _env = env_guard();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 4000\n").unwrap();

        std::env::set_var("PARKWATCH__SERVER__PORT", "8181");
        std::env::set_var("PARKWATCH__TARIFFS__CAR_HOURLY_RATE", "2600");
        let loaded = ParkingConfig::load_from(&path);
        std::env::remove_var("PARKWATCH__SERVER__PORT");
        std::env::remove_var("PARKWATCH__TARIFFS__CAR_HOURLY_RATE");

        let loaded = loaded.unwrap();
        assert_eq!(loaded.server.port, 8181);
        assert_eq!(loaded.tariffs.car_hourly_rate, 2600);
        assert_eq!(loaded.tariffs.motorcycle_hourly_rate, 1000);
    }

    #[test]
    fn test_logging_settings_validated() {
        let mut config = ParkingConfig::default();
        config.logging.production = true;
        config.logging.directory = PathBuf::new();
        config.logging.file_prefix = "logs/parkwatch".into();
        match config.validate() {
            Err(ConfigError::MultipleValidationErrors(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
