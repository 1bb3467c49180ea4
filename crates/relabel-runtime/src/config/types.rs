//! Configuration types.
//!
//! All types implement [`Default`] for compile-time fallback values.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure, after merging all layers.
///
/// # Example
///
/// ```
/// use relabel_runtime::config::RelabelConfig;
///
/// let config = RelabelConfig::default();
/// assert!(!config.debug);
/// assert_eq!(config.api.base_url, "http://127.0.0.1:5000");
/// assert_eq!(config.history.restore_timeout_ms, 500);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RelabelConfig {
    /// Enable debug mode (verbose logging).
    pub debug: bool,

    /// Label service connection.
    pub api: ApiConfig,

    /// Undo/redo settings.
    pub history: HistoryConfig,

    /// Local project cache.
    pub store: StoreConfig,

    /// File logging.
    pub logging: LoggingConfig,
}

impl RelabelConfig {
    /// Creates a config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserializes from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` override values in `self` only if they differ
    /// from the default.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.debug != default.debug {
            self.debug = other.debug;
        }

        self.api.merge(&other.api);
        self.history.merge(&other.history);
        self.store.merge(&other.store);
        self.logging.merge(&other.logging);
    }
}

/// Label service connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".into(),
            timeout_ms: 30_000,
        }
    }
}

impl ApiConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.base_url != default.base_url {
            self.base_url = other.base_url.clone();
        }
        if other.timeout_ms != default.timeout_ms {
            self.timeout_ms = other.timeout_ms;
        }
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Undo/redo settings.
///
/// # Example TOML
///
/// ```toml
/// [history]
/// restore_timeout_ms = 250
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// How long a history actor waits for `RESTORED` before giving up.
    pub restore_timeout_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            restore_timeout_ms: 500,
        }
    }
}

impl HistoryConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.restore_timeout_ms != default.restore_timeout_ms {
            self.restore_timeout_ms = other.restore_timeout_ms;
        }
    }

    /// Restore acknowledgment window as a [`Duration`].
    #[must_use]
    pub fn restore_timeout(&self) -> Duration {
        Duration::from_millis(self.restore_timeout_ms)
    }
}

/// Local project cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory. `None` means `~/.relabel/db`.
    pub dir: Option<PathBuf>,

    /// Database name under `dir`.
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: None,
            database: "relabel".into(),
        }
    }
}

impl StoreConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.dir.is_some() {
            self.dir = other.dir.clone();
        }
        if other.database != default.database {
            self.database = other.database.clone();
        }
    }

    /// Returns the store directory, falling back to the default.
    #[must_use]
    pub fn dir_or_default(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(crate::persistence::default_store_path)
    }
}

/// File logging.
///
/// Terminal logging is controlled by CLI flags and `RUST_LOG`; this
/// section only configures the optional log file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write logs to a file.
    pub file: bool,

    /// Filter directive for the file (`debug`, `relabel_runtime=trace`, ...).
    pub file_level: String,

    /// Log directory. `None` means `~/.relabel/logs`.
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: false,
            file_level: "debug".into(),
            file_path: None,
        }
    }
}

impl LoggingConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.file != default.file {
            self.file = other.file;
        }
        if other.file_level != default.file_level {
            self.file_level = other.file_level.clone();
        }
        if other.file_path.is_some() {
            self.file_path = other.file_path.clone();
        }
    }

    /// Returns the log directory, falling back to `~/.relabel/logs`.
    #[must_use]
    pub fn file_path_or_default(&self) -> PathBuf {
        self.file_path
            .clone()
            .unwrap_or_else(|| super::default_config_dir().join("logs"))
    }
}
