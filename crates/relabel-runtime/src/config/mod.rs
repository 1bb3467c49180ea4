//! Configuration management with hierarchical layering.
//!
//! # Architecture
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌─────────────────────────────────────────────┐
//! │  1. CLI flags (ConfigResolver)              │  Invocation override
//! ├─────────────────────────────────────────────┤
//! │  2. Environment Variables (RELABEL_*)       │  Runtime override
//! ├─────────────────────────────────────────────┤
//! │  3. Project Config (.relabel/config.toml)   │  Project-specific
//! ├─────────────────────────────────────────────┤
//! │  4. Global Config (~/.relabel/config.toml)  │  User defaults
//! ├─────────────────────────────────────────────┤
//! │  5. Default Values (compile-time)           │  Fallback
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Directory Structure
//!
//! ```text
//! ~/.relabel/
//! ├── config.toml                  # Global configuration
//! ├── db/                          # Local project cache
//! │   └── relabel/projects/{id}.json
//! └── logs/                        # Log files (when logging.file = true)
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `RELABEL_DEBUG` | `debug` | bool |
//! | `RELABEL_API_URL` | `api.base_url` | String |
//! | `RELABEL_API_TIMEOUT_MS` | `api.timeout_ms` | u64 |
//! | `RELABEL_RESTORE_TIMEOUT_MS` | `history.restore_timeout_ms` | u64 |
//! | `RELABEL_STORE_DIR` | `store.dir` | PathBuf |
//! | `RELABEL_LOG_FILE` | `logging.file` | bool |
//! | `RELABEL_LOG_LEVEL` | `logging.file_level` | String |
//!
//! # Example Configuration
//!
//! ```toml
//! debug = false
//!
//! [api]
//! base_url = "http://127.0.0.1:5000"
//! timeout_ms = 30000
//!
//! [history]
//! restore_timeout_ms = 500
//!
//! [store]
//! dir = "~/.relabel/db"
//! database = "relabel"
//!
//! [logging]
//! file = true
//! file_level = "debug"
//! ```

mod error;
mod loader;
mod resolver;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use resolver::{ConfigResolver, NoOpResolver};
pub use types::{ApiConfig, HistoryConfig, LoggingConfig, RelabelConfig, StoreConfig};

/// Default global relabel directory.
#[must_use]
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".relabel")
}

/// Default global config file path.
#[must_use]
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".relabel";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
