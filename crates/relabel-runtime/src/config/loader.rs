//! Configuration loader with hierarchical merging.
//!
//! # Load Order
//!
//! 1. Default values (compile-time)
//! 2. Global config (`~/.relabel/config.toml`)
//! 3. Project config (`<project_root>/.relabel/config.toml`)
//! 4. Environment variables (`RELABEL_*`)
//!
//! Each layer overrides the previous. The merged result is validated
//! before it is returned.

use super::{default_config_path, ConfigError, RelabelConfig, PROJECT_CONFIG_DIR, PROJECT_CONFIG_FILE};
use std::path::{Path, PathBuf};
use tracing::debug;

macro_rules! parse_env_bool {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var($var, "expected bool"))?;
        }
    };
}

macro_rules! parse_env_u64 {
    ($field:expr, $var:literal) => {
        if let Ok(val) = std::env::var($var) {
            $field = val
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::invalid_env_var($var, "expected integer"))?;
        }
    };
}

/// Configuration loader with builder pattern.
///
/// # Example
///
/// ```
/// use relabel_runtime::config::ConfigLoader;
///
/// let config = ConfigLoader::new()
///     .skip_global_config()
///     .skip_project_config()
///     .skip_env_vars()
///     .load()
///     .unwrap();
/// assert_eq!(config.store.database, "relabel");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    global_config_path: Option<PathBuf>,
    project_root: Option<PathBuf>,
    skip_env: bool,
    skip_global: bool,
    skip_project: bool,
}

impl ConfigLoader {
    /// Creates a loader with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom global config path.
    #[must_use]
    pub fn with_global_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.global_config_path = Some(path.into());
        self
    }

    /// Sets the project root; project config is read from
    /// `<project_root>/.relabel/config.toml`.
    #[must_use]
    pub fn with_project_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_root = Some(path.into());
        self
    }

    /// Skips environment variable loading.
    #[must_use]
    pub fn skip_env_vars(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Skips global config loading.
    #[must_use]
    pub fn skip_global_config(mut self) -> Self {
        self.skip_global = true;
        self
    }

    /// Skips project config loading.
    #[must_use]
    pub fn skip_project_config(mut self) -> Self {
        self.skip_project = true;
        self
    }

    /// Loads and merges configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a config file exists but cannot be read
    /// or parsed, an environment variable is malformed, or the merged
    /// values are unusable. Missing config files are ignored.
    pub fn load(&self) -> Result<RelabelConfig, ConfigError> {
        let mut config = RelabelConfig::default();

        if !self.skip_global {
            let global_path = self
                .global_config_path
                .clone()
                .unwrap_or_else(default_config_path);

            if let Some(global_config) = load_file(&global_path)? {
                debug!(path = %global_path.display(), "Loaded global config");
                config.merge(&global_config);
            }
        }

        if !self.skip_project {
            if let Some(project_root) = &self.project_root {
                let path = project_root
                    .join(PROJECT_CONFIG_DIR)
                    .join(PROJECT_CONFIG_FILE);

                if let Some(project_config) = load_file(&path)? {
                    debug!(path = %path.display(), "Loaded project config");
                    config.merge(&project_config);
                }
            }
        }

        if !self.skip_env {
            apply_env_vars(&mut config)?;
        }

        validate(&config)?;
        Ok(config)
    }
}

fn load_file(path: &Path) -> Result<Option<RelabelConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let config =
        RelabelConfig::from_toml(&content).map_err(|e| ConfigError::parse_toml(path, e))?;

    Ok(Some(config))
}

fn apply_env_vars(config: &mut RelabelConfig) -> Result<(), ConfigError> {
    parse_env_bool!(config.debug, "RELABEL_DEBUG");
    parse_env_bool!(config.logging.file, "RELABEL_LOG_FILE");

    parse_env_u64!(config.api.timeout_ms, "RELABEL_API_TIMEOUT_MS");
    parse_env_u64!(config.history.restore_timeout_ms, "RELABEL_RESTORE_TIMEOUT_MS");

    if let Ok(val) = std::env::var("RELABEL_API_URL") {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("RELABEL_LOG_LEVEL") {
        config.logging.file_level = val;
    }
    if let Ok(val) = std::env::var("RELABEL_STORE_DIR") {
        config.store.dir = Some(PathBuf::from(val));
    }

    Ok(())
}

fn validate(config: &RelabelConfig) -> Result<(), ConfigError> {
    let url = config.api.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::invalid_value(
            "api.base_url",
            format!("expected http(s) URL, got '{url}'"),
        ));
    }
    if config.history.restore_timeout_ms == 0 {
        return Err(ConfigError::invalid_value(
            "history.restore_timeout_ms",
            "must be positive",
        ));
    }
    if config.store.database.is_empty() {
        return Err(ConfigError::invalid_value("store.database", "must not be empty"));
    }
    Ok(())
}

/// Parses a boolean from string.
///
/// Accepts: "true", "false", "1", "0", "yes", "no", "on", "off"
/// (case-insensitive).
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
