//! TOML-based configuration for the explode engine.
//!
//! Example configuration:
//! ```toml
//! [explode]
//! policy = "constrained"   # or "marker"
//! max_dims = 3             # used when a row does not carry its own
//! global = true            # used when a row does not carry its own
//! sentinel = "/G"
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::explode::driver::{validate_sentinel, GLOBAL_UNIT};
use crate::explode::policy::ExplodePolicy;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "xunit.toml";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Engine configuration.
    pub explode: ExplodeSettings,

    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExplodeSettings {
    /// Partition rule and inclusion predicate.
    pub policy: ExplodePolicy,

    /// Maximum combined dimensionality for rows that do not set one.
    pub max_dims: usize,

    /// Global flag for rows that do not set one.
    pub global: bool,

    /// Reserved key emitted once per row in global mode.
    pub sentinel: String,
}

impl Default for ExplodeSettings {
    fn default() -> Self {
        Self {
            policy: ExplodePolicy::default(),
            max_dims: 3,
            global: true,
            sentinel: GLOBAL_UNIT.to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. "info" or "xunit=debug".
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load `path` if given, else `xunit.toml` when present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate settings from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_sentinel(&self.explode.sentinel)
            .map_err(|e| SettingsError::InvalidConfig(e.to_string()))?;
        if self.logging.level.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
