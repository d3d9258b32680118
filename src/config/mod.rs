//! Configuration module.
//!
//! Handles the TOML settings file and its defaults.

mod settings;

pub use settings::{
    ExplodeSettings, LoggingSettings, Settings, SettingsError, DEFAULT_CONFIG_FILE,
};
