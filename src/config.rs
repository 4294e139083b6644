//! Configuration loading for Courier.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Get the Courier home directory (~/.courier).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".courier"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.courier/settings.json
pub fn load_settings() -> Result<Settings> {
    load_settings_from(&get_settings_path()?)
}

/// Load settings from a specific file. A missing file yields defaults.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        tracing::debug!("No settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;

    validate_settings(&settings)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.bus.source_address.trim().is_empty() {
        return Err(Error::Config("bus.source_address must not be empty".to_string()));
    }
    if settings.bus.publish_prefix.is_empty() {
        return Err(Error::Config("bus.publish_prefix must not be empty".to_string()));
    }
    Ok(())
}

/// Load settings or return default if they cannot be read.
pub fn load_settings_or_default() -> Settings {
    load_settings().unwrap_or_else(|e| {
        tracing::warn!("Failed to load settings: {}, using defaults", e);
        Settings::default()
    })
}

/// Bus endpoint configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BusSettings {
    /// Address stamped as `SourceAddress` on every outbound message
    #[serde(default = "default_source_address")]
    pub source_address: String,
    /// Prefix of publish destinations: `<prefix><message type>`
    #[serde(default = "default_publish_prefix")]
    pub publish_prefix: String,
}

fn default_source_address() -> String {
    "queue:courier".to_string()
}

fn default_publish_prefix() -> String {
    "topic:".to_string()
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            source_address: default_source_address(),
            publish_prefix: default_publish_prefix(),
        }
    }
}

/// Logging configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Logging {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: Option<String>,
    /// Directory for rotated log files
    pub log_dir: Option<PathBuf>,
    /// Write the log file as JSON lines instead of text
    #[serde(default)]
    pub json: bool,
}

/// Courier settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub bus: BusSettings,

    #[serde(default)]
    pub logging: Logging,
}
