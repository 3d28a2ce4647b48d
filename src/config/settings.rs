//! Console settings (where the backend lives, how long to wait for it)
//!
//! Stored as TOML in the platform config directory. Unlike the remote
//! configuration document, these settings never leave this machine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants::gateway::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Make `status` keep watching as if `--watch` was given
    #[serde(default)]
    pub auto_refresh: bool,
}

fn default_gateway_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            request_timeout_ms: default_request_timeout_ms(),
            log_level: default_log_level(),
            auto_refresh: false,
        }
    }
}

impl ConsoleSettings {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::settings::APP_DIR);
        path.push(crate::constants::settings::FILENAME);
        path
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Load from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Settings file not found, creating default settings at {:?}", path);
            let settings = ConsoleSettings::default();
            settings.save_to(path)?;
            return Ok(settings);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;

        let settings: ConsoleSettings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from {:?}", path))?;

        info!(gateway = %settings.gateway_url, "Loaded console settings");
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize settings to TOML")?;

        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;

        info!("Saved settings to {:?}", path);
        Ok(())
    }
}
