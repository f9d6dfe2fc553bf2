//! Configuration module for skedit

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths;

/// Environment variable that overrides the configured backend URL
pub const API_URL_ENV: &str = "SKEDIT_API_URL";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the scheduling backend (no trailing slash needed)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds (0 = wait indefinitely)
    #[serde(default)]
    pub request_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: 0,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        paths::config_path()
    }

    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        let mut config = Self::load_from(&path)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.apply_api_url_override(&url);
        }
        Ok(config)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Replace the backend URL unless the override is blank
    pub fn apply_api_url_override(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.api_base_url = url.to_string();
        }
    }

    /// Request timeout, if one is configured
    pub const fn request_timeout(&self) -> Option<std::time::Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(std::time::Duration::from_secs(self.request_timeout_secs))
        }
    }
}
