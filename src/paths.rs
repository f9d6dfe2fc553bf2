//! Common paths for skedit data storage
//!
//! All skedit data is stored under ~/.config/skedit/ on all platforms:
//! - config.toml - User configuration
//! - storage.enc - Encrypted durable storage (tokens, theme)

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the skedit data directory (~/.config/skedit/)
///
/// This is consistent across all platforms for simplicity.
pub fn skedit_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let skedit_dir = home.join(".config").join("skedit");
    fs::create_dir_all(&skedit_dir).context("Failed to create skedit directory")?;
    Ok(skedit_dir)
}

/// Get the config file path (~/.config/skedit/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(skedit_dir()?.join("config.toml"))
}

/// Get the durable storage file path (~/.config/skedit/storage.enc)
pub fn storage_path() -> Result<PathBuf> {
    Ok(skedit_dir()?.join("storage.enc"))
}
