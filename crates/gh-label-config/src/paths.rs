//! Configuration directory paths
//!
//! Uses XDG directories via `dirs` crate with fallbacks.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/gh-label-bot/`
//! - macOS: `~/Library/Application Support/gh-label-bot/`
//! - Windows: `%APPDATA%\gh-label-bot\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "gh-label-bot";

/// Get the application config directory (not created)
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join(APP_NAME))
}

/// Get path to app config file
pub fn app_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}
