//! Configuration for gh-label-bot
//!
//! This crate provides:
//! - Config file lookup (TOML)
//! - Bot configuration (BotConfig) with environment overrides
//! - Config directory paths

pub mod app_config;
pub mod config_file;
pub mod paths;

pub use app_config::{BotConfig, FailurePolicy};
pub use config_file::load_config_file;
pub use paths::{app_config_path, config_dir};
