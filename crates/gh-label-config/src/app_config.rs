//! Bot configuration
//!
//! Configuration loaded from .gh-label-bot.toml, with environment overrides
//! for values that should not live in a file.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_WEBHOOK_SECRET: &str = "GH_LABEL_BOT_WEBHOOK_SECRET";
const ENV_LISTEN_ADDR: &str = "GH_LABEL_BOT_LISTEN_ADDR";
const ENV_APP_ID: &str = "GH_LABEL_BOT_APP_ID";
const ENV_PRIVATE_KEY_PATH: &str = "GH_LABEL_BOT_PRIVATE_KEY_PATH";

/// How loops over independent items react to a failing item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort on the first failing item
    #[default]
    FailFast,
    /// Attempt every item and report all failures at the end
    Collect,
}

/// Bot configuration loaded from .gh-label-bot.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BotConfig {
    /// Address the webhook server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// GitHub Enterprise host; github.com when unset
    #[serde(default)]
    pub github_host: Option<String>,

    /// Webhook secret shared with GitHub; empty disables signature checks
    #[serde(default)]
    pub webhook_secret: String,

    /// GitHub App id; with `private_key_path` the bot authenticates per
    /// installation instead of using a personal token
    #[serde(default)]
    pub app_id: Option<u64>,

    /// PEM encoded RSA private key of the GitHub App
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,

    /// Approvals needed before a PR is labeled "ready to merge"
    #[serde(default = "default_approvals_before_ready_to_merge")]
    pub approvals_before_ready_to_merge: u32,

    /// Upper bound for a single GitHub API call
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Time background jobs get to finish on shutdown
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,

    /// Failure handling for label and repository loops
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Page size when listing organization repositories
    #[serde(default = "default_repositories_per_page")]
    pub repositories_per_page: u8,

    /// Default labels to delete per organization login
    #[serde(default)]
    pub denylists: HashMap<String, Vec<String>>,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_approvals_before_ready_to_merge() -> u32 {
    2
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_shutdown_grace_secs() -> u64 {
    30
}

fn default_repositories_per_page() -> u8 {
    50
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            github_host: None,
            webhook_secret: String::new(),
            app_id: None,
            private_key_path: None,
            approvals_before_ready_to_merge: default_approvals_before_ready_to_merge(),
            request_timeout_secs: default_request_timeout_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
            failure_policy: FailurePolicy::default(),
            repositories_per_page: default_repositories_per_page(),
            denylists: HashMap::new(),
        }
    }
}

impl BotConfig {
    /// Load config from CWD first, then home and config directories, or use defaults
    ///
    /// Environment overrides are applied on top and the result is validated.
    pub fn load() -> Result<Self> {
        let mut config = match crate::load_config_file() {
            Some(content) => {
                let config = Self::from_toml(&content)?;
                log::info!("Loaded bot config from file");
                config
            }
            None => {
                log::debug!("Using default bot config");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse config from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup(ENV_WEBHOOK_SECRET) {
            log::debug!("Using webhook secret from {}", ENV_WEBHOOK_SECRET);
            self.webhook_secret = secret;
        }
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            log::debug!("Using listen address from {}", ENV_LISTEN_ADDR);
            self.listen_addr = addr;
        }
        if let Some(raw) = lookup(ENV_APP_ID) {
            match raw.trim().parse() {
                Ok(app_id) => {
                    log::debug!("Using app id from {}", ENV_APP_ID);
                    self.app_id = Some(app_id);
                }
                Err(e) => log::warn!("Ignoring {}={:?}: {}", ENV_APP_ID, raw, e),
            }
        }
        if let Some(path) = lookup(ENV_PRIVATE_KEY_PATH) {
            log::debug!("Using private key path from {}", ENV_PRIVATE_KEY_PATH);
            self.private_key_path = Some(PathBuf::from(path));
        }
    }

    /// Reject values the bot cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.approvals_before_ready_to_merge < 2 {
            bail!(
                "approvals_before_ready_to_merge must be at least 2, got {}",
                self.approvals_before_ready_to_merge
            );
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }
        if !(1..=100).contains(&self.repositories_per_page) {
            bail!(
                "repositories_per_page must be between 1 and 100, got {}",
                self.repositories_per_page
            );
        }
        if self.app_id.is_some() != self.private_key_path.is_some() {
            bail!("app_id and private_key_path must be set together");
        }
        Ok(())
    }

    /// GitHub App id and key path, when both are configured
    pub fn app_credentials(&self) -> Option<(u64, &Path)> {
        self.app_id.zip(self.private_key_path.as_deref())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
