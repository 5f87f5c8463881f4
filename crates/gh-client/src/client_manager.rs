//! Installation-scoped label store provider
//!
//! Webhook events name the installation they belong to. The provider turns
//! that installation id into a ready-to-use label store.

use crate::{LabelStore, OctocrabClient, TimeoutLabelStore, DEFAULT_HOST};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use jsonwebtoken::EncodingKey;
use log::{debug, info};
use octocrab::models::{AppId, InstallationId};
use octocrab::Octocrab;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Resolves a label store for a GitHub App installation
#[async_trait]
pub trait ClientProvider: Send + Sync {
    async fn for_installation(&self, installation_id: u64) -> Result<Arc<dyn LabelStore>>;
}

/// Where [`TokenResolver`] found a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// `GITHUB_TOKEN_<HOST>`, e.g. `GITHUB_TOKEN_GHE_EXAMPLE_COM`
    HostEnv,
    /// `GITHUB_TOKEN` or `GH_TOKEN`, github.com only
    DefaultEnv,
    /// `gh auth token --hostname <host>`
    GhCli,
}

type EnvLookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Finds the API token the bot authenticates with
///
/// Environment variables come first since the bot normally runs headless;
/// the `gh` CLI is a fallback for running it from a developer machine.
pub struct TokenResolver {
    lookup: EnvLookup,
    use_gh_cli: bool,
}

impl TokenResolver {
    pub fn from_env() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
            use_gh_cli: true,
        }
    }

    pub fn without_gh_cli(mut self) -> Self {
        self.use_gh_cli = false;
        self
    }

    fn env(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|value| !value.trim().is_empty())
    }

    /// Resolve a token for `host` (github.com when `None`)
    pub async fn resolve(&self, host: Option<&str>) -> Result<(String, TokenSource)> {
        let host = host.unwrap_or(DEFAULT_HOST);

        let host_key = host_env_key(host);
        if let Some(token) = self.env(&host_key) {
            info!("Using GitHub token from {}", host_key);
            return Ok((token, TokenSource::HostEnv));
        }

        if host == DEFAULT_HOST {
            for key in DEFAULT_TOKEN_KEYS {
                if let Some(token) = self.env(key) {
                    info!("Using GitHub token from {}", key);
                    return Ok((token, TokenSource::DefaultEnv));
                }
            }
        }

        if self.use_gh_cli {
            if let Some(token) = gh_cli_token(host).await? {
                info!("Using GitHub token from gh CLI for {}", host);
                return Ok((token, TokenSource::GhCli));
            }
        }

        Err(anyhow!(
            "No GitHub token for {}: set {} (or GITHUB_TOKEN for github.com) \
             or run 'gh auth login --hostname {}'",
            host,
            host_key,
            host
        ))
    }
}

const DEFAULT_TOKEN_KEYS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

fn host_env_key(host: &str) -> String {
    let suffix: String = host
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("GITHUB_TOKEN_{}", suffix)
}

async fn gh_cli_token(host: &str) -> Result<Option<String>> {
    let output = match tokio::process::Command::new("gh")
        .args(["auth", "token", "--hostname", host])
        .output()
        .await
    {
        Ok(output) => output,
        Err(e) => {
            debug!("gh CLI not available: {}", e);
            return Ok(None);
        }
    };

    if !output.status.success() {
        debug!("gh auth token failed for {}", host);
        return Ok(None);
    }

    let token = String::from_utf8(output.stdout).context("gh auth token printed invalid UTF-8")?;
    let token = token.trim();
    Ok((!token.is_empty()).then(|| token.to_string()))
}

/// Provider that serves every installation with one token-authenticated client
///
/// Suitable for a bot running under a single installation token or a
/// personal access token with access to all target organizations.
pub struct TokenClientProvider {
    store: Arc<dyn LabelStore>,
}

impl TokenClientProvider {
    /// Build the provider from a token, bounding each call by `timeout`
    pub fn new(token: String, host: Option<&str>, timeout: Duration) -> Result<Self> {
        let effective_host = host.unwrap_or(DEFAULT_HOST);
        info!("Creating GitHub client for host: {}", effective_host);

        let mut builder = Octocrab::builder().personal_token(token);
        if let Some(uri) = enterprise_base_uri(effective_host) {
            builder = builder.base_uri(uri).context("Failed to set base URI")?;
        }

        let octocrab = builder.build().context("Failed to build Octocrab client")?;
        let store = TimeoutLabelStore::new(OctocrabClient::new(Arc::new(octocrab)), timeout);

        Ok(Self::from_store(Arc::new(store)))
    }

    /// Serve a prebuilt store for every installation
    pub fn from_store(store: Arc<dyn LabelStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ClientProvider for TokenClientProvider {
    async fn for_installation(&self, installation_id: u64) -> Result<Arc<dyn LabelStore>> {
        debug!("Using shared client for installation {}", installation_id);
        Ok(Arc::clone(&self.store))
    }
}

/// API root for a GitHub Enterprise host; `None` for github.com
fn enterprise_base_uri(host: &str) -> Option<String> {
    (host != DEFAULT_HOST).then(|| format!("https://{}/api/v3", host))
}

/// Provider that authenticates as a GitHub App
///
/// Each installation gets its own client holding an installation access
/// token. Octocrab mints the token from the app JWT on first use and renews
/// it when it expires, so clients are cached per installation.
pub struct AppClientProvider {
    app: Octocrab,
    timeout: Duration,
    stores: Mutex<HashMap<u64, Arc<dyn LabelStore>>>,
}

impl AppClientProvider {
    /// Build the provider from the app id and a PEM key file
    pub fn from_key_file(
        app_id: u64,
        key_path: &Path,
        host: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        let pem = std::fs::read(key_path)
            .with_context(|| format!("Failed to read private key {}", key_path.display()))?;
        Self::new(app_id, &pem, host, timeout)
    }

    /// Build the provider from the app id and PEM encoded RSA key
    pub fn new(app_id: u64, pem: &[u8], host: Option<&str>, timeout: Duration) -> Result<Self> {
        let effective_host = host.unwrap_or(DEFAULT_HOST);
        info!("Creating GitHub App {} client for host: {}", app_id, effective_host);

        let base_uri = enterprise_base_uri(effective_host);
        Self::with_base_uri(app_id, pem, base_uri.as_deref(), timeout)
    }

    /// Like [`AppClientProvider::new`] with an explicit API root
    pub fn with_base_uri(
        app_id: u64,
        pem: &[u8],
        base_uri: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        let key = EncodingKey::from_rsa_pem(pem).context("Invalid GitHub App private key")?;

        let mut builder = Octocrab::builder().app(AppId(app_id), key);
        if let Some(uri) = base_uri {
            builder = builder.base_uri(uri).context("Failed to set base URI")?;
        }
        let app = builder.build().context("Failed to build Octocrab client")?;

        Ok(Self {
            app,
            timeout,
            stores: Mutex::new(HashMap::new()),
        })
    }
}

#[async_trait]
impl ClientProvider for AppClientProvider {
    async fn for_installation(&self, installation_id: u64) -> Result<Arc<dyn LabelStore>> {
        let mut stores = self.stores.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(store) = stores.get(&installation_id) {
            return Ok(Arc::clone(store));
        }

        debug!("Creating client for installation {}", installation_id);
        let octocrab = self
            .app
            .installation(InstallationId(installation_id))
            .with_context(|| format!("No client for installation {}", installation_id))?;
        let store: Arc<dyn LabelStore> = Arc::new(TimeoutLabelStore::new(
            OctocrabClient::new(Arc::new(octocrab)),
            self.timeout,
        ));
        stores.insert(installation_id, Arc::clone(&store));
        Ok(store)
    }
}
