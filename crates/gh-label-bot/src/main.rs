use anyhow::{Context, Result};
use gh_client::{AppClientProvider, ClientProvider, TokenClientProvider, TokenResolver};
use gh_label_bot::{logger, router, BackgroundJobs, EventDispatcher, ServerState};
use gh_label_config::BotConfig;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();

    // Load .env file if GITHUB_TOKEN not set
    if std::env::var("GITHUB_TOKEN").is_err() {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded .env file from: {:?}", path),
            Err(_) => log::debug!(".env file not found, will rely on environment variables"),
        }
    }

    let config = BotConfig::load().context("Failed to load bot configuration")?;
    let clients = client_provider(&config).await?;

    let jobs = Arc::new(BackgroundJobs::new());
    let dispatcher = EventDispatcher::from_config(&config, clients, Arc::clone(&jobs));
    let state = ServerState::new(Arc::new(dispatcher), &config.webhook_secret);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    log::info!("Listening for webhooks on {}", config.listen_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Webhook server failed")?;

    let aborted = jobs.shutdown(config.shutdown_grace()).await;
    if aborted > 0 {
        log::warn!("{} background jobs did not finish before shutdown", aborted);
    }
    log::info!("Shutdown complete");
    Ok(())
}

/// GitHub App credentials when configured, otherwise a personal token
async fn client_provider(config: &BotConfig) -> Result<Arc<dyn ClientProvider>> {
    let host = config.github_host.as_deref();

    if let Some((app_id, key_path)) = config.app_credentials() {
        log::info!("Authenticating as GitHub App {}", app_id);
        let provider =
            AppClientProvider::from_key_file(app_id, key_path, host, config.request_timeout())?;
        return Ok(Arc::new(provider));
    }

    let (token, source) = TokenResolver::from_env()
        .resolve(host)
        .await
        .context("Failed to resolve GitHub token")?;
    log::debug!("GitHub token source: {:?}", source);
    let provider = TokenClientProvider::new(token, host, config.request_timeout())?;
    Ok(Arc::new(provider))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Received Ctrl-C, shutting down"),
        Err(e) => log::error!("Failed to listen for Ctrl-C: {}", e),
    }
}
