//! Routes parsed webhook events to their handlers
//!
//! - installation created: bootstrap every repository of the organization as
//!   a background job, acknowledged immediately
//! - review submitted / PR labeled: recompute review labels before replying;
//!   failures are logged but still acknowledged
//! - repository created: bootstrap the repository before replying; failures
//!   are reported back to GitHub

use crate::background::BackgroundJobs;
use crate::bootstrap::Bootstrapper;
use crate::events::WebhookEvent;
use crate::review_state::ReviewStateMachine;
use gh_client::{ClientProvider, PullRequestRef, RepoRef};
use gh_label_config::BotConfig;
use log::{error, info};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Accepted,
    Failed(String),
}

pub struct EventDispatcher {
    clients: Arc<dyn ClientProvider>,
    bootstrapper: Arc<Bootstrapper>,
    reviews: ReviewStateMachine,
    jobs: Arc<BackgroundJobs>,
}

impl EventDispatcher {
    pub fn new(
        clients: Arc<dyn ClientProvider>,
        bootstrapper: Bootstrapper,
        reviews: ReviewStateMachine,
        jobs: Arc<BackgroundJobs>,
    ) -> Self {
        Self {
            clients,
            bootstrapper: Arc::new(bootstrapper),
            reviews,
            jobs,
        }
    }

    pub fn from_config(
        config: &BotConfig,
        clients: Arc<dyn ClientProvider>,
        jobs: Arc<BackgroundJobs>,
    ) -> Self {
        Self::new(
            clients,
            Bootstrapper::from_config(config),
            ReviewStateMachine::from_config(config),
            jobs,
        )
    }

    pub fn jobs(&self) -> &Arc<BackgroundJobs> {
        &self.jobs
    }

    pub async fn dispatch(&self, event: WebhookEvent) -> DispatchOutcome {
        match event {
            WebhookEvent::InstallationCreated {
                installation_id,
                org,
            } => {
                self.spawn_installation_bootstrap(installation_id, org);
                DispatchOutcome::Accepted
            }
            WebhookEvent::PullRequestReviewSubmitted {
                installation_id,
                pull_request,
            }
            | WebhookEvent::PullRequestLabeled {
                installation_id,
                pull_request,
            } => {
                self.sync_review_labels(installation_id, &pull_request)
                    .await;
                DispatchOutcome::Accepted
            }
            WebhookEvent::RepositoryCreated {
                installation_id,
                repo,
            } => self.bootstrap_repository(installation_id, &repo).await,
            WebhookEvent::Ignored { event_type, action } => {
                info!(
                    "Skipping event {} (action {})",
                    event_type,
                    action.as_deref().unwrap_or("none")
                );
                DispatchOutcome::Accepted
            }
        }
    }

    fn spawn_installation_bootstrap(&self, installation_id: u64, org: String) {
        info!("Installation {} created for {}", installation_id, org);

        let clients = Arc::clone(&self.clients);
        let bootstrapper = Arc::clone(&self.bootstrapper);
        let name = format!("bootstrap {} (installation {})", org, installation_id);
        self.jobs.spawn(name, async move {
            let store = clients.for_installation(installation_id).await?;
            bootstrapper
                .ensure_labels_for_all_repositories(store.as_ref(), &org)
                .await?;
            Ok(())
        });
    }

    async fn sync_review_labels(&self, installation_id: u64, pr: &PullRequestRef) {
        let store = match self.clients.for_installation(installation_id).await {
            Ok(store) => store,
            Err(e) => {
                error!(
                    "Cannot get client for installation {}: {:#}",
                    installation_id, e
                );
                return;
            }
        };

        if let Err(e) = self.reviews.sync_pull_request(store.as_ref(), pr).await {
            error!("Could not update review labels for PR {}: {}", pr.url, e);
        }
    }

    async fn bootstrap_repository(&self, installation_id: u64, repo: &RepoRef) -> DispatchOutcome {
        info!("Repository {} created", repo);

        let store = match self.clients.for_installation(installation_id).await {
            Ok(store) => store,
            Err(e) => {
                error!(
                    "Cannot get client for installation {}: {:#}",
                    installation_id, e
                );
                return DispatchOutcome::Failed(format!("no client for installation: {:#}", e));
            }
        };

        match self.bootstrapper.ensure_labels(store.as_ref(), repo).await {
            Ok(()) => DispatchOutcome::Accepted,
            Err(e) => {
                error!("Could not create labels for repository {}: {}", repo, e);
                DispatchOutcome::Failed(format!("could not create labels for {}: {}", repo, e))
            }
        }
    }
}
