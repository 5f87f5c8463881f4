//! Webhook event parsing
//!
//! Only the handful of fields the bot acts on are deserialized. Anything the
//! bot has no handler for becomes [`WebhookEvent::Ignored`] instead of an
//! error, so GitHub never sees a failure for events we simply don't care
//! about.

use gh_client::{PullRequestRef, RepoRef};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// The app was installed on an organization
    InstallationCreated { installation_id: u64, org: String },
    /// A review was submitted, edited or dismissed
    PullRequestReviewSubmitted {
        installation_id: u64,
        pull_request: PullRequestRef,
    },
    /// A label was attached to a pull request
    PullRequestLabeled {
        installation_id: u64,
        pull_request: PullRequestRef,
    },
    RepositoryCreated {
        installation_id: u64,
        repo: RepoRef,
    },
    Ignored {
        event_type: String,
        action: Option<String>,
    },
}

impl WebhookEvent {
    pub fn installation_id(&self) -> Option<u64> {
        match self {
            WebhookEvent::InstallationCreated {
                installation_id, ..
            }
            | WebhookEvent::PullRequestReviewSubmitted {
                installation_id, ..
            }
            | WebhookEvent::PullRequestLabeled {
                installation_id, ..
            }
            | WebhookEvent::RepositoryCreated {
                installation_id, ..
            } => Some(*installation_id),
            WebhookEvent::Ignored { .. } => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Account {
    login: String,
}

#[derive(Debug, Deserialize)]
struct Installation {
    id: u64,
    #[serde(default)]
    account: Option<Account>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    name: String,
    owner: Account,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    number: u64,
    url: String,
}

/// Fields shared by all handled payloads, each optional so one struct fits all
#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    installation: Option<Installation>,
    #[serde(default)]
    organization: Option<Account>,
    #[serde(default)]
    repository: Option<Repository>,
    #[serde(default)]
    pull_request: Option<PullRequest>,
}

#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{event_type} payload is missing `{field}`")]
    MissingField {
        event_type: String,
        field: &'static str,
    },
}

/// Parse a webhook delivery given its `X-GitHub-Event` type and raw body
pub fn parse_event(event_type: &str, body: &[u8]) -> Result<WebhookEvent, EventError> {
    let payload: Payload = serde_json::from_slice(body)?;
    let action = payload.action.as_deref();

    let missing = |field: &'static str| EventError::MissingField {
        event_type: event_type.to_string(),
        field,
    };

    let event = match (event_type, action) {
        ("installation", Some("created")) => {
            let installation = payload.installation.ok_or_else(|| missing("installation"))?;
            let org = installation
                .account
                .ok_or_else(|| missing("installation.account"))?
                .login;
            WebhookEvent::InstallationCreated {
                installation_id: installation.id,
                org,
            }
        }
        ("pull_request_review", _) => {
            let installation_id = payload
                .installation
                .ok_or_else(|| missing("installation"))?
                .id;
            let repo = payload.repository.ok_or_else(|| missing("repository"))?;
            let pr = payload
                .pull_request
                .ok_or_else(|| missing("pull_request"))?;
            let owner = payload
                .organization
                .map(|o| o.login)
                .unwrap_or(repo.owner.login);
            WebhookEvent::PullRequestReviewSubmitted {
                installation_id,
                pull_request: PullRequestRef::new(
                    RepoRef::new(owner, repo.name),
                    pr.number,
                    pr.url,
                ),
            }
        }
        ("pull_request", Some("labeled")) => {
            let installation_id = payload
                .installation
                .ok_or_else(|| missing("installation"))?
                .id;
            let repo = payload.repository.ok_or_else(|| missing("repository"))?;
            let pr = payload
                .pull_request
                .ok_or_else(|| missing("pull_request"))?;
            WebhookEvent::PullRequestLabeled {
                installation_id,
                pull_request: PullRequestRef::new(
                    RepoRef::new(repo.owner.login, repo.name),
                    pr.number,
                    pr.url,
                ),
            }
        }
        ("repository", Some("created")) => {
            let installation_id = payload
                .installation
                .ok_or_else(|| missing("installation"))?
                .id;
            let repo = payload.repository.ok_or_else(|| missing("repository"))?;
            let owner = payload
                .organization
                .map(|o| o.login)
                .unwrap_or(repo.owner.login);
            WebhookEvent::RepositoryCreated {
                installation_id,
                repo: RepoRef::new(owner, repo.name),
            }
        }
        _ => WebhookEvent::Ignored {
            event_type: event_type.to_string(),
            action: action.map(str::to_string),
        },
    };

    Ok(event)
}
