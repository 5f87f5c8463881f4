//! GitHub label store client
//!
//! This crate provides a trait-based client for the small slice of the GitHub
//! API that a label bot needs: repository labels, issue labels, pull request
//! reviews and organization repository listings. The design follows the
//! decorator pattern, allowing timeouts to be composed with the base client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               LabelStore trait                   │
//! │  - list_labels() / create / edit / delete        │
//! │  - add_labels_to_issue() / remove_label_...()    │
//! │  - list_reviews() / list_repositories_by_org()   │
//! └─────────────────────────────────────────────────┘
//!                        │
//!        ┌───────────────┴───────────────┐
//!        ▼                               ▼
//! ┌─────────────────┐         ┌─────────────────────┐
//! │ OctocrabClient  │         │ TimeoutLabelStore   │
//! │ (direct API)    │◄────────│ (decorator)         │
//! └─────────────────┘         └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_client::{LabelStore, OctocrabClient, RepoRef, TimeoutLabelStore};
//! use std::{sync::Arc, time::Duration};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let octocrab = octocrab::Octocrab::builder()
//!     .personal_token("token".to_string())
//!     .build()?;
//!
//! let store = TimeoutLabelStore::new(
//!     OctocrabClient::new(Arc::new(octocrab)),
//!     Duration::from_secs(10),
//! );
//!
//! let labels = store.list_labels(&RepoRef::new("owner", "repo")).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod client_manager;
pub mod error;
pub mod octocrab_client;
pub mod timeout_client;
pub mod types;

/// Default GitHub host (public GitHub)
pub const DEFAULT_HOST: &str = "github.com";

pub use client::{LabelStore, StoreResult};
pub use client_manager::{
    AppClientProvider, ClientProvider, TokenClientProvider, TokenResolver, TokenSource,
};
pub use error::StoreError;
pub use octocrab_client::OctocrabClient;
pub use timeout_client::TimeoutLabelStore;
pub use types::{Label, PullRequestRef, RepoRef, RepositoryPage, RepositorySummary, Review};

// Re-export octocrab so consumers don't need to depend on it directly
pub use octocrab;
