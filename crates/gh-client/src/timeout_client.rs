//! Timeout-bounded label store (decorator pattern)
//!
//! Wraps any `LabelStore` implementation and bounds every call with a
//! deadline. An elapsed deadline surfaces as `StoreError::Transport`, the same
//! as any other network failure.

use crate::client::{LabelStore, StoreResult};
use crate::error::StoreError;
use crate::types::{Label, RepoRef, RepositoryPage, Review};
use async_trait::async_trait;
use log::warn;
use std::future::Future;
use std::time::Duration;

/// Label store decorator that bounds each remote call
///
/// # Example
///
/// ```rust,ignore
/// use gh_client::{OctocrabClient, TimeoutLabelStore};
/// use std::{sync::Arc, time::Duration};
///
/// let octocrab = Arc::new(octocrab::Octocrab::builder().build().unwrap());
/// let store = TimeoutLabelStore::new(OctocrabClient::new(octocrab), Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct TimeoutLabelStore<S: LabelStore> {
    inner: S,
    timeout: Duration,
}

impl<S: LabelStore> TimeoutLabelStore<S> {
    pub fn new(inner: S, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get a reference to the inner store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = StoreResult<T>> + Send,
    ) -> StoreResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!("{} timed out after {:?}", operation, self.timeout);
                Err(StoreError::Transport(format!(
                    "{} timed out after {:?}",
                    operation, self.timeout
                )))
            }
        }
    }
}

#[async_trait]
impl<S: LabelStore> LabelStore for TimeoutLabelStore<S> {
    async fn list_labels(&self, repo: &RepoRef) -> StoreResult<Vec<Label>> {
        self.bounded("list_labels", self.inner.list_labels(repo))
            .await
    }

    async fn create_label(&self, repo: &RepoRef, label: &Label) -> StoreResult<()> {
        self.bounded("create_label", self.inner.create_label(repo, label))
            .await
    }

    async fn edit_label(&self, repo: &RepoRef, name: &str, color: &str) -> StoreResult<()> {
        self.bounded("edit_label", self.inner.edit_label(repo, name, color))
            .await
    }

    async fn delete_label(&self, repo: &RepoRef, name: &str) -> StoreResult<()> {
        self.bounded("delete_label", self.inner.delete_label(repo, name))
            .await
    }

    async fn add_labels_to_issue(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        names: &[String],
    ) -> StoreResult<()> {
        self.bounded(
            "add_labels_to_issue",
            self.inner.add_labels_to_issue(repo, issue_number, names),
        )
        .await
    }

    async fn remove_label_from_issue(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        name: &str,
    ) -> StoreResult<()> {
        self.bounded(
            "remove_label_from_issue",
            self.inner.remove_label_from_issue(repo, issue_number, name),
        )
        .await
    }

    async fn list_reviews(&self, repo: &RepoRef, pr_number: u64) -> StoreResult<Vec<Review>> {
        self.bounded("list_reviews", self.inner.list_reviews(repo, pr_number))
            .await
    }

    async fn list_repositories_by_org(
        &self,
        org: &str,
        page: u32,
        per_page: u8,
    ) -> StoreResult<RepositoryPage> {
        self.bounded(
            "list_repositories_by_org",
            self.inner.list_repositories_by_org(org, page, per_page),
        )
        .await
    }
}
