//! Label store trait
//!
//! This module defines the core `LabelStore` trait: the capability interface
//! the bootstrapper and the review state machine consume. Implementations can
//! be direct (hitting the API) or decorated with timeouts, retries, etc.

use crate::error::StoreError;
use crate::types::{Label, RepoRef, RepositoryPage, Review};
use async_trait::async_trait;

/// Result alias for label store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Remote label API
///
/// None of the operations are transactional. Adding a label that is already
/// attached succeeds, removing one that is not attached fails with
/// [`StoreError::NotFound`].
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across
/// async tasks and threads.
///
/// # Example
///
/// ```rust,ignore
/// use gh_client::{LabelStore, RepoRef};
///
/// async fn label_names(store: &dyn LabelStore) -> anyhow::Result<Vec<String>> {
///     let repo = RepoRef::new("rust-lang", "rust");
///     let labels = store.list_labels(&repo).await?;
///     Ok(labels.into_iter().map(|l| l.name).collect())
/// }
/// ```
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// List all labels defined on a repository
    async fn list_labels(&self, repo: &RepoRef) -> StoreResult<Vec<Label>>;

    /// Create a label on a repository
    ///
    /// Fails with [`StoreError::Conflict`] if a label with that name exists.
    async fn create_label(&self, repo: &RepoRef, label: &Label) -> StoreResult<()>;

    /// Change the color of an existing label, keeping its name
    async fn edit_label(&self, repo: &RepoRef, name: &str, color: &str) -> StoreResult<()>;

    /// Delete a label from a repository
    async fn delete_label(&self, repo: &RepoRef, name: &str) -> StoreResult<()>;

    /// Attach labels to an issue or pull request
    async fn add_labels_to_issue(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        names: &[String],
    ) -> StoreResult<()>;

    /// Detach a single label from an issue or pull request
    ///
    /// Fails with [`StoreError::NotFound`] if the label is not attached.
    async fn remove_label_from_issue(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        name: &str,
    ) -> StoreResult<()>;

    /// List all reviews submitted on a pull request
    async fn list_reviews(&self, repo: &RepoRef, pr_number: u64) -> StoreResult<Vec<Review>>;

    /// List one page of an organization's repositories
    ///
    /// # Arguments
    ///
    /// * `org` - Organization login
    /// * `page` - 1-based page number
    /// * `per_page` - Page size (GitHub caps this at 100)
    async fn list_repositories_by_org(
        &self,
        org: &str,
        page: u32,
        per_page: u8,
    ) -> StoreResult<RepositoryPage>;
}
