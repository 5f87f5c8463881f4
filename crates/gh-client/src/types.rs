//! Label store data transfer objects
//!
//! These types represent the data exchanged with the remote label API.
//! They are intentionally separate from octocrab's models to keep the
//! state machine and bootstrapper independent of any one platform client.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Repository reference (owner + name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// Organization or user login
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Pull request reference used by the review state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub repo: RepoRef,
    /// PR number (also its issue number)
    pub number: u64,
    /// PR URL, used for log context only
    pub url: String,
}

impl PullRequestRef {
    pub fn new(repo: RepoRef, number: u64, url: impl Into<String>) -> Self {
        Self {
            repo,
            number,
            url: url.into(),
        }
    }
}

/// A repository label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name, unique within a repository
    pub name: String,
    /// Six hex digits without a leading `#`
    pub color: String,
}

impl Label {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }
}

/// A pull request review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review ID
    pub id: u64,
    /// Reviewer login (None for deleted users)
    pub reviewer: Option<String>,
    /// Review state exactly as reported by GitHub (e.g. "APPROVED", "COMMENTED")
    pub state: String,
}

/// Repository entry from an organization listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    /// Repository name
    pub name: String,
    /// Whether the repository is archived (read-only)
    pub archived: bool,
    /// Repository URL, used for log context only
    pub url: String,
}

/// One page of an organization repository listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryPage {
    pub repositories: Vec<RepositorySummary>,
    /// Next page number, `0` when there are no further pages
    pub next_page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_ref_display() {
        let repo = RepoRef::new("acme", "widgets");
        assert_eq!(repo.to_string(), "acme/widgets");
    }

    #[test]
    fn test_repository_page_default_has_no_next_page() {
        let page = RepositoryPage::default();
        assert!(page.repositories.is_empty());
        assert_eq!(page.next_page, 0);
    }
}
