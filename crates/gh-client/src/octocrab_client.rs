//! Octocrab-based label store
//!
//! Direct implementation of the `LabelStore` trait using the octocrab library.
//! This client makes real API calls without any timeout of its own; wrap it in
//! `TimeoutLabelStore` to bound each call.

use crate::client::{LabelStore, StoreResult};
use crate::types::{Label, RepoRef, RepositoryPage, RepositorySummary, Review};
use async_trait::async_trait;
use log::debug;
use octocrab::{Octocrab, Page};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const REVIEWS_PER_PAGE: u8 = 100;
const LABELS_PER_PAGE: u8 = 100;

/// Direct GitHub label store using octocrab
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
}

impl OctocrabClient {
    /// Create a new client with the given octocrab instance
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }
}

#[derive(Debug, Deserialize)]
struct RawLabel {
    name: String,
    color: String,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    id: u64,
    #[serde(default)]
    user: Option<RawUser>,
    state: String,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    name: String,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

#[derive(Serialize)]
struct ListReposParams {
    #[serde(rename = "type")]
    repo_type: &'static str,
    per_page: u8,
    page: u32,
}

#[derive(Serialize)]
struct LabelBody<'a> {
    name: &'a str,
    color: &'a str,
}

#[derive(Serialize)]
struct LabelColorBody<'a> {
    color: &'a str,
}

/// Route to a single label; names contain spaces and must be encoded
fn label_route(repo: &RepoRef, name: &str) -> String {
    format!(
        "/repos/{}/{}/labels/{}",
        repo.owner,
        repo.name,
        urlencoding::encode(name)
    )
}

#[async_trait]
impl LabelStore for OctocrabClient {
    async fn list_labels(&self, repo: &RepoRef) -> StoreResult<Vec<Label>> {
        debug!("Listing labels for {}", repo);

        let route = format!("/repos/{}/{}/labels", repo.owner, repo.name);
        let first: Page<RawLabel> = self
            .octocrab
            .get(
                route,
                Some(&PageParams {
                    per_page: LABELS_PER_PAGE,
                    page: 1,
                }),
            )
            .await?;
        let labels = self.octocrab.all_pages(first).await?;

        debug!("Fetched {} labels for {}", labels.len(), repo);
        Ok(labels
            .into_iter()
            .map(|l| Label::new(l.name, l.color))
            .collect())
    }

    async fn create_label(&self, repo: &RepoRef, label: &Label) -> StoreResult<()> {
        debug!("Creating label '{}' ({}) on {}", label.name, label.color, repo);

        let route = format!("/repos/{}/{}/labels", repo.owner, repo.name);
        let _: RawLabel = self
            .octocrab
            .post(
                route,
                Some(&LabelBody {
                    name: &label.name,
                    color: &label.color,
                }),
            )
            .await?;
        Ok(())
    }

    async fn edit_label(&self, repo: &RepoRef, name: &str, color: &str) -> StoreResult<()> {
        debug!("Editing label '{}' on {} to color {}", name, repo, color);

        let _: RawLabel = self
            .octocrab
            .patch(label_route(repo, name), Some(&LabelColorBody { color }))
            .await?;
        Ok(())
    }

    async fn delete_label(&self, repo: &RepoRef, name: &str) -> StoreResult<()> {
        debug!("Deleting label '{}' from {}", name, repo);

        // 204 has no body to deserialize, so map the status by hand
        let response = self
            .octocrab
            ._delete(label_route(repo, name), None::<&()>)
            .await?;
        octocrab::map_github_error(response).await?;
        Ok(())
    }

    async fn add_labels_to_issue(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        names: &[String],
    ) -> StoreResult<()> {
        debug!("Adding labels {:?} to {}#{}", names, repo, issue_number);

        self.octocrab
            .issues(&repo.owner, &repo.name)
            .add_labels(issue_number, names)
            .await?;
        Ok(())
    }

    async fn remove_label_from_issue(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        name: &str,
    ) -> StoreResult<()> {
        debug!("Removing label '{}' from {}#{}", name, repo, issue_number);

        self.octocrab
            .issues(&repo.owner, &repo.name)
            .remove_label(issue_number, name)
            .await?;
        Ok(())
    }

    async fn list_reviews(&self, repo: &RepoRef, pr_number: u64) -> StoreResult<Vec<Review>> {
        debug!("Fetching reviews for {}#{}", repo, pr_number);

        // Raw GET keeps the review state string exactly as GitHub sends it
        let route = format!(
            "/repos/{}/{}/pulls/{}/reviews",
            repo.owner, repo.name, pr_number
        );

        let mut reviews = Vec::new();
        let mut page = 1u32;
        loop {
            let batch: Vec<RawReview> = self
                .octocrab
                .get(
                    &route,
                    Some(&PageParams {
                        per_page: REVIEWS_PER_PAGE,
                        page,
                    }),
                )
                .await?;
            let batch_len = batch.len();

            reviews.extend(batch.into_iter().map(|r| Review {
                id: r.id,
                reviewer: r.user.map(|u| u.login),
                state: r.state,
            }));

            if batch_len < REVIEWS_PER_PAGE as usize {
                break;
            }
            page += 1;
        }

        debug!("Fetched {} reviews for {}#{}", reviews.len(), repo, pr_number);
        Ok(reviews)
    }

    async fn list_repositories_by_org(
        &self,
        org: &str,
        page: u32,
        per_page: u8,
    ) -> StoreResult<RepositoryPage> {
        debug!("Listing repositories for {} (page {})", org, page);

        let route = format!("/orgs/{}/repos", org);
        let result: Page<RawRepository> = self
            .octocrab
            .get(
                route,
                Some(&ListReposParams {
                    repo_type: "all",
                    per_page,
                    page,
                }),
            )
            .await?;

        let next_page = if result.next.is_some() { page + 1 } else { 0 };
        let repositories = result
            .items
            .into_iter()
            .map(|r| RepositorySummary {
                url: r
                    .html_url
                    .unwrap_or_else(|| format!("https://github.com/{}/{}", org, r.name)),
                name: r.name,
                archived: r.archived,
            })
            .collect();

        Ok(RepositoryPage {
            repositories,
            next_page,
        })
    }
}
