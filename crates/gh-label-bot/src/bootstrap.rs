//! Repository label bootstrapping
//!
//! Converges a repository's labels to the [`LabelTemplate`]:
//! 1. Delete the organization's denylisted default labels
//! 2. Fix the color of template labels that drifted
//! 3. Create template labels that are missing
//!
//! Running it twice is a no-op the second time.

use crate::labels::LabelTemplate;
use crate::policy::{Batch, FailurePolicy};
use gh_client::{Label, LabelStore, RepoRef, StoreError};
use gh_label_config::BotConfig;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use thiserror::Error;

/// GitHub's maximum page size is 100; the bot walks organizations in pages of 50
pub const DEFAULT_REPOSITORIES_PER_PAGE: u8 = 50;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Several items failed under [`FailurePolicy::Collect`]
    #[error("{} operations failed", .0.len())]
    Multiple(Vec<BootstrapError>),
}

impl BootstrapError {
    fn from_batch(mut errors: Vec<BootstrapError>) -> Result<(), BootstrapError> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(BootstrapError::Multiple(errors)),
        }
    }
}

/// Outcome of an organization-wide bootstrap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapSummary {
    pub bootstrapped: usize,
    pub skipped_archived: usize,
    pub failed: usize,
}

/// Converges repository labels to the template
#[derive(Debug, Clone)]
pub struct Bootstrapper {
    template: LabelTemplate,
    denylists: HashMap<String, Vec<String>>,
    policy: FailurePolicy,
    per_page: u8,
}

impl Default for Bootstrapper {
    fn default() -> Self {
        Self::new(HashMap::new(), FailurePolicy::default())
    }
}

impl Bootstrapper {
    pub fn new(denylists: HashMap<String, Vec<String>>, policy: FailurePolicy) -> Self {
        Self {
            template: LabelTemplate,
            denylists,
            policy,
            per_page: DEFAULT_REPOSITORIES_PER_PAGE,
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.denylists.clone(), config.failure_policy)
            .with_page_size(config.repositories_per_page)
    }

    pub fn with_page_size(mut self, per_page: u8) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Default labels to delete for an organization
    pub fn denylist_for(&self, org: &str) -> &[String] {
        self.denylists.get(org).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Converge one repository's labels to the template
    pub async fn ensure_labels(
        &self,
        store: &dyn LabelStore,
        repo: &RepoRef,
    ) -> Result<(), BootstrapError> {
        let labels = store.list_labels(repo).await.map_err(|e| {
            error!("Could not list labels for {}: {}", repo, e);
            e
        })?;

        let mut batch = Batch::new(self.policy);
        self.delete_denylisted(store, repo, &labels, &mut batch)
            .await?;

        let existing: HashMap<&str, &str> = labels
            .iter()
            .map(|l| (l.name.as_str(), l.color.as_str()))
            .collect();
        self.converge_template(store, repo, &existing, &mut batch)
            .await?;

        if batch.failed() > 0 {
            warn!("{} label operations failed for {}", batch.failed(), repo);
        }
        BootstrapError::from_batch(batch.into_errors())
    }

    async fn delete_denylisted(
        &self,
        store: &dyn LabelStore,
        repo: &RepoRef,
        labels: &[Label],
        batch: &mut Batch<BootstrapError>,
    ) -> Result<(), BootstrapError> {
        let denylist = self.denylist_for(&repo.owner);
        if denylist.is_empty() {
            return Ok(());
        }

        for label in labels.iter().filter(|l| denylist.contains(&l.name)) {
            // Deleting a template label would be undone by the convergence step
            if self.template.color_of(&label.name).is_some() {
                warn!(
                    "Label {} is both denylisted and part of the template, keeping it",
                    label.name
                );
                continue;
            }

            info!("Deleting default label {} from {}", label.name, repo);
            let result = store.delete_label(repo, &label.name).await.map_err(|e| {
                error!("Could not delete label {} from {}: {}", label.name, repo, e);
                BootstrapError::from(e)
            });
            batch.record(result)?;
        }

        Ok(())
    }

    async fn converge_template(
        &self,
        store: &dyn LabelStore,
        repo: &RepoRef,
        existing: &HashMap<&str, &str>,
        batch: &mut Batch<BootstrapError>,
    ) -> Result<(), BootstrapError> {
        for (name, color) in self.template.entries() {
            let result = match existing.get(name) {
                Some(current) if current.eq_ignore_ascii_case(color) => {
                    debug!("Label {} on {} is up to date", name, repo);
                    Ok(())
                }
                Some(current) => {
                    info!(
                        "Label {} on {} has color {} instead of {}, changing...",
                        name, repo, current, color
                    );
                    store.edit_label(repo, name, color).await.map_err(|e| {
                        error!("Could not edit label {} on {}: {}", name, repo, e);
                        BootstrapError::from(e)
                    })
                }
                None => {
                    info!("Label {} does not exist on {}, creating...", name, repo);
                    match store.create_label(repo, &Label::new(name, color)).await {
                        Ok(()) => Ok(()),
                        Err(e) if e.is_conflict() => {
                            info!("Label {} was created concurrently on {}", name, repo);
                            Ok(())
                        }
                        Err(e) => {
                            error!("Could not create label {} on {}: {}", name, repo, e);
                            Err(BootstrapError::from(e))
                        }
                    }
                }
            };
            batch.record(result)?;
        }

        Ok(())
    }

    /// Bootstrap every non-archived repository of an organization
    ///
    /// Walks the organization's repositories page by page until the listing
    /// reports no next page. A failed listing always aborts the walk; failed
    /// repositories are handled according to the failure policy.
    pub async fn ensure_labels_for_all_repositories(
        &self,
        store: &dyn LabelStore,
        org: &str,
    ) -> Result<BootstrapSummary, BootstrapError> {
        let mut summary = BootstrapSummary::default();
        let mut batch = Batch::new(self.policy);
        let mut page = 1u32;

        loop {
            info!("Listing repositories for {} page {}", org, page);
            let listing = store
                .list_repositories_by_org(org, page, self.per_page)
                .await
                .map_err(|e| {
                    error!("Could not list repositories for {}: {}", org, e);
                    e
                })?;

            for repository in &listing.repositories {
                if repository.archived {
                    debug!("Skipping archived repository {}", repository.url);
                    summary.skipped_archived += 1;
                    continue;
                }

                let repo = RepoRef::new(org, &repository.name);
                let result = self.ensure_labels(store, &repo).await;
                match &result {
                    Ok(()) => summary.bootstrapped += 1,
                    Err(e) => {
                        error!(
                            "Could not create labels for repository {}: {}",
                            repository.url, e
                        );
                        summary.failed += 1;
                    }
                }
                batch.record(result)?;
            }

            if listing.next_page == 0 {
                break;
            }
            page = listing.next_page;
        }

        info!(
            "Bootstrapped {} repositories for {} ({} archived skipped, {} failed)",
            summary.bootstrapped, org, summary.skipped_archived, summary.failed
        );
        BootstrapError::from_batch(batch.into_errors())?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{FIRST_APPROVAL, READY_FOR_REVIEW, READY_TO_MERGE, WORK_IN_PROGRESS};
    use crate::test_support::{summary, Call, FakeLabelStore};

    const TICKETSWAP_DEFAULTS: [&str; 8] = [
        "bug",
        "duplicate",
        "enhancement",
        "good first issue",
        "help wanted",
        "invalid",
        "question",
        "wontfix",
    ];

    fn denylisting(org: &str, labels: &[&str], policy: FailurePolicy) -> Bootstrapper {
        let mut denylists = HashMap::new();
        denylists.insert(
            org.to_string(),
            labels.iter().map(|l| l.to_string()).collect(),
        );
        Bootstrapper::new(denylists, policy)
    }

    fn color_of(store: &FakeLabelStore, repo: &RepoRef, name: &str) -> Option<String> {
        store
            .labels(repo)
            .into_iter()
            .find(|l| l.name == name)
            .map(|l| l.color)
    }

    #[tokio::test]
    async fn test_empty_repository_gets_all_template_labels() {
        let repo = RepoRef::new("acme", "widgets");
        let store = FakeLabelStore::new();

        Bootstrapper::default()
            .ensure_labels(&store, &repo)
            .await
            .unwrap();

        assert_eq!(store.labels(&repo).len(), 4);
        assert_eq!(color_of(&store, &repo, WORK_IN_PROGRESS).as_deref(), Some("0052cc"));
        assert_eq!(color_of(&store, &repo, FIRST_APPROVAL).as_deref(), Some("bfe5bf"));
        assert_eq!(color_of(&store, &repo, READY_FOR_REVIEW).as_deref(), Some("fef2c0"));
        assert_eq!(color_of(&store, &repo, READY_TO_MERGE).as_deref(), Some("0e8a16"));
    }

    #[tokio::test]
    async fn test_second_run_is_noop() {
        let repo = RepoRef::new("acme", "widgets");
        let store = FakeLabelStore::new();
        let bootstrapper = Bootstrapper::default();

        bootstrapper.ensure_labels(&store, &repo).await.unwrap();
        assert_eq!(store.label_mutations(), 4);

        store.clear_calls();
        bootstrapper.ensure_labels(&store, &repo).await.unwrap();
        assert_eq!(store.label_mutations(), 0);
        assert_eq!(store.calls(), vec![Call::ListLabels("acme/widgets".into())]);
    }

    #[tokio::test]
    async fn test_wrong_color_is_edited_and_correct_color_untouched() {
        let repo = RepoRef::new("acme", "widgets");
        let store = FakeLabelStore::new().with_labels(
            &repo,
            &[(READY_TO_MERGE, "ff0000"), (FIRST_APPROVAL, "BFE5BF")],
        );

        Bootstrapper::default()
            .ensure_labels(&store, &repo)
            .await
            .unwrap();

        let calls = store.calls();
        assert!(calls.contains(&Call::EditLabel(
            "acme/widgets".into(),
            READY_TO_MERGE.into(),
            "0e8a16".into()
        )));
        assert!(!calls
            .iter()
            .any(|c| matches!(c, Call::EditLabel(_, name, _) | Call::CreateLabel(_, name) if name == FIRST_APPROVAL)));
        assert_eq!(color_of(&store, &repo, READY_TO_MERGE).as_deref(), Some("0e8a16"));
        assert_eq!(store.labels(&repo).len(), 4);
    }

    #[tokio::test]
    async fn test_denylist_applies_only_to_configured_org() {
        let ticketswap = RepoRef::new("TicketSwap", "app");
        let acme = RepoRef::new("Acme", "app");
        let store = FakeLabelStore::new()
            .with_labels(&ticketswap, &[("bug", "d73a4a"), ("custom", "000000")])
            .with_labels(&acme, &[("bug", "d73a4a")]);
        let bootstrapper =
            denylisting("TicketSwap", &TICKETSWAP_DEFAULTS, FailurePolicy::FailFast);

        bootstrapper.ensure_labels(&store, &ticketswap).await.unwrap();
        bootstrapper.ensure_labels(&store, &acme).await.unwrap();

        assert_eq!(color_of(&store, &ticketswap, "bug"), None);
        assert!(color_of(&store, &ticketswap, "custom").is_some());
        assert_eq!(color_of(&store, &acme, "bug").as_deref(), Some("d73a4a"));
    }

    #[tokio::test]
    async fn test_denylisted_template_label_is_kept() {
        let repo = RepoRef::new("acme", "widgets");
        let store = FakeLabelStore::new().with_labels(&repo, &[(READY_TO_MERGE, "0e8a16")]);
        let bootstrapper = denylisting("acme", &[READY_TO_MERGE], FailurePolicy::FailFast);

        bootstrapper.ensure_labels(&store, &repo).await.unwrap();

        assert!(!store
            .calls()
            .iter()
            .any(|c| matches!(c, Call::DeleteLabel(..))));
        assert!(color_of(&store, &repo, READY_TO_MERGE).is_some());
    }

    #[tokio::test]
    async fn test_fail_fast_stops_at_first_delete_failure() {
        let repo = RepoRef::new("acme", "widgets");
        let store = FakeLabelStore::new()
            .with_labels(&repo, &[("bug", "d73a4a"), ("wontfix", "ffffff")])
            .failing_on(Call::DeleteLabel("acme/widgets".into(), "bug".into()));
        let bootstrapper = denylisting("acme", &["bug", "wontfix"], FailurePolicy::FailFast);

        let err = bootstrapper.ensure_labels(&store, &repo).await.unwrap_err();

        assert!(matches!(err, BootstrapError::Store(StoreError::Transport(_))));
        let calls = store.calls();
        assert!(!calls.contains(&Call::DeleteLabel("acme/widgets".into(), "wontfix".into())));
        assert_eq!(store.label_mutations(), 1);
    }

    #[tokio::test]
    async fn test_collect_attempts_everything_and_reports_failure() {
        let repo = RepoRef::new("acme", "widgets");
        let store = FakeLabelStore::new()
            .with_labels(&repo, &[("bug", "d73a4a"), ("wontfix", "ffffff")])
            .failing_on(Call::DeleteLabel("acme/widgets".into(), "bug".into()));
        let bootstrapper = denylisting("acme", &["bug", "wontfix"], FailurePolicy::Collect);

        let err = bootstrapper.ensure_labels(&store, &repo).await.unwrap_err();

        assert!(matches!(err, BootstrapError::Store(StoreError::Transport(_))));
        assert_eq!(color_of(&store, &repo, "wontfix"), None);
        // Template still converged
        assert!(color_of(&store, &repo, READY_TO_MERGE).is_some());
        assert!(color_of(&store, &repo, WORK_IN_PROGRESS).is_some());
    }

    #[tokio::test]
    async fn test_collect_reports_multiple_failures() {
        let repo = RepoRef::new("acme", "widgets");
        let store = FakeLabelStore::new()
            .failing_on(Call::CreateLabel("acme/widgets".into(), FIRST_APPROVAL.into()))
            .failing_on(Call::CreateLabel("acme/widgets".into(), READY_TO_MERGE.into()));
        let bootstrapper = Bootstrapper::new(HashMap::new(), FailurePolicy::Collect);

        let err = bootstrapper.ensure_labels(&store, &repo).await.unwrap_err();

        match err {
            BootstrapError::Multiple(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected multiple errors, got {:?}", other),
        }
        assert_eq!(store.labels(&repo).len(), 2);
    }

    #[tokio::test]
    async fn test_create_conflict_counts_as_converged() {
        let repo = RepoRef::new("acme", "widgets");
        let store = FakeLabelStore::new()
            .conflicting_on(Call::CreateLabel("acme/widgets".into(), READY_TO_MERGE.into()));

        let result = Bootstrapper::default().ensure_labels(&store, &repo).await;

        assert!(result.is_ok());
        assert_eq!(store.labels(&repo).len(), 3);
    }

    #[tokio::test]
    async fn test_list_failure_aborts() {
        let repo = RepoRef::new("acme", "widgets");
        let store = FakeLabelStore::new().failing_on(Call::ListLabels("acme/widgets".into()));

        let err = Bootstrapper::new(HashMap::new(), FailurePolicy::Collect)
            .ensure_labels(&store, &repo)
            .await
            .unwrap_err();

        assert!(matches!(err, BootstrapError::Store(StoreError::Transport(_))));
        assert_eq!(store.label_mutations(), 0);
    }

    #[tokio::test]
    async fn test_all_repositories_across_two_pages() {
        let names: Vec<String> = (0..60).map(|i| format!("repo-{:02}", i)).collect();
        let first: Vec<_> = names[..50].iter().map(|n| summary(n, false)).collect();
        let second: Vec<_> = names[50..].iter().map(|n| summary(n, false)).collect();
        let store = FakeLabelStore::new().with_org_pages("Acme", vec![first, second]);

        let result = Bootstrapper::default()
            .ensure_labels_for_all_repositories(&store, "Acme")
            .await
            .unwrap();

        assert_eq!(result.bootstrapped, 60);
        let calls = store.calls();
        let listed: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                Call::ListLabels(repo) => Some(repo.clone()),
                _ => None,
            })
            .collect();
        let expected: Vec<_> = names.iter().map(|n| format!("Acme/{}", n)).collect();
        assert_eq!(listed, expected);

        let pages: Vec<_> = calls
            .iter()
            .filter(|c| matches!(c, Call::ListRepositories(..)))
            .cloned()
            .collect();
        assert_eq!(
            pages,
            vec![
                Call::ListRepositories("Acme".into(), 1),
                Call::ListRepositories("Acme".into(), 2),
            ]
        );
    }

    #[tokio::test]
    async fn test_archived_repositories_are_skipped() {
        let store = FakeLabelStore::new().with_org_pages(
            "acme",
            vec![vec![
                summary("active", false),
                summary("legacy", true),
                summary("current", false),
            ]],
        );

        let result = Bootstrapper::default()
            .ensure_labels_for_all_repositories(&store, "acme")
            .await
            .unwrap();

        assert_eq!(
            result,
            BootstrapSummary {
                bootstrapped: 2,
                skipped_archived: 1,
                failed: 0,
            }
        );
        assert!(!store
            .calls()
            .contains(&Call::ListLabels("acme/legacy".into())));
    }

    #[tokio::test]
    async fn test_repository_failure_aborts_walk_by_default() {
        let store = FakeLabelStore::new()
            .with_org_pages(
                "acme",
                vec![vec![summary("one", false), summary("two", false)], vec![summary("three", false)]],
            )
            .failing_on(Call::ListLabels("acme/one".into()));

        let result = Bootstrapper::default()
            .ensure_labels_for_all_repositories(&store, "acme")
            .await;

        assert!(result.is_err());
        let calls = store.calls();
        assert!(!calls.contains(&Call::ListLabels("acme/two".into())));
        assert!(!calls.contains(&Call::ListRepositories("acme".into(), 2)));
    }

    #[tokio::test]
    async fn test_repository_failure_collected_under_collect_policy() {
        let store = FakeLabelStore::new()
            .with_org_pages(
                "acme",
                vec![vec![summary("one", false), summary("two", false)], vec![summary("three", false)]],
            )
            .failing_on(Call::ListLabels("acme/one".into()));

        let result = Bootstrapper::new(HashMap::new(), FailurePolicy::Collect)
            .ensure_labels_for_all_repositories(&store, "acme")
            .await;

        assert!(result.is_err());
        assert_eq!(store.labels(&RepoRef::new("acme", "two")).len(), 4);
        assert_eq!(store.labels(&RepoRef::new("acme", "three")).len(), 4);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts_even_when_collecting() {
        let store = FakeLabelStore::new()
            .with_org_pages("acme", vec![vec![summary("one", false)], vec![summary("two", false)]])
            .failing_on(Call::ListRepositories("acme".into(), 2));

        let result = Bootstrapper::new(HashMap::new(), FailurePolicy::Collect)
            .ensure_labels_for_all_repositories(&store, "acme")
            .await;

        assert!(matches!(result, Err(BootstrapError::Store(StoreError::Transport(_)))));
        assert_eq!(store.labels(&RepoRef::new("acme", "one")).len(), 4);
    }
}
