//! In-memory label store for tests
//!
//! Mimics GitHub semantics: adding an attached label succeeds, removing a
//! missing one is `NotFound`, creating an existing one is `Conflict`.

use async_trait::async_trait;
use gh_client::{
    Label, LabelStore, RepoRef, RepositoryPage, RepositorySummary, Review, StoreError,
    StoreResult,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

/// A recorded store call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListLabels(String),
    CreateLabel(String, String),
    EditLabel(String, String, String),
    DeleteLabel(String, String),
    AddLabels(String, u64, Vec<String>),
    RemoveLabel(String, u64, String),
    ListReviews(String, u64),
    ListRepositories(String, u32),
}

#[derive(Debug, Clone, Copy)]
enum Failure {
    Transport,
    Conflict,
}

#[derive(Default)]
struct FakeState {
    repo_labels: HashMap<String, Vec<Label>>,
    issue_labels: HashMap<(String, u64), BTreeSet<String>>,
    reviews: HashMap<(String, u64), Vec<Review>>,
    org_pages: HashMap<String, Vec<Vec<RepositorySummary>>>,
    failing: Vec<(Call, Failure)>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct FakeLabelStore {
    state: Mutex<FakeState>,
}

impl FakeLabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(self, repo: &RepoRef, labels: &[(&str, &str)]) -> Self {
        self.state.lock().unwrap().repo_labels.insert(
            repo.to_string(),
            labels.iter().map(|(n, c)| Label::new(*n, *c)).collect(),
        );
        self
    }

    pub fn with_issue_labels(self, repo: &RepoRef, number: u64, labels: &[&str]) -> Self {
        self.state.lock().unwrap().issue_labels.insert(
            (repo.to_string(), number),
            labels.iter().map(|l| l.to_string()).collect(),
        );
        self
    }

    pub fn with_reviews(self, repo: &RepoRef, number: u64, states: &[&str]) -> Self {
        let reviews = states
            .iter()
            .enumerate()
            .map(|(i, state)| Review {
                id: i as u64 + 1,
                reviewer: Some(format!("reviewer-{}", i)),
                state: state.to_string(),
            })
            .collect();
        self.state
            .lock()
            .unwrap()
            .reviews
            .insert((repo.to_string(), number), reviews);
        self
    }

    /// Register an organization's repositories, one inner vec per page
    pub fn with_org_pages(self, org: &str, pages: Vec<Vec<RepositorySummary>>) -> Self {
        self.state
            .lock()
            .unwrap()
            .org_pages
            .insert(org.to_string(), pages);
        self
    }

    /// Make the given call fail with a transport error
    pub fn failing_on(self, call: Call) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing
            .push((call, Failure::Transport));
        self
    }

    /// Make the given call fail with a conflict, as if another writer won a race
    pub fn conflicting_on(self, call: Call) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing
            .push((call, Failure::Conflict));
        self
    }

    pub fn labels(&self, repo: &RepoRef) -> Vec<Label> {
        self.state
            .lock()
            .unwrap()
            .repo_labels
            .get(&repo.to_string())
            .cloned()
            .unwrap_or_default()
    }

    pub fn issue_labels(&self, repo: &RepoRef, number: u64) -> BTreeSet<String> {
        self.state
            .lock()
            .unwrap()
            .issue_labels
            .get(&(repo.to_string(), number))
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    /// Number of mutating calls on repository labels
    pub fn label_mutations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    Call::CreateLabel(..) | Call::EditLabel(..) | Call::DeleteLabel(..)
                )
            })
            .count()
    }

    fn record(&self, call: Call) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        let failure = state
            .failing
            .iter()
            .find(|(failing, _)| *failing == call)
            .map(|(_, failure)| *failure);
        state.calls.push(call.clone());
        match failure {
            Some(Failure::Transport) => Err(StoreError::Transport(format!(
                "injected failure: {:?}",
                call
            ))),
            Some(Failure::Conflict) => Err(StoreError::Conflict(format!(
                "injected conflict: {:?}",
                call
            ))),
            None => Ok(()),
        }
    }
}

pub fn summary(name: &str, archived: bool) -> RepositorySummary {
    RepositorySummary {
        name: name.to_string(),
        archived,
        url: format!("https://github.com/acme/{}", name),
    }
}

#[async_trait]
impl LabelStore for FakeLabelStore {
    async fn list_labels(&self, repo: &RepoRef) -> StoreResult<Vec<Label>> {
        self.record(Call::ListLabels(repo.to_string()))?;
        Ok(self.labels(repo))
    }

    async fn create_label(&self, repo: &RepoRef, label: &Label) -> StoreResult<()> {
        self.record(Call::CreateLabel(repo.to_string(), label.name.clone()))?;
        let mut state = self.state.lock().unwrap();
        let labels = state.repo_labels.entry(repo.to_string()).or_default();
        if labels.iter().any(|l| l.name == label.name) {
            return Err(StoreError::Conflict(format!(
                "label '{}' already_exists",
                label.name
            )));
        }
        labels.push(label.clone());
        Ok(())
    }

    async fn edit_label(&self, repo: &RepoRef, name: &str, color: &str) -> StoreResult<()> {
        self.record(Call::EditLabel(
            repo.to_string(),
            name.to_string(),
            color.to_string(),
        ))?;
        let mut state = self.state.lock().unwrap();
        let label = state
            .repo_labels
            .get_mut(&repo.to_string())
            .and_then(|labels| labels.iter_mut().find(|l| l.name == name))
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        label.color = color.to_string();
        Ok(())
    }

    async fn delete_label(&self, repo: &RepoRef, name: &str) -> StoreResult<()> {
        self.record(Call::DeleteLabel(repo.to_string(), name.to_string()))?;
        let mut state = self.state.lock().unwrap();
        let labels = state.repo_labels.entry(repo.to_string()).or_default();
        let before = labels.len();
        labels.retain(|l| l.name != name);
        if labels.len() == before {
            return Err(StoreError::NotFound(name.to_string()));
        }
        Ok(())
    }

    async fn add_labels_to_issue(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        names: &[String],
    ) -> StoreResult<()> {
        self.record(Call::AddLabels(
            repo.to_string(),
            issue_number,
            names.to_vec(),
        ))?;
        let mut state = self.state.lock().unwrap();
        state
            .issue_labels
            .entry((repo.to_string(), issue_number))
            .or_default()
            .extend(names.iter().cloned());
        Ok(())
    }

    async fn remove_label_from_issue(
        &self,
        repo: &RepoRef,
        issue_number: u64,
        name: &str,
    ) -> StoreResult<()> {
        self.record(Call::RemoveLabel(
            repo.to_string(),
            issue_number,
            name.to_string(),
        ))?;
        let mut state = self.state.lock().unwrap();
        let removed = state
            .issue_labels
            .get_mut(&(repo.to_string(), issue_number))
            .map(|labels| labels.remove(name))
            .unwrap_or(false);
        if !removed {
            return Err(StoreError::NotFound(format!("Label does not exist: {}", name)));
        }
        Ok(())
    }

    async fn list_reviews(&self, repo: &RepoRef, pr_number: u64) -> StoreResult<Vec<Review>> {
        self.record(Call::ListReviews(repo.to_string(), pr_number))?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .reviews
            .get(&(repo.to_string(), pr_number))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_repositories_by_org(
        &self,
        org: &str,
        page: u32,
        _per_page: u8,
    ) -> StoreResult<RepositoryPage> {
        self.record(Call::ListRepositories(org.to_string(), page))?;
        let state = self.state.lock().unwrap();
        let pages = state.org_pages.get(org).cloned().unwrap_or_default();
        let index = page.saturating_sub(1) as usize;
        let repositories = pages.get(index).cloned().unwrap_or_default();
        let next_page = if index + 1 < pages.len() { page + 1 } else { 0 };
        Ok(RepositoryPage {
            repositories,
            next_page,
        })
    }
}
