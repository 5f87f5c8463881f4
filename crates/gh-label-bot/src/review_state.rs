//! Pull request review labels
//!
//! The approval count alone decides which labels a pull request should
//! carry. Nothing is remembered between events: every call recomputes the
//! transition from the count and issues idempotent add/remove operations,
//! so dismissed reviews are picked up the next time any event arrives.
//!
//! | approvals        | add              | remove                             |
//! |------------------|------------------|------------------------------------|
//! | 1                | first approval   | ready to merge                     |
//! | >= threshold     | ready to merge   | ready for review, first approval   |
//! | anything else    |                  | ready to merge, first approval     |

use crate::approvals::count_approvals;
use crate::labels::{FIRST_APPROVAL, READY_FOR_REVIEW, READY_TO_MERGE};
use gh_client::{LabelStore, PullRequestRef, StoreError};
use gh_label_config::BotConfig;
use log::{debug, error, info, warn};

/// Approvals needed before a PR is "ready to merge" unless configured otherwise
pub const APPROVED_REVIEWS_BEFORE_READY_TO_MERGE: u32 = 2;

/// Label operations for one approval count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub add: Vec<&'static str>,
    pub remove: Vec<&'static str>,
}

/// Computes and applies review label transitions
#[derive(Debug, Clone, Copy)]
pub struct ReviewStateMachine {
    ready_to_merge_threshold: u32,
}

impl Default for ReviewStateMachine {
    fn default() -> Self {
        Self::new(APPROVED_REVIEWS_BEFORE_READY_TO_MERGE)
    }
}

impl ReviewStateMachine {
    pub fn new(ready_to_merge_threshold: u32) -> Self {
        Self {
            ready_to_merge_threshold,
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.approvals_before_ready_to_merge)
    }

    pub fn threshold(&self) -> u32 {
        self.ready_to_merge_threshold
    }

    /// Pure decision table from approval count to label operations
    pub fn transition(&self, approvals: usize) -> Transition {
        if approvals == 1 {
            Transition {
                add: vec![FIRST_APPROVAL],
                remove: vec![READY_TO_MERGE],
            }
        } else if approvals >= self.ready_to_merge_threshold as usize {
            Transition {
                add: vec![READY_TO_MERGE],
                remove: vec![READY_FOR_REVIEW, FIRST_APPROVAL],
            }
        } else {
            Transition {
                add: vec![],
                remove: vec![READY_TO_MERGE, FIRST_APPROVAL],
            }
        }
    }

    /// Apply the transition for `approvals` to a pull request
    ///
    /// Additions are issued first. A failed addition aborts with the error.
    /// Removing a label that is not attached is expected and only logged.
    pub async fn apply_labels_for_approvals(
        &self,
        store: &dyn LabelStore,
        pr: &PullRequestRef,
        approvals: usize,
    ) -> Result<(), StoreError> {
        let transition = self.transition(approvals);
        debug!(
            "PR {} with {} approvals: add {:?}, remove {:?}",
            pr.url, approvals, transition.add, transition.remove
        );

        for label in &transition.add {
            let names = [label.to_string()];
            store
                .add_labels_to_issue(&pr.repo, pr.number, &names)
                .await
                .map_err(|e| {
                    error!("Could not add label {} to PR {}: {}", label, pr.url, e);
                    e
                })?;
        }

        for label in &transition.remove {
            match store.remove_label_from_issue(&pr.repo, pr.number, label).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    debug!(
                        "Could not remove label {} from PR {}, it probably doesn't exist",
                        label, pr.url
                    );
                }
                Err(e) => {
                    warn!("Could not remove label {} from PR {}: {}", label, pr.url, e);
                    return Err(e);
                }
            }
        }

        Ok(())
    }

    /// Recount the approvals of a pull request and apply its transition
    pub async fn sync_pull_request(
        &self,
        store: &dyn LabelStore,
        pr: &PullRequestRef,
    ) -> Result<usize, StoreError> {
        let reviews = store
            .list_reviews(&pr.repo, pr.number)
            .await
            .map_err(|e| {
                error!("Could not list reviews for PR {}: {}", pr.url, e);
                e
            })?;

        let approvals = count_approvals(&reviews);
        info!("PR {} received {} approvals", pr.number, approvals);

        self.apply_labels_for_approvals(store, pr, approvals)
            .await?;
        Ok(approvals)
    }
}
