//! Failure handling for loops over independent items
//!
//! Deleting denylisted labels, converging template labels and bootstrapping
//! every repository of an organization are all loops where one item failing
//! says nothing about the next. `Batch` isolates each item's result so the
//! same loop body works for both policies.

pub use gh_label_config::FailurePolicy;

/// Collects per-item results according to a [`FailurePolicy`]
#[derive(Debug)]
pub struct Batch<E> {
    policy: FailurePolicy,
    errors: Vec<E>,
}

impl<E> Batch<E> {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            policy,
            errors: Vec::new(),
        }
    }

    /// Record one item's result
    ///
    /// Under `FailFast` the first error is returned for the caller to `?`.
    /// Under `Collect` it is kept and `Ok(())` lets the loop go on.
    pub fn record(&mut self, result: Result<(), E>) -> Result<(), E> {
        match (result, self.policy) {
            (Ok(()), _) => Ok(()),
            (Err(e), FailurePolicy::FailFast) => Err(e),
            (Err(e), FailurePolicy::Collect) => {
                self.errors.push(e);
                Ok(())
            }
        }
    }

    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// Errors collected so far (always empty under `FailFast`)
    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }
}
