//! Supervised background jobs
//!
//! Installation bootstraps can take minutes for large organizations, so they
//! run detached from the webhook request that triggered them. Every job is
//! tracked in a [`JoinSet`]: failures and panics are logged, never
//! propagated, and [`BackgroundJobs::shutdown`] drains what is still
//! running before the process exits.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::{JoinError, JoinSet};

#[derive(Default)]
pub struct BackgroundJobs {
    tasks: Mutex<JoinSet<()>>,
    closed: AtomicBool,
}

impl BackgroundJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a job unless shutdown has begun
    ///
    /// Returns `false` when the job was refused. Must be called from within a
    /// tokio runtime.
    pub fn spawn<F>(&self, name: impl Into<String>, job: F) -> bool
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name = name.into();

        // Checked under the lock: shutdown closes first, then takes the set
        let mut tasks = self.lock();
        if self.closed.load(Ordering::SeqCst) {
            log::warn!("Refusing background job {}: shutting down", name);
            return false;
        }
        reap_finished(&mut tasks);

        log::info!("Starting background job {}", name);
        tasks.spawn(async move {
            match job.await {
                Ok(()) => log::info!("Background job {} finished", name),
                Err(e) => log::error!("Background job {} failed: {:#}", name, e),
            }
        });
        true
    }

    /// Number of jobs that have not finished yet
    pub fn active(&self) -> usize {
        let mut tasks = self.lock();
        reap_finished(&mut tasks);
        tasks.len()
    }

    /// Stop accepting jobs and wait up to `grace` for running ones
    ///
    /// Jobs still running after the grace period are aborted. Returns how many
    /// were aborted.
    pub async fn shutdown(&self, grace: Duration) -> usize {
        if self.closed.swap(true, Ordering::SeqCst) {
            log::debug!("Background jobs already shut down");
            return 0;
        }

        let mut tasks = std::mem::take(&mut *self.lock());
        log::info!(
            "Draining {} background jobs (grace period {:?})",
            tasks.len(),
            grace
        );

        let drained = tokio::time::timeout(grace, async {
            while let Some(result) = tasks.join_next().await {
                log_join_error(result);
            }
        })
        .await;

        if drained.is_ok() {
            log::info!("All background jobs finished");
            return 0;
        }

        let remaining = tasks.len();
        log::warn!(
            "Aborting {} background jobs still running after {:?}",
            remaining,
            grace
        );
        tasks.shutdown().await;
        remaining
    }

    fn lock(&self) -> MutexGuard<'_, JoinSet<()>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn reap_finished(tasks: &mut JoinSet<()>) {
    while let Some(result) = tasks.try_join_next() {
        log_join_error(result);
    }
}

fn log_join_error(result: Result<(), JoinError>) {
    match result {
        Ok(()) => {}
        Err(e) if e.is_panic() => log::error!("Background job panicked: {}", e),
        Err(e) => log::debug!("Background job cancelled: {}", e),
    }
}
