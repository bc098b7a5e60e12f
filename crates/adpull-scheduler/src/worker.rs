//! Worker loop: pop, execute, route the outcome.

use crate::error::SchedulerError;
use crate::fetch::ReportFetcher;
use crate::queue::JobQueue;
use crate::retry::{RetryPolicy, RetryQueue};
use crate::shutdown::Shutdown;
use crate::state::RunState;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, error, warn};

/// One executor in the pool.
pub(crate) struct Worker<F> {
    pub(crate) id: usize,
    pub(crate) queue: Arc<JobQueue>,
    pub(crate) retries: Arc<RetryQueue>,
    pub(crate) state: Arc<RunState>,
    pub(crate) fetcher: Arc<F>,
    pub(crate) policy: RetryPolicy,
    pub(crate) shutdown: Shutdown,
}

impl<F: ReportFetcher> Worker<F> {
    pub(crate) async fn run(self) {
        debug!(worker = self.id, "worker started");
        while let Some(mut job) = self.queue.pop().await {
            if self.shutdown.is_triggered() {
                break;
            }
            job.attempt += 1;
            debug!(worker = self.id, account = %job.account_id, date = %job.date,
                   attempt = job.attempt, "downloading");

            match self
                .fetcher
                .fetch_and_persist(&job.account_id, job.date, &job.destination)
                .await
            {
                Ok(()) => {
                    debug!(worker = self.id, account = %job.account_id, date = %job.date,
                           "download complete");
                    self.state.complete_one();
                }
                Err(err) if err.is_retryable() && self.policy.should_retry(job.attempt) => {
                    let delay = self.policy.delay_for_attempt(job.attempt);
                    let due_at = Instant::now() + delay;
                    let limit_hit = err.is_rate_limit();
                    warn!(worker = self.id, account = %job.account_id, date = %job.date,
                          attempt = job.attempt, delay_secs = delay.as_secs(), error = %err,
                          "attempt failed, retry scheduled");
                    self.retries.schedule(job, due_at);

                    if limit_hit {
                        // The remote limit applies account-wide, so the next
                        // request from this worker would fail the same way.
                        // Hold it back until the retry comes due; shutdown
                        // cuts the pause short.
                        tokio::select! {
                            () = tokio::time::sleep_until(due_at) => {}
                            () = self.shutdown.triggered() => break,
                        }
                    }
                }
                Err(err) if err.is_retryable() => {
                    error!(worker = self.id, account = %job.account_id, date = %job.date,
                           attempts = job.attempt, error = %err,
                           "retry limit reached, aborting run");
                    self.state.fail(SchedulerError::RetriesExhausted {
                        account_id: job.account_id,
                        date: job.date,
                        attempts: job.attempt,
                        source: err,
                    });
                }
                Err(err) => {
                    error!(worker = self.id, account = %job.account_id, date = %job.date,
                           error = %err, "unrecoverable failure, aborting run");
                    self.state.fail(SchedulerError::JobFailed {
                        account_id: job.account_id,
                        date: job.date,
                        source: err,
                    });
                }
            }
        }
        debug!(worker = self.id, "worker stopped");
    }
}
