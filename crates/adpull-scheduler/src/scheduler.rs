//! Scheduler controller: seeds the queues, runs the pool, owns shutdown.

use crate::error::{SchedulerError, SchedulerResult};
use crate::fetch::ReportFetcher;
use crate::job::Job;
use crate::queue::JobQueue;
use crate::retry::{RetryPolicy, RetryQueue};
use crate::shutdown;
use crate::state::RunState;
use crate::worker::Worker;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Runs batches of download jobs to completion.
///
/// One [`run`](Scheduler::run) call is one self-contained scheduling
/// run: it owns its queues, its run state, and its shutdown signal, and
/// tears everything down before returning.
pub struct Scheduler<F> {
    fetcher: Arc<F>,
    policy: RetryPolicy,
}

impl<F: ReportFetcher + 'static> Scheduler<F> {
    /// Creates a scheduler executing jobs through `fetcher`.
    #[must_use]
    pub fn new(fetcher: Arc<F>, policy: RetryPolicy) -> Self {
        Self { fetcher, policy }
    }

    /// Runs `jobs` on `worker_count` concurrent workers, blocking until
    /// every job has succeeded or the first fatal error is recorded.
    ///
    /// On failure the single fatal cause is returned; in-flight and
    /// queued jobs are abandoned without further attempts.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::InvalidWorkerCount`] if `worker_count` is zero
    /// (rejected before any task is spawned), otherwise the recorded
    /// fatal error of the run.
    pub async fn run(&self, jobs: Vec<Job>, worker_count: usize) -> SchedulerResult<()> {
        if worker_count == 0 {
            return Err(SchedulerError::InvalidWorkerCount(worker_count));
        }

        let total = jobs.len();
        let queue = Arc::new(JobQueue::new());
        let retries = Arc::new(RetryQueue::new());
        let state = Arc::new(RunState::new(total));
        let (shutdown_handle, shutdown) = shutdown::channel();

        for job in jobs {
            queue.push(job);
        }
        info!(jobs = total, workers = worker_count, "scheduling run started");

        let dispatcher: JoinHandle<()> = tokio::spawn(
            Arc::clone(&retries).dispatch(Arc::clone(&queue), shutdown.clone()),
        );
        let workers: Vec<JoinHandle<()>> = (0..worker_count)
            .map(|id| {
                let worker = Worker {
                    id,
                    queue: Arc::clone(&queue),
                    retries: Arc::clone(&retries),
                    state: Arc::clone(&state),
                    fetcher: Arc::clone(&self.fetcher),
                    policy: self.policy.clone(),
                    shutdown: shutdown.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        state.terminal().await;

        // Two distinct wait points exist: blocked pops on the job queue,
        // and the timed waits observing the watch channel (dispatcher
        // sleep, rate-limit pauses). Both get woken here.
        shutdown_handle.trigger();
        queue.close();

        for handle in workers {
            if let Err(err) = handle.await {
                error!(error = %err, "worker task failed");
            }
        }
        if let Err(err) = dispatcher.await {
            error!(error = %err, "retry dispatcher task failed");
        }

        match state.take_fatal() {
            Some(err) => {
                error!(error = %err, "scheduling run failed");
                Err(err)
            }
            None => {
                info!(jobs = total, "scheduling run complete");
                Ok(())
            }
        }
    }
}
