//! Retry policy, retry queue, and the dispatcher that promotes due
//! entries back into the job queue.

use crate::job::Job;
use crate::queue::JobQueue;
use crate::shutdown::Shutdown;
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Retry discipline for failed downloads.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts allowed per job, the first one included.
    pub max_attempts: u32,

    /// Backoff base: the delay after the first failed attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // 7 additional attempts after the first, starting at one minute.
        Self {
            max_attempts: 8,
            base_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempt ceiling and backoff base.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Returns true if a job whose `attempt`-th try just failed may be
    /// re-attempted.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay before re-running a job whose `attempt`-th try failed:
    /// `base_delay * 2^(attempt - 1)`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt - 1))
    }
}

/// A job waiting out its backoff delay.
#[derive(Debug)]
pub struct RetryEntry {
    /// Absolute time after which the job may re-enter the job queue.
    pub due_at: Instant,

    /// The job itself.
    pub job: Job,
}

/// Promotion order between two retry entries, `Ordering::Less` meaning
/// `a` comes due first.
#[must_use]
pub fn retry_order(a: &RetryEntry, b: &RetryEntry) -> Ordering {
    a.due_at.cmp(&b.due_at)
}

/// Heap slot reversed so the binary heap surfaces the earliest due entry.
struct Earliest(RetryEntry);

impl PartialEq for Earliest {
    fn eq(&self, other: &Self) -> bool {
        retry_order(&self.0, &other.0) == Ordering::Equal
    }
}

impl Eq for Earliest {}

impl PartialOrd for Earliest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Earliest {
    fn cmp(&self, other: &Self) -> Ordering {
        retry_order(&other.0, &self.0)
    }
}

/// Time-ordered queue of jobs awaiting retry.
///
/// Workers insert through [`schedule`](RetryQueue::schedule); the single
/// [`dispatch`](RetryQueue::dispatch) loop moves due jobs back into the
/// job queue. The dispatcher never busy-polls: it sleeps exactly until
/// the nearest deadline and is woken early only by a new insertion or by
/// shutdown.
pub struct RetryQueue {
    heap: Mutex<BinaryHeap<Earliest>>,
    changed: Notify,
}

impl RetryQueue {
    /// Creates an empty retry queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            changed: Notify::new(),
        }
    }

    /// Schedules `job` to re-enter the job queue once `due_at` passes.
    pub fn schedule(&self, job: Job, due_at: Instant) {
        self.heap.lock().push(Earliest(RetryEntry { due_at, job }));
        self.changed.notify_one();
    }

    /// Number of jobs awaiting retry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    /// Returns true if no jobs await retry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.lock().is_empty()
    }

    /// Runs the dispatcher loop until shutdown.
    pub async fn dispatch(self: Arc<Self>, jobs: Arc<JobQueue>, shutdown: Shutdown) {
        debug!("retry dispatcher started");
        loop {
            if shutdown.is_triggered() {
                break;
            }
            // Register for insertions before inspecting the heap so a
            // concurrent `schedule` cannot slip past unnoticed.
            let inserted = self.changed.notified();

            let (due, next_due) = {
                let mut heap = self.heap.lock();
                let now = Instant::now();
                let mut due = Vec::new();
                while heap.peek().is_some_and(|entry| entry.0.due_at <= now) {
                    if let Some(entry) = heap.pop() {
                        due.push(entry.0.job);
                    }
                }
                (due, heap.peek().map(|entry| entry.0.due_at))
            };

            // The retry lock is released above; the job queue's lock is
            // never taken while it is held.
            for job in due {
                trace!(account = %job.account_id, date = %job.date, attempt = job.attempt,
                       "retry due, promoting to job queue");
                jobs.push(job);
            }

            match next_due {
                Some(deadline) => {
                    tokio::select! {
                        () = tokio::time::sleep_until(deadline) => {}
                        () = inserted => {}
                        () = shutdown.triggered() => break,
                    }
                }
                None => {
                    tokio::select! {
                        () = inserted => {}
                        () = shutdown.triggered() => break,
                    }
                }
            }
        }
        debug!("retry dispatcher stopped");
    }
}

impl Default for RetryQueue {
    fn default() -> Self {
        Self::new()
    }
}
