//! Priority queue of runnable jobs.

use crate::job::{dispatch_order, Job};
use parking_lot::Mutex;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use tokio::sync::Semaphore;

/// Heap slot ordered by [`dispatch_order`].
struct Prioritized(Job);

impl PartialEq for Prioritized {
    fn eq(&self, other: &Self) -> bool {
        dispatch_order(&self.0, &other.0) == Ordering::Equal
    }
}

impl Eq for Prioritized {}

impl PartialOrd for Prioritized {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Prioritized {
    fn cmp(&self, other: &Self) -> Ordering {
        dispatch_order(&self.0, &other.0)
    }
}

/// Concurrent priority queue of runnable jobs.
///
/// `push` never blocks; [`pop`](JobQueue::pop) suspends while the queue
/// is empty until a job arrives or [`close`](JobQueue::close) is called.
/// The semaphore's permit count mirrors the heap length, and closing it
/// wakes every blocked popper at once, so shutdown can never strand a
/// worker inside `pop`.
pub struct JobQueue {
    heap: Mutex<BinaryHeap<Prioritized>>,
    ready: Semaphore,
}

impl JobQueue {
    /// Creates an empty, open queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            heap: Mutex::new(BinaryHeap::new()),
            ready: Semaphore::new(0),
        }
    }

    /// Adds a runnable job.
    pub fn push(&self, job: Job) {
        self.heap.lock().push(Prioritized(job));
        self.ready.add_permits(1);
    }

    /// Removes and returns the highest-priority job, waiting for one to
    /// arrive if the queue is empty.
    ///
    /// Returns `None` once the queue has been closed, including for
    /// callers already blocked at that moment.
    pub async fn pop(&self) -> Option<Job> {
        loop {
            match self.ready.acquire().await {
                Ok(permit) => {
                    permit.forget();
                    if let Some(Prioritized(job)) = self.heap.lock().pop() {
                        return Some(job);
                    }
                }
                Err(_) => return None,
            }
        }
    }

    /// Closes the queue, waking every blocked [`pop`](JobQueue::pop).
    pub fn close(&self) {
        self.ready.close();
    }

    /// Number of queued jobs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.lock().len()
    }

    /// Returns true if no jobs are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.lock().is_empty()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}
