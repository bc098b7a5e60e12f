//! Shared state for one scheduling run.

use crate::error::SchedulerError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tracing::debug;

/// Counters and flags shared by the controller, the workers, and the
/// retry dispatcher for the duration of one run.
///
/// The run is terminal once either every job has succeeded (`remaining`
/// reached zero) or a fatal error has been recorded. The first fatal
/// error wins; later ones are dropped.
#[derive(Debug)]
pub struct RunState {
    remaining: AtomicUsize,
    fatal: Mutex<Option<SchedulerError>>,
    terminal: Notify,
}

impl RunState {
    /// Creates state for a run of `total` jobs.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(total),
            fatal: Mutex::new(None),
            terminal: Notify::new(),
        }
    }

    /// Number of jobs not yet terminally resolved.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Records one terminally-successful job, signaling the controller
    /// when the last one lands.
    pub fn complete_one(&self) {
        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.terminal.notify_one();
        }
    }

    /// Records a fatal error and signals the controller.
    pub fn fail(&self, err: SchedulerError) {
        let mut fatal = self.fatal.lock();
        if fatal.is_none() {
            *fatal = Some(err);
            drop(fatal);
            self.terminal.notify_one();
        } else {
            debug!(error = %err, "fatal error already recorded, dropping");
        }
    }

    /// Returns true once a fatal error has been recorded.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.fatal.lock().is_some()
    }

    /// Returns true once the run has reached a terminal condition.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_fatal() || self.remaining() == 0
    }

    /// Blocks until the run reaches a terminal condition.
    pub async fn terminal(&self) {
        loop {
            let notified = self.terminal.notified();
            if self.is_terminal() {
                return;
            }
            notified.await;
        }
    }

    /// Takes the recorded fatal error, if any.
    #[must_use]
    pub fn take_fatal(&self) -> Option<SchedulerError> {
        self.fatal.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn fatal(n: usize) -> SchedulerError {
        SchedulerError::InvalidWorkerCount(n)
    }

    #[test]
    fn test_completion_counts_down() {
        let state = RunState::new(2);
        assert_eq!(state.remaining(), 2);
        state.complete_one();
        assert!(!state.is_terminal());
        state.complete_one();
        assert!(state.is_terminal());
        assert!(state.take_fatal().is_none());
    }

    #[test]
    fn test_first_fatal_error_wins() {
        let state = RunState::new(5);
        state.fail(fatal(1));
        state.fail(fatal(2));
        assert!(state.is_fatal());
        match state.take_fatal() {
            Some(SchedulerError::InvalidWorkerCount(n)) => assert_eq!(n, 1),
            other => panic!("unexpected fatal slot: {other:?}"),
        }
    }

    #[test]
    fn test_zero_jobs_is_terminal_immediately() {
        let state = RunState::new(0);
        assert!(state.is_terminal());
    }

    #[tokio::test]
    async fn test_terminal_wakes_on_last_completion() {
        let state = Arc::new(RunState::new(1));
        let waiter = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.terminal().await })
        };
        tokio::task::yield_now().await;
        state.complete_one();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("controller must wake when remaining hits zero")
            .expect("waiter task must not panic");
    }

    #[tokio::test]
    async fn test_terminal_wakes_on_fatal() {
        let state = Arc::new(RunState::new(3));
        let waiter = {
            let state = Arc::clone(&state);
            tokio::spawn(async move { state.terminal().await })
        };
        tokio::task::yield_now().await;
        state.fail(fatal(0));

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("controller must wake on a fatal error")
            .expect("waiter task must not panic");
    }
}
