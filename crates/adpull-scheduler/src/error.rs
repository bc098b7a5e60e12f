//! Scheduler error types.

use adpull_core::{AccountId, AdpullError};
use chrono::NaiveDate;
use thiserror::Error;

/// Result type for scheduler operations.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Errors that abort a scheduling run.
///
/// Retryable download failures never surface here; they are handled
/// inside the worker loop. Whatever reaches the caller is the single
/// fatal cause of the run's failure.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The requested worker pool cannot make progress.
    #[error("invalid worker count {0}, need at least 1")]
    InvalidWorkerCount(usize),

    /// A job kept failing retryably past the attempt limit.
    #[error("download for account {account_id} on {date} failed {attempts} times, giving up: {source}")]
    RetriesExhausted {
        account_id: AccountId,
        date: NaiveDate,
        attempts: u32,
        source: AdpullError,
    },

    /// A job failed with an error that is not retryable.
    #[error("download for account {account_id} on {date} failed: {source}")]
    JobFailed {
        account_id: AccountId,
        date: NaiveDate,
        source: AdpullError,
    },
}
