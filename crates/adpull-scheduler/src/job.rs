//! Download job definition and dispatch ordering.

use adpull_core::AccountId;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::path::PathBuf;

/// One (account, day) download-and-persist unit of work.
///
/// A job is owned by exactly one of the job queue, a worker's active
/// execution, or the retry queue at any instant. Only `attempt` ever
/// changes: a worker increments it immediately before each execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Target ad account.
    pub account_id: AccountId,

    /// The single calendar day this job covers.
    pub date: NaiveDate,

    /// Where the result for this (account, day) pair is stored.
    pub destination: PathBuf,

    /// Number of times this job has been dispatched to a worker.
    pub attempt: u32,
}

impl Job {
    /// Creates a fresh job for one (account, day) pair.
    #[must_use]
    pub fn new(account_id: AccountId, date: NaiveDate, destination: PathBuf) -> Self {
        Self {
            account_id,
            date,
            destination,
            attempt: 0,
        }
    }
}

/// Dispatch priority between two ready jobs, `Ordering::Greater` meaning
/// `a` runs first.
///
/// Jobs that have failed before are retried preferentially over fresh
/// ones; among equals, more recent days beat older backfill.
#[must_use]
pub fn dispatch_order(a: &Job, b: &Job) -> Ordering {
    a.attempt.cmp(&b.attempt).then(a.date.cmp(&b.date))
}
