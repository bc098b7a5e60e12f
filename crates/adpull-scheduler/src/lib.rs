//! # Adpull Scheduler
//!
//! Concurrent download scheduler: runs a set of per-day, per-account
//! download jobs against a rate-limited remote API with:
//! - A priority job queue (retried jobs first, then most recent days)
//! - A time-ordered retry queue with exponential backoff
//! - A fixed pool of concurrent workers
//! - First-fatal-error-wins abort semantics with clean shutdown
//!
//! # Architecture
//!
//! ```text
//!   seed jobs ──► Job Queue ──► Worker 1..N ──► fetch_and_persist
//!                    ▲               │
//!                    │        retryable failure
//!                    │               ▼
//!            Retry Dispatcher ◄── Retry Queue (ordered by due time)
//! ```
//!
//! The controller ([`Scheduler::run`]) blocks until every job has
//! succeeded or the first fatal error is recorded, then wakes every
//! blocked worker and the dispatcher and joins them before returning.

pub mod error;
pub mod fetch;
pub mod job;
pub mod queue;
pub mod retry;
pub mod scheduler;
pub mod shutdown;
pub mod state;

mod worker;

pub use error::{SchedulerError, SchedulerResult};
pub use fetch::ReportFetcher;
pub use job::{dispatch_order, Job};
pub use queue::JobQueue;
pub use retry::{retry_order, RetryEntry, RetryPolicy, RetryQueue};
pub use scheduler::Scheduler;
pub use shutdown::{Shutdown, ShutdownHandle};
pub use state::RunState;
