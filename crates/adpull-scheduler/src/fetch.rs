//! External collaborator interface for performing one download.

use adpull_core::{AccountId, AdpullResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;

/// Downloads the performance report for one (account, day) pair and
/// persists it at `destination`.
///
/// The scheduler owns the retry discipline; implementations only
/// classify failures, via [`AdpullError::is_retryable`] and
/// [`AdpullError::is_rate_limit`].
///
/// [`AdpullError::is_retryable`]: adpull_core::AdpullError::is_retryable
/// [`AdpullError::is_rate_limit`]: adpull_core::AdpullError::is_rate_limit
#[async_trait]
pub trait ReportFetcher: Send + Sync {
    /// Fetches one day of one account and writes it to `destination`.
    async fn fetch_and_persist(
        &self,
        account_id: &AccountId,
        date: NaiveDate,
        destination: &Path,
    ) -> AdpullResult<()>;
}
