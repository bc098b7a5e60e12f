//! The scheduler's external collaborator: Graph API in, SQLite out.

use adpull_core::{AccountId, AdpullResult};
use adpull_insights::GraphClient;
use adpull_scheduler::ReportFetcher;
use adpull_storage::{upsert_performance, PerformanceRow};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::path::Path;
use tracing::debug;

/// Downloads one day of one account's ad performance and upserts it
/// into the destination database.
pub struct DownloadFetcher {
    client: GraphClient,
}

impl DownloadFetcher {
    /// Creates a fetcher downloading through `client`.
    #[must_use]
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportFetcher for DownloadFetcher {
    async fn fetch_and_persist(
        &self,
        account_id: &AccountId,
        date: NaiveDate,
        destination: &Path,
    ) -> AdpullResult<()> {
        let insights = self.client.insights(account_id, date).await?;
        let rows: Vec<PerformanceRow> = insights
            .iter()
            .map(PerformanceRow::from_insight)
            .collect::<AdpullResult<_>>()?;
        debug!(account = %account_id, %date, rows = rows.len(), "persisting day");
        upsert_performance(destination, &rows).await
    }
}
