//! Job planning: which (account, day) pairs need (re)download.

use adpull_config::DownloadConfig;
use adpull_core::AccountId;
use adpull_insights::AdAccount;
use adpull_scheduler::Job;
use adpull_storage::performance_db_path;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;

/// Restricts `accounts` to the configured allowlist, if one is set.
#[must_use]
pub fn filter_accounts(config: &DownloadConfig, accounts: Vec<AdAccount>) -> Vec<AdAccount> {
    match &config.target_accounts {
        Some(targets) => {
            let targets: Vec<AccountId> =
                targets.iter().map(|t| AccountId::new(t.as_str())).collect();
            accounts
                .into_iter()
                .filter(|account| targets.contains(&AccountId::new(account.account_id.as_str())))
                .collect()
        }
        None => accounts,
    }
}

/// Builds the seed job list for every account.
#[must_use]
pub fn plan_jobs(
    config: &DownloadConfig,
    accounts: &[AdAccount],
    now: DateTime<Utc>,
) -> Vec<Job> {
    accounts
        .iter()
        .flat_map(|account| plan_account_jobs(config, account, now))
        .collect()
}

/// Builds the seed job list for one account.
///
/// Walks backwards from the last completed day in the account's
/// reporting time zone to the later of the configured first date and
/// the account's creation date. A day needs a job when its destination
/// database is missing or the day still falls inside the redownload
/// window.
#[must_use]
pub fn plan_account_jobs(
    config: &DownloadConfig,
    account: &AdAccount,
    now: DateTime<Utc>,
) -> Vec<Job> {
    let account_id = AccountId::new(account.account_id.as_str());
    let last_date = last_report_date(account, now);
    let first_date = account
        .created_date()
        .map_or(config.first_date, |created| created.max(config.first_date));

    let mut jobs = Vec::new();
    let mut current = last_date;
    while current >= first_date {
        let destination = performance_db_path(&config.data_dir, current, &account_id);
        let age_days = (last_date - current).num_days();
        if !destination.is_file() || age_days <= i64::from(config.redownload_window_days) {
            jobs.push(Job::new(account_id.clone(), current, destination));
        }
        match current.pred_opt() {
            Some(previous) => current = previous,
            None => break,
        }
    }
    debug!(account = %account_id, jobs = jobs.len(), %last_date, %first_date,
           "account jobs planned");
    jobs
}

/// Yesterday in the account's reporting time zone: the most recent day
/// with complete data.
fn last_report_date(account: &AdAccount, now: DateTime<Utc>) -> NaiveDate {
    let offset_hours = account.timezone_offset_hours_utc.unwrap_or(0.0);
    #[allow(clippy::cast_possible_truncation)]
    let offset_secs = (offset_hours * 3600.0) as i64;
    let local_today = (now + Duration::seconds(offset_secs)).date_naive();
    local_today.pred_opt().unwrap_or(local_today)
}
