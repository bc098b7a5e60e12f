//! Application configuration structures.

use adpull_core::{AdpullError, AdpullResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Graph API access configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Download scope and data directory.
    #[serde(default)]
    pub download: DownloadConfig,

    /// Retry/backoff discipline.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            download: DownloadConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Validates the configuration, failing fast on values the run
    /// could only trip over later.
    ///
    /// # Errors
    ///
    /// `AdpullError::Configuration` naming the first offending value.
    pub fn validate(&self) -> AdpullResult<()> {
        if self.api.access_token.is_empty() {
            return Err(AdpullError::configuration("api.access_token must be set"));
        }
        if self.download.workers == 0 {
            return Err(AdpullError::configuration(
                "download.workers must be at least 1",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(AdpullError::configuration(
                "retry.max_attempts must be at least 1",
            ));
        }
        if self.retry.base_delay_secs == 0 {
            return Err(AdpullError::configuration(
                "retry.base_delay_secs must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Graph API access configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// App ID from the app's settings in Facebook for Developers.
    #[serde(default)]
    pub app_id: String,

    /// App secret from the app's settings.
    #[serde(default)]
    pub app_secret: String,

    /// Access token of a system user with `read_insights` and `ads_read`.
    #[serde(default)]
    pub access_token: String,

    /// The user whose ad accounts are downloaded.
    #[serde(default = "default_account_id")]
    pub account_id: String,

    /// Graph API version segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// API host, overridable for tests.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_secret: String::new(),
            access_token: String::new(),
            account_id: default_account_id(),
            api_version: default_api_version(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ApiConfig {
    /// Returns the request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_account_id() -> String {
    "me".to_string()
}

fn default_api_version() -> String {
    "v19.0".to_string()
}

fn default_base_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_timeout() -> u64 {
    120
}

/// Download scope and data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory result data is written to.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// First day for which data is downloaded.
    #[serde(default = "default_first_date")]
    pub first_date: NaiveDate,

    /// Days for which performance data is downloaded again.
    #[serde(default = "default_redownload_window")]
    pub redownload_window_days: u32,

    /// Optional allowlist of account IDs; all reachable accounts when
    /// unset.
    #[serde(default)]
    pub target_accounts: Option<Vec<String>>,

    /// Number of concurrent download workers.
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            first_date: default_first_date(),
            redownload_window_days: default_redownload_window(),
            target_accounts: None,
            workers: default_workers(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/tmp/facebook_ads")
}

fn default_first_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

fn default_redownload_window() -> u32 {
    28
}

fn default_workers() -> usize {
    4
}

/// Retry/backoff discipline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts allowed per job, the first one included.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff base in seconds: the delay after the first failed attempt.
    #[serde(default = "default_base_delay")]
    pub base_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay(),
        }
    }
}

impl RetryConfig {
    /// Returns the backoff base as a Duration.
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        Duration::from_secs(self.base_delay_secs)
    }
}

fn default_max_attempts() -> u32 {
    8
}

fn default_base_delay() -> u64 {
    60
}
