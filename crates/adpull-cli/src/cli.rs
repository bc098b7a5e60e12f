//! Command-line arguments.
//!
//! Every option overrides its configuration counterpart; unset options
//! leave the layered configuration untouched.

use adpull_config::AppConfig;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Downloads Facebook Ads performance data to local files.
#[derive(Debug, Parser)]
#[command(name = "adpull", version, about)]
pub struct CliArgs {
    /// Directory holding the layered TOML configuration.
    #[arg(long, default_value = "./config")]
    pub config_dir: String,

    /// App ID from the app's settings in Facebook for Developers.
    #[arg(long)]
    pub app_id: Option<String>,

    /// App secret from the app's settings.
    #[arg(long)]
    pub app_secret: Option<String>,

    /// Access token of a system user with read_insights and ads_read.
    #[arg(long, env = "ADPULL_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Directory where result data is written to.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// The first day for which data is downloaded, e.g. 2015-01-01.
    #[arg(long)]
    pub first_date: Option<NaiveDate>,

    /// Number of days for which performance data is redownloaded.
    #[arg(long)]
    pub redownload_window: Option<u32>,

    /// Comma-separated account IDs to download; all accounts if unset.
    #[arg(long, value_delimiter = ',')]
    pub target_accounts: Option<Vec<String>>,

    /// Number of concurrent download workers.
    #[arg(long)]
    pub workers: Option<usize>,
}

impl CliArgs {
    /// Applies the set options onto the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(app_id) = &self.app_id {
            config.api.app_id.clone_from(app_id);
        }
        if let Some(app_secret) = &self.app_secret {
            config.api.app_secret.clone_from(app_secret);
        }
        if let Some(access_token) = &self.access_token {
            config.api.access_token.clone_from(access_token);
        }
        if let Some(data_dir) = &self.data_dir {
            config.download.data_dir.clone_from(data_dir);
        }
        if let Some(first_date) = self.first_date {
            config.download.first_date = first_date;
        }
        if let Some(window) = self.redownload_window {
            config.download.redownload_window_days = window;
        }
        if let Some(accounts) = &self.target_accounts {
            config.download.target_accounts = Some(accounts.clone());
        }
        if let Some(workers) = self.workers {
            config.download.workers = workers;
        }
    }
}
