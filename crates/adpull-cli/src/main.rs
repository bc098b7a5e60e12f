//! # Adpull
//!
//! Main entry point: loads configuration, discovers ad accounts,
//! exports the account structure, plans the per-day download jobs, and
//! hands them to the scheduler.

use adpull_config::ConfigLoader;
use adpull_download::{export_account_structure, filter_accounts, plan_jobs, DownloadFetcher};
use adpull_insights::{GraphClient, GraphClientConfig};
use adpull_scheduler::{RetryPolicy, Scheduler};
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

mod cli;

use cli::CliArgs;

#[tokio::main]
async fn main() {
    init_logging();

    info!("Starting adpull...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run().await {
        error!("Application error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let loader = ConfigLoader::new(args.config_dir.as_str())?;
    let mut config = loader.get().await;
    args.apply(&mut config);
    config.validate()?;

    let client = GraphClient::new(&GraphClientConfig {
        base_url: config.api.base_url.clone(),
        api_version: config.api.api_version.clone(),
        access_token: config.api.access_token.clone(),
        timeout: config.api.timeout(),
    })?;

    let accounts = client.ad_accounts(&config.api.account_id).await?;
    let accounts = filter_accounts(&config.download, accounts);
    info!(accounts = accounts.len(), "ad accounts discovered");

    export_account_structure(&client, &config.download.data_dir, &accounts).await?;

    let jobs = plan_jobs(&config.download, &accounts, Utc::now());
    info!(jobs = jobs.len(), workers = config.download.workers, "download jobs planned");

    let fetcher = Arc::new(DownloadFetcher::new(client));
    let policy = RetryPolicy::new(config.retry.max_attempts, config.retry.base_delay());
    let scheduler = Scheduler::new(fetcher, policy);
    scheduler.run(jobs, config.download.workers).await?;

    info!("Download complete");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,adpull=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}
