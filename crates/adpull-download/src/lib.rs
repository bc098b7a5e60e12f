//! # Adpull Download
//!
//! Glue between the scheduler core and its collaborators: planning
//! which (account, day) pairs need (re)download, the
//! [`ReportFetcher`](adpull_scheduler::ReportFetcher) implementation
//! that ties the Graph API client to local storage, and the
//! account-structure export.

pub mod fetcher;
pub mod plan;
pub mod structure;

pub use fetcher::DownloadFetcher;
pub use plan::{filter_accounts, plan_account_jobs, plan_jobs};
pub use structure::{build_structure_rows, export_account_structure};
