//! # Adpull Insights
//!
//! Facebook Graph API client: ad-account discovery, per-day ad
//! performance insights, and the campaign/ad-set/ad listings behind the
//! account-structure export. Handles cursor pagination transparently and
//! classifies API failures into the retryability taxonomy the scheduler
//! consumes.

pub mod client;
pub mod models;

pub use client::{GraphClient, GraphClientConfig};
pub use models::{
    parse_labels, Ad, AdAccount, AdLabel, AdSet, Campaign, Insight, Paged, Paging,
};
