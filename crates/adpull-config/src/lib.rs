//! # Adpull Config
//!
//! Layered configuration: TOML files, environment variables with the
//! `ADPULL_` prefix, and fail-fast validation.

pub mod app_config;
pub mod loader;

pub use app_config::{ApiConfig, AppConfig, DownloadConfig, RetryConfig};
pub use loader::ConfigLoader;
