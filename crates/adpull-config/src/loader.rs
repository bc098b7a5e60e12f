//! Configuration loader with layered sources.

use crate::AppConfig;
use adpull_core::AdpullError;
use config::{Config, Environment, File};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Configuration loader with runtime refresh support.
///
/// Configuration is loaded from multiple sources in order:
/// 1. `{config_dir}/default.toml` - Default values
/// 2. `{config_dir}/{environment}.toml` - Environment-specific overrides
/// 3. `{config_dir}/local.toml` - Local overrides (not committed)
/// 4. Environment variables with the `ADPULL_` prefix
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<AppConfig>>,
    config_dir: String,
}

impl ConfigLoader {
    /// Creates a loader reading from `config_dir`.
    pub fn new(config_dir: impl Into<String>) -> Result<Self, AdpullError> {
        let config_dir = config_dir.into();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, AdpullError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    pub async fn reload(&self) -> Result<(), AdpullError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &str) -> Result<AppConfig, AdpullError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var("ADPULL_ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        debug!(%environment, config_dir, "loading configuration");

        let mut builder = Config::builder();

        let default_path = format!("{config_dir}/default.toml");
        if Path::new(&default_path).exists() {
            builder = builder.add_source(File::with_name(&default_path).required(false));
        }

        let env_path = format!("{config_dir}/{environment}.toml");
        if Path::new(&env_path).exists() {
            builder = builder.add_source(File::with_name(&env_path).required(false));
        }

        let local_path = format!("{config_dir}/local.toml");
        if Path::new(&local_path).exists() {
            builder = builder.add_source(File::with_name(&local_path).required(false));
        }

        builder = builder.add_source(
            Environment::with_prefix("ADPULL")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| AdpullError::configuration(format!("failed to load config: {e}")))
    }
}
