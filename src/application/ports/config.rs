//! Configuration port interface

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for configuration storage
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load configuration. A missing file yields an empty config.
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Persist configuration, creating parent directories as needed.
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Location of the configuration file
    fn path(&self) -> PathBuf;

    fn exists(&self) -> bool;

    /// Write the defaults. Fails if the file already exists.
    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.path().to_string_lossy().to_string(),
            ));
        }
        self.save(&AppConfig::defaults()).await
    }

    /// Load, treating an unreadable file as empty
    async fn load_or_empty(&self) -> AppConfig {
        match self.load().await {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %self.path().display(), error = %e, "ignoring unreadable config");
                AppConfig::empty()
            }
        }
    }
}
