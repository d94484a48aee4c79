//! TOML config file under the user's XDG config directory

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Directory name under the user config dir
pub const APP_DIR: &str = "voiceguard";

const FILE_NAME: &str = "config.toml";

/// `$XDG_CONFIG_HOME/voiceguard/config.toml`, falling back to
/// `$HOME/.config` and finally the working directory
fn default_path() -> PathBuf {
    let base = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_default();
    base.join(APP_DIR).join(FILE_NAME)
}

fn read_failed(path: &Path, e: io::Error) -> ConfigError {
    ConfigError::ReadError(format!("{}: {}", path.display(), e))
}

fn write_failed(path: &Path, e: io::Error) -> ConfigError {
    ConfigError::WriteError(format!("{}: {}", path.display(), e))
}

/// Config file store; writes go through a sibling temp file and a rename
#[derive(Debug, Clone)]
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    pub fn new() -> Self {
        Self::with_path(default_path())
    }

    /// Store backed by an explicit file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn decode(text: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn encode(config: &AppConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    fn staging_path(&self) -> PathBuf {
        self.path.with_extension("toml.tmp")
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        match fs::read_to_string(&self.path).await {
            Ok(text) => {
                tracing::debug!(path = %self.path.display(), "config loaded");
                Self::decode(&text)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(AppConfig::empty()),
            Err(e) => Err(read_failed(&self.path, e)),
        }
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let text = Self::encode(config)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| write_failed(dir, e))?;
        }

        let staging = self.staging_path();
        fs::write(&staging, text)
            .await
            .map_err(|e| write_failed(&staging, e))?;
        if let Err(e) = fs::rename(&staging, &self.path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(write_failed(&self.path, e));
        }

        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }
}
