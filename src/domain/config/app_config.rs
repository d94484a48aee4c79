//! Application configuration value object

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::session::SessionMode;

/// Default service location
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Default bound on the health probe
pub const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 5;

/// Default bound on enroll/authenticate calls
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_url: Option<String>,
    pub user_id: Option<String>,
    pub mode: Option<String>,
    pub health_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub visualizer: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            user_id: None,
            mode: Some(SessionMode::default().to_string()),
            health_timeout_secs: Some(DEFAULT_HEALTH_TIMEOUT_SECS),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
            visualizer: Some(true),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            server_url: other.server_url.or(self.server_url),
            user_id: other.user_id.or(self.user_id),
            mode: other.mode.or(self.mode),
            health_timeout_secs: other.health_timeout_secs.or(self.health_timeout_secs),
            request_timeout_secs: other.request_timeout_secs.or(self.request_timeout_secs),
            visualizer: other.visualizer.or(self.visualizer),
        }
    }

    /// Server URL without a trailing slash
    pub fn server_url_or_default(&self) -> String {
        self.server_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SERVER_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Configured subject identifier, empty when unset
    pub fn user_id_or_default(&self) -> &str {
        self.user_id.as_deref().unwrap_or("")
    }

    /// Get mode as parsed SessionMode, or default if not set/invalid
    pub fn mode_or_default(&self) -> SessionMode {
        self.mode
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn health_timeout_or_default(&self) -> Duration {
        Duration::from_secs(
            self.health_timeout_secs
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_HEALTH_TIMEOUT_SECS),
        )
    }

    pub fn request_timeout_or_default(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Get visualizer setting, or true if not set
    pub fn visualizer_or_default(&self) -> bool {
        self.visualizer.unwrap_or(true)
    }
}
