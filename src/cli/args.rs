//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

/// VoiceGuard - voice biometric enrollment and authentication client
#[derive(Parser, Debug)]
#[command(name = "voiceguard")]
#[command(version)]
#[command(about = "Record a voice sample and enroll or authenticate against a voice biometric service")]
#[command(long_about = None)]
pub struct Cli {
    /// Base URL of the authentication service
    #[arg(short = 's', long, value_name = "URL", env = "VOICEGUARD_SERVER_URL")]
    pub server: Option<String>,

    /// Subject identifier to enroll or authenticate
    #[arg(short = 'u', long, value_name = "ID", env = "VOICEGUARD_USER_ID")]
    pub user: Option<String>,

    /// Disable the live input level meter
    #[arg(long)]
    pub no_visualizer: bool,

    /// Verbose diagnostics on stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record 3 seconds and authenticate
    Auth,
    /// Record 5 seconds and enroll
    Enroll,
    /// Check whether the service is reachable
    Health,
    /// Line-driven session loop
    Interactive,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "server_url",
    "user_id",
    "mode",
    "health_timeout_secs",
    "request_timeout_secs",
    "visualizer",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
