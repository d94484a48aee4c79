//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, Ctrl+C handling,
//! and the session runners.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod presenter;
pub mod signals;

// Re-export commonly used types
pub use app::{
    run_health, run_interactive, run_session, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR,
};
pub use args::{Cli, Commands, ConfigAction};
pub use presenter::Presenter;
