//! Ctrl+C handling for session commands

use colored::Colorize;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::application::StopHandle;
use crate::domain::session::{SessionStatus, SessionView};

use super::app::EXIT_ERROR;

/// What an interrupt does in the current session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptAction {
    /// Finalize the recording early; the session carries on
    StopRecording,
    /// Leave the process
    Exit,
}

impl InterruptAction {
    pub fn for_status(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Recording => Self::StopRecording,
            _ => Self::Exit,
        }
    }
}

/// Routes Ctrl+C to the session: stops a live recording, exits otherwise.
/// Uninstalled on drop.
pub struct InterruptHandler {
    task: JoinHandle<()>,
}

impl InterruptHandler {
    pub fn install(stop: StopHandle, status: watch::Receiver<SessionView>) -> Self {
        let task = tokio::spawn(async move {
            loop {
                if let Err(e) = signal::ctrl_c().await {
                    tracing::warn!(error = %e, "failed to listen for Ctrl+C");
                    return;
                }
                let current = status.borrow().status;
                match InterruptAction::for_status(current) {
                    InterruptAction::StopRecording => {
                        tracing::debug!("interrupt received, stopping recording");
                        eprintln!("{} Stopping recording early", "↓".cyan());
                        stop.stop();
                    }
                    InterruptAction::Exit => {
                        tracing::debug!(status = %current.as_str(), "interrupt received, exiting");
                        eprintln!("{} Interrupted", "↓".cyan());
                        std::process::exit(i32::from(EXIT_ERROR));
                    }
                }
            }
        });
        Self { task }
    }
}

impl Drop for InterruptHandler {
    fn drop(&mut self) {
        self.task.abort();
    }
}
