//! App runners for session, health and interactive commands

use std::process::ExitCode;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::application::ports::{ConfigStore, TransportError};
use crate::application::{
    AudioCaptureSession, ConnectivityMonitor, SessionStateMachine, SubmissionClient,
};
use crate::domain::config::AppConfig;
use crate::domain::connectivity::ConnectivityState;
use crate::domain::session::{SessionMode, SessionStatus, SessionView};
use crate::infrastructure::{CpalAudioInput, HttpServiceClient, XdgConfigStore};

use super::presenter::Presenter;
use super::signals::InterruptHandler;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Session wired to the microphone and the HTTP service
pub type CliSession = SessionStateMachine<CpalAudioInput, HttpServiceClient>;

/// Load and merge configuration. `cli_config` already folds in the
/// environment (clap reads `VOICEGUARD_*` for unset flags), so the order is
/// defaults < file < env < cli.
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load_or_empty().await;

    AppConfig::defaults().merge(file_config).merge(cli_config)
}

/// Reject server URLs the HTTP client cannot use
pub fn validate_server_url(url: &str) -> Result<(), String> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(format!(
            "Invalid server URL '{}': must start with http:// or https://",
            url
        ))
    }
}

/// Build the session and its connectivity monitor from config
pub fn build_session(
    config: &AppConfig,
) -> Result<(CliSession, ConnectivityMonitor<HttpServiceClient>), TransportError> {
    let client = HttpServiceClient::new(config.server_url_or_default())?;
    let connectivity = ConnectivityState::new(false);

    let monitor = ConnectivityMonitor::new(client.clone(), connectivity.clone())
        .with_timeout(config.health_timeout_or_default());
    let capture = AudioCaptureSession::new(CpalAudioInput::new())
        .with_visualizer(config.visualizer_or_default());
    let submission = SubmissionClient::new(client).with_timeout(config.request_timeout_or_default());

    Ok((
        SessionStateMachine::new(capture, submission, connectivity),
        monitor,
    ))
}

/// Probe the service and report the result
async fn probe(
    monitor: &ConnectivityMonitor<HttpServiceClient>,
    server_url: &str,
    presenter: &Presenter,
) -> bool {
    let online = monitor.probe().await;
    if !online {
        presenter.offline(server_url);
    }
    online
}

/// Run one session, rendering status and the level meter while it runs
async fn drive(
    machine: &mut CliSession,
    mode: SessionMode,
    subject_id: &str,
    presenter: &mut Presenter,
) -> SessionView {
    let mut status = machine.subscribe();
    let mut levels = machine.levels();
    let mut recording_message = String::new();

    let run = machine.run(mode, subject_id);
    tokio::pin!(run);

    let view = loop {
        tokio::select! {
            view = &mut run => break view,
            Ok(()) = status.changed() => {
                let view = status.borrow_and_update().clone();
                if view.status.is_terminal() {
                    continue;
                }
                if view.status == SessionStatus::Recording {
                    recording_message = view.message.clone();
                }
                presenter.status(&view);
            }
            Ok(()) = levels.changed() => {
                let level = *levels.borrow_and_update();
                if !recording_message.is_empty() && status.borrow().status == SessionStatus::Recording {
                    presenter.level(&recording_message, level);
                }
            }
        }
    };

    presenter.status(&view);
    if let Some(metrics) = view.metrics.as_ref() {
        presenter.metrics(metrics);
    }
    view
}

fn exit_status(view: &SessionView) -> u8 {
    if view.status == SessionStatus::Success {
        EXIT_SUCCESS
    } else {
        EXIT_ERROR
    }
}

/// Run a single enroll or authenticate session
pub async fn run_session(config: AppConfig, mode: SessionMode) -> ExitCode {
    let mut presenter = Presenter::new();
    let server_url = config.server_url_or_default();
    if let Err(e) = validate_server_url(&server_url) {
        presenter.error(&e);
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let (mut machine, monitor) = match build_session(&config) {
        Ok(parts) => parts,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    probe(&monitor, &server_url, &presenter).await;

    let _interrupt = InterruptHandler::install(machine.stop_handle(), machine.subscribe());
    let subject_id = config.user_id_or_default().to_string();
    let view = drive(&mut machine, mode, &subject_id, &mut presenter).await;

    tracing::debug!(
        status = view.status.as_str(),
        kind = ?view.error_kind,
        "session finished"
    );
    ExitCode::from(exit_status(&view))
}

/// Probe the service once
pub async fn run_health(config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();
    let server_url = config.server_url_or_default();
    if let Err(e) = validate_server_url(&server_url) {
        presenter.error(&e);
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let client = match HttpServiceClient::new(&server_url) {
        Ok(client) => client,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let monitor = ConnectivityMonitor::new(client, ConnectivityState::new(false))
        .with_timeout(config.health_timeout_or_default());

    let online = monitor.probe().await;
    presenter.connectivity(&server_url, online);
    if online {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

/// One parsed line of the interactive loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractiveCommand {
    Run(Option<SessionMode>),
    User(String),
    Mode(SessionMode),
    Retry,
    Status,
    Help,
    Quit,
    Empty,
    Invalid(String),
}

impl InteractiveCommand {
    pub fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Self::Empty;
        };
        let rest = words.collect::<Vec<_>>().join(" ");

        match command.to_lowercase().as_str() {
            "auth" | "authenticate" => Self::Run(Some(SessionMode::Authenticate)),
            "enroll" => Self::Run(Some(SessionMode::Enroll)),
            "go" | "start" => Self::Run(None),
            "user" if rest.is_empty() => Self::Invalid("Usage: user <id>".to_string()),
            "user" => Self::User(rest),
            "mode" => match rest.parse::<SessionMode>() {
                Ok(mode) => Self::Mode(mode),
                Err(e) => Self::Invalid(e.to_string()),
            },
            "retry" => Self::Retry,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => Self::Invalid(format!("Unknown command '{}'. Type 'help'.", other)),
        }
    }
}

const INTERACTIVE_HELP: &str = "\
Commands:
  auth            record 3 seconds and authenticate
  enroll          record 5 seconds and enroll
  start           run the current mode
  user <id>       set the user ID
  mode <m>        switch mode (auth | enroll)
  retry           check the server connection again
  status          show user, mode and connection
  quit            leave";

/// Line-driven loop over one long-lived session machine
pub async fn run_interactive(config: AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();
    let server_url = config.server_url_or_default();
    if let Err(e) = validate_server_url(&server_url) {
        presenter.error(&e);
        return ExitCode::from(EXIT_USAGE_ERROR);
    }

    let (mut machine, monitor) = match build_session(&config) {
        Ok(parts) => parts,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut subject_id = config.user_id_or_default().to_string();
    let mut mode = config.mode_or_default();

    probe(&monitor, &server_url, &presenter).await;
    presenter.info(mode.idle_message());
    presenter.output(INTERACTIVE_HELP);

    let _interrupt = InterruptHandler::install(machine.stop_handle(), machine.subscribe());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                presenter.error(&format!("Failed to read input: {}", e));
                return ExitCode::from(EXIT_ERROR);
            }
        };

        match InteractiveCommand::parse(&line) {
            InteractiveCommand::Run(requested) => {
                let run_mode = requested.unwrap_or(mode);
                drive(&mut machine, run_mode, &subject_id, &mut presenter).await;
            }
            InteractiveCommand::User(id) => {
                presenter.success(&format!("User ID set to {}", id));
                subject_id = id;
            }
            InteractiveCommand::Mode(new_mode) => {
                mode = new_mode;
                presenter.info(mode.idle_message());
            }
            InteractiveCommand::Retry => {
                let online = monitor.probe().await;
                presenter.connectivity(&server_url, online);
            }
            InteractiveCommand::Status => {
                let user = if subject_id.is_empty() {
                    "(not set)"
                } else {
                    subject_id.as_str()
                };
                presenter.key_value("user", user);
                presenter.key_value("mode", mode.as_str());
                presenter.key_value("last", machine.view().status.as_str());
                presenter.connectivity(&server_url, machine.connectivity().is_online());
            }
            InteractiveCommand::Help => presenter.output(INTERACTIVE_HELP),
            InteractiveCommand::Quit => break,
            InteractiveCommand::Empty => {}
            InteractiveCommand::Invalid(message) => presenter.warn(&message),
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_session_commands() {
        assert_eq!(
            InteractiveCommand::parse("auth"),
            InteractiveCommand::Run(Some(SessionMode::Authenticate))
        );
        assert_eq!(
            InteractiveCommand::parse("  ENROLL "),
            InteractiveCommand::Run(Some(SessionMode::Enroll))
        );
        assert_eq!(InteractiveCommand::parse("start"), InteractiveCommand::Run(None));
    }

    #[test]
    fn parse_user_keeps_spaces() {
        assert_eq!(
            InteractiveCommand::parse("user jane doe"),
            InteractiveCommand::User("jane doe".to_string())
        );
        assert!(matches!(
            InteractiveCommand::parse("user"),
            InteractiveCommand::Invalid(_)
        ));
    }

    #[test]
    fn parse_mode() {
        assert_eq!(
            InteractiveCommand::parse("mode enroll"),
            InteractiveCommand::Mode(SessionMode::Enroll)
        );
        assert!(matches!(
            InteractiveCommand::parse("mode verify"),
            InteractiveCommand::Invalid(_)
        ));
    }

    #[test]
    fn parse_misc() {
        assert_eq!(InteractiveCommand::parse(""), InteractiveCommand::Empty);
        assert_eq!(InteractiveCommand::parse("retry"), InteractiveCommand::Retry);
        assert_eq!(InteractiveCommand::parse("status"), InteractiveCommand::Status);
        assert_eq!(InteractiveCommand::parse("q"), InteractiveCommand::Quit);
        assert!(matches!(
            InteractiveCommand::parse("dance"),
            InteractiveCommand::Invalid(_)
        ));
    }

    #[test]
    fn server_url_validation() {
        assert!(validate_server_url("http://localhost:8000").is_ok());
        assert!(validate_server_url("https://auth.example.com").is_ok());
        assert!(validate_server_url("localhost:8000").is_err());
    }

    #[test]
    fn build_session_starts_offline() {
        let config = AppConfig::defaults();
        let (machine, monitor) = build_session(&config).unwrap();
        assert!(!machine.connectivity().is_online());
        assert!(!monitor.state().is_online());
        assert_eq!(machine.view().status, SessionStatus::Idle);
    }

    #[test]
    fn exit_code_follows_status() {
        let mut view = SessionView::idle(SessionMode::Authenticate);
        view.status = SessionStatus::Success;
        assert_eq!(exit_status(&view), EXIT_SUCCESS);
        view.status = SessionStatus::Failure;
        assert_eq!(exit_status(&view), EXIT_ERROR);
    }
}
