//! Session entity and its status state machine

use std::fmt;
use thiserror::Error;

use super::metrics::VerdictMetrics;
use super::mode::SessionMode;

/// Message shown while the capture is being submitted
pub const PROCESSING_MESSAGE: &str = "Processing audio... Please wait.";

/// Session status, as observed by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Recording,
    Processing,
    Success,
    Failure,
}

impl SessionStatus {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Processing => "processing",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    /// Recording and Processing hold the microphone or the network call
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Recording | Self::Processing)
    }

    /// Success and Failure end the session
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of a failed session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing subject identifier
    UserInput,
    /// Service was offline when the session was requested
    Connectivity,
    /// Microphone access denied or device unavailable
    Permission,
    /// Empty or undersized capture
    Recording,
    /// No route to the service, or timeout
    Network,
    /// The service answered with a failure
    Server,
}

impl ErrorKind {
    /// Guard failures happen before any device access or network call
    pub const fn is_guard(&self) -> bool {
        matches!(self, Self::UserInput | Self::Connectivity)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UserInput => "user-input",
            Self::Connectivity => "connectivity",
            Self::Permission => "permission",
            Self::Recording => "recording",
            Self::Network => "network",
            Self::Server => "server",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionStatus,
    pub action: String,
}

/// Point-in-time snapshot of a session for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub mode: SessionMode,
    pub status: SessionStatus,
    pub message: String,
    pub metrics: Option<VerdictMetrics>,
    pub error_kind: Option<ErrorKind>,
}

impl SessionView {
    /// Idle view for a mode, before any attempt
    pub fn idle(mode: SessionMode) -> Self {
        Self {
            mode,
            status: SessionStatus::Idle,
            message: mode.idle_message().to_string(),
            metrics: None,
            error_kind: None,
        }
    }
}

/// One authenticate-or-enroll attempt.
///
/// State machine:
///   IDLE -> RECORDING (begin_recording)
///   IDLE -> FAILURE (fail, guard violations)
///   RECORDING -> PROCESSING (begin_processing)
///   RECORDING -> FAILURE (fail, capture aborted)
///   PROCESSING -> SUCCESS (succeed)
///   PROCESSING -> FAILURE (fail)
///
/// Success and Failure are terminal; a new attempt is a new Session.
#[derive(Debug, Clone)]
pub struct Session {
    mode: SessionMode,
    subject_id: String,
    status: SessionStatus,
    message: String,
    metrics: Option<VerdictMetrics>,
    error_kind: Option<ErrorKind>,
}

impl Session {
    /// Create a new idle session
    pub fn new(mode: SessionMode, subject_id: impl Into<String>) -> Self {
        Self {
            mode,
            subject_id: subject_id.into(),
            status: SessionStatus::Idle,
            message: mode.idle_message().to_string(),
            metrics: None,
            error_kind: None,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Subject identifier, trimmed
    pub fn subject_id(&self) -> &str {
        self.subject_id.trim()
    }

    /// Whether the subject identifier has any non-whitespace content
    pub fn has_subject(&self) -> bool {
        !self.subject_id().is_empty()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn metrics(&self) -> Option<&VerdictMetrics> {
        self.metrics.as_ref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    /// Snapshot for the presentation layer
    pub fn view(&self) -> SessionView {
        SessionView {
            mode: self.mode,
            status: self.status,
            message: self.message.clone(),
            metrics: self.metrics.clone(),
            error_kind: self.error_kind,
        }
    }

    /// Transition from IDLE to RECORDING
    pub fn begin_recording(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect(SessionStatus::Idle, "start recording")?;
        self.status = SessionStatus::Recording;
        self.message = self.mode.recording_message().to_string();
        Ok(())
    }

    /// Transition from RECORDING to PROCESSING
    pub fn begin_processing(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect(SessionStatus::Recording, "start processing")?;
        self.status = SessionStatus::Processing;
        self.message = PROCESSING_MESSAGE.to_string();
        Ok(())
    }

    /// Transition from PROCESSING to SUCCESS
    pub fn succeed(
        &mut self,
        message: impl Into<String>,
        metrics: VerdictMetrics,
    ) -> Result<(), InvalidStateTransition> {
        self.expect(SessionStatus::Processing, "complete successfully")?;
        self.status = SessionStatus::Success;
        self.message = message.into();
        self.metrics = Some(metrics);
        Ok(())
    }

    /// Transition from PROCESSING to FAILURE on a negative verdict.
    /// Not an error: the service answered and said no.
    pub fn reject(
        &mut self,
        message: impl Into<String>,
        metrics: VerdictMetrics,
    ) -> Result<(), InvalidStateTransition> {
        self.expect(SessionStatus::Processing, "reject")?;
        self.status = SessionStatus::Failure;
        self.message = message.into();
        self.metrics = Some(metrics);
        Ok(())
    }

    /// Transition from any non-terminal state to FAILURE
    pub fn fail(
        &mut self,
        kind: ErrorKind,
        message: impl Into<String>,
        metrics: Option<VerdictMetrics>,
    ) -> Result<(), InvalidStateTransition> {
        if self.status.is_terminal() {
            return Err(InvalidStateTransition {
                current_state: self.status,
                action: "fail".to_string(),
            });
        }
        self.status = SessionStatus::Failure;
        self.message = message.into();
        self.metrics = metrics;
        self.error_kind = Some(kind);
        Ok(())
    }

    fn expect(&self, wanted: SessionStatus, action: &str) -> Result<(), InvalidStateTransition> {
        if self.status != wanted {
            return Err(InvalidStateTransition {
                current_state: self.status,
                action: action.to_string(),
            });
        }
        Ok(())
    }
}
