//! Session orchestration
//!
//! Checks the guards, records one take, submits it and publishes every
//! status change. Guard failures touch neither the microphone nor the
//! network. No error escapes [`SessionStateMachine::run`]; every failure
//! ends as a `Failure` view with a user-facing message.

use thiserror::Error;
use tokio::sync::watch;

use crate::domain::connectivity::ConnectivityState;
use crate::domain::session::{
    ErrorKind, InvalidStateTransition, Session, SessionMode, SessionView,
};

use super::capture::{AudioCaptureSession, CaptureOutcome, StopHandle};
use super::ports::{AudioInput, CaptureError, ServiceTransport};
use super::submission::{SubmissionClient, SubmissionError};

pub const MISSING_SUBJECT_MESSAGE: &str = "Please enter User ID first";
pub const OFFLINE_MESSAGE: &str = "Backend server not connected. Please check connection.";

/// Everything that can end a session in failure
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("{}", MISSING_SUBJECT_MESSAGE)]
    MissingSubject,

    #[error("{}", OFFLINE_MESSAGE)]
    Offline,

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingSubject => ErrorKind::UserInput,
            Self::Offline => ErrorKind::Connectivity,
            Self::Capture(e) => e.kind(),
            Self::Submission(e) => e.kind,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Capture(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Drives one session at a time through
/// `Idle → Recording → Processing → Success | Failure`.
///
/// `run` takes `&mut self`, so a second attempt cannot start while one is
/// in flight.
pub struct SessionStateMachine<A: AudioInput, T: ServiceTransport> {
    capture: AudioCaptureSession<A>,
    submission: SubmissionClient<T>,
    connectivity: ConnectivityState,
    session: Session,
    status: watch::Sender<SessionView>,
}

impl<A: AudioInput, T: ServiceTransport> SessionStateMachine<A, T> {
    pub fn new(
        capture: AudioCaptureSession<A>,
        submission: SubmissionClient<T>,
        connectivity: ConnectivityState,
    ) -> Self {
        let session = Session::new(SessionMode::default(), "");
        let (status, _) = watch::channel(session.view());
        Self {
            capture,
            submission,
            connectivity,
            session,
            status,
        }
    }

    /// Status updates for the presentation layer
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.status.subscribe()
    }

    /// Live input level while recording
    pub fn levels(&self) -> watch::Receiver<f32> {
        self.capture.levels()
    }

    /// Ends the current recording early
    pub fn stop_handle(&self) -> StopHandle {
        self.capture.stop_handle()
    }

    pub fn connectivity(&self) -> &ConnectivityState {
        &self.connectivity
    }

    /// Latest status
    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    pub fn submission(&self) -> &SubmissionClient<T> {
        &self.submission
    }

    /// Run one attempt to completion. A new attempt always starts from Idle.
    pub async fn run(&mut self, mode: SessionMode, subject_id: &str) -> SessionView {
        self.session = Session::new(mode, subject_id);
        self.publish();

        if let Err(e) = self.check_guards() {
            self.fail(e);
            return self.view();
        }

        self.apply(Session::begin_recording);
        let artifact = match self.capture.capture(mode).await {
            CaptureOutcome::Ready(artifact) => artifact,
            CaptureOutcome::Aborted(e) => {
                self.fail(e.into());
                return self.view();
            }
        };

        self.apply(Session::begin_processing);
        let subject = self.session.subject_id().to_string();
        match self.submission.submit(mode, &subject, &artifact).await {
            Ok(verdict) if verdict.accepted => {
                tracing::info!(mode = %mode, subject = %subject, "session succeeded");
                self.apply(|s| s.succeed(verdict.message, verdict.metrics));
            }
            Ok(verdict) => {
                tracing::info!(
                    mode = %mode,
                    subject = %subject,
                    confidence = verdict.metrics.confidence,
                    "session rejected"
                );
                self.apply(|s| s.reject(verdict.message, verdict.metrics));
            }
            Err(e) => self.fail(e.into()),
        }

        self.view()
    }

    fn check_guards(&self) -> Result<(), SessionError> {
        if !self.session.has_subject() {
            return Err(SessionError::MissingSubject);
        }
        if !self.connectivity.is_online() {
            return Err(SessionError::Offline);
        }
        Ok(())
    }

    fn fail(&mut self, error: SessionError) {
        let kind = error.kind();
        let message = error.user_message();
        if kind.is_guard() {
            tracing::info!(kind = %kind, reason = %error, "session guard rejected attempt");
        } else {
            tracing::debug!(kind = %kind, error = ?error, "session failed");
        }
        self.apply(|s| s.fail(kind, message, None));
    }

    fn apply<F>(&mut self, transition: F)
    where
        F: FnOnce(&mut Session) -> Result<(), InvalidStateTransition>,
    {
        if let Err(e) = transition(&mut self.session) {
            tracing::error!(error = %e, "session transition rejected");
        }
        self.publish();
    }

    fn publish(&self) {
        self.status.send_replace(self.session.view());
    }
}
