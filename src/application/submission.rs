//! Submits a captured artifact to the voice authentication service

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::domain::audio::CaptureArtifact;
use crate::domain::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::domain::session::{ErrorKind, SessionMode, VerdictMetrics};

use super::error_classifier::{classify, is_present, render};
use super::ports::{MultipartPayload, ServiceTransport, TransportError};

pub const ENROLL_PATH: &str = "/api/v1/enroll";
pub const AUTHENTICATE_PATH: &str = "/api/v1/authenticate";

/// Enrollment attaches the same take this many times
pub const ENROLL_SAMPLES: usize = 3;

pub const ENROLL_SUCCESS_MESSAGE: &str = "Enrollment successful! You can now authenticate.";
pub const AUTHENTICATED_MESSAGE: &str = "Authentication successful";
pub const REJECTED_MESSAGE: &str = "Authentication failed";

/// Result reported by the service for an accepted request
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub accepted: bool,
    pub message: String,
    pub metrics: VerdictMetrics,
}

/// A failed submission, already classified for the user
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SubmissionError {
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: TransportError,
}

impl From<TransportError> for SubmissionError {
    fn from(source: TransportError) -> Self {
        let kind = if source.is_network() {
            ErrorKind::Network
        } else {
            ErrorKind::Server
        };
        Self {
            kind,
            message: classify(&source),
            source,
        }
    }
}

/// Builds the multipart request for a mode and interprets the reply
pub struct SubmissionClient<T: ServiceTransport> {
    transport: T,
    timeout: Duration,
}

impl<T: ServiceTransport> SubmissionClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Override the request time bound
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit one artifact for `subject_id`
    pub async fn submit(
        &self,
        mode: SessionMode,
        subject_id: &str,
        artifact: &CaptureArtifact,
    ) -> Result<Verdict, SubmissionError> {
        let (path, payload) = build_request(mode, subject_id, artifact);
        tracing::debug!(
            path,
            subject_id,
            size = artifact.size_bytes(),
            mime_type = artifact.mime_type(),
            "submitting capture"
        );

        let body = self
            .transport
            .post_multipart(path, payload, self.timeout)
            .await
            .map_err(|e| {
                tracing::warn!(
                    error = %e,
                    code = ?e.code,
                    status = ?e.response.as_ref().map(|r| r.status),
                    body = ?e.response.as_ref().map(|r| &r.body),
                    request_sent = e.request_sent,
                    "submission failed"
                );
                SubmissionError::from(e)
            })?;

        tracing::debug!(%body, "service replied");
        Ok(match mode {
            SessionMode::Enroll => enroll_verdict(body),
            SessionMode::Authenticate => authenticate_verdict(body),
        })
    }
}

/// Endpoint path and multipart body for a mode
pub fn build_request(
    mode: SessionMode,
    subject_id: &str,
    artifact: &CaptureArtifact,
) -> (&'static str, MultipartPayload) {
    let content_type = Some(artifact.mime_type())
        .filter(|m| !m.is_empty())
        .map(str::to_string);
    let ext = artifact.extension();
    let payload = MultipartPayload::new().text("user_id", subject_id);

    match mode {
        SessionMode::Enroll => {
            let payload = (1..=ENROLL_SAMPLES).fold(payload, |payload, n| {
                payload.file(
                    "audio_files",
                    format!("sample{}.{}", n, ext),
                    content_type.clone(),
                    artifact.bytes().to_vec(),
                )
            });
            (ENROLL_PATH, payload)
        }
        SessionMode::Authenticate => (
            AUTHENTICATE_PATH,
            payload.file(
                "audio_file",
                format!("recording.{}", ext),
                content_type,
                artifact.bytes().to_vec(),
            ),
        ),
    }
}

/// Reply fields are read one at a time; a malformed field is treated as
/// absent without discarding the others.
fn message(body: &Value) -> Option<String> {
    body.get("message").filter(|v| is_present(v)).map(render)
}

fn number(body: &Value, field: &str) -> Option<f64> {
    body.get(field).and_then(Value::as_f64)
}

fn enroll_verdict(body: Value) -> Verdict {
    Verdict {
        accepted: true,
        message: message(&body).unwrap_or_else(|| ENROLL_SUCCESS_MESSAGE.to_string()),
        metrics: VerdictMetrics::enrolled(),
    }
}

fn authenticate_verdict(body: Value) -> Verdict {
    let accepted = body.get("is_authenticated").is_some_and(is_present);
    let default_message = if accepted {
        AUTHENTICATED_MESSAGE
    } else {
        REJECTED_MESSAGE
    };
    Verdict {
        accepted,
        message: message(&body).unwrap_or_else(|| default_message.to_string()),
        metrics: VerdictMetrics {
            confidence: number(&body, "confidence").unwrap_or(0.0),
            is_live: body.get("is_live").and_then(Value::as_bool),
            speaker_score: number(&body, "speaker_score"),
            liveness_score: number(&body, "liveness_score"),
            processing_time_ms: number(&body, "processing_time_ms"),
        },
    }
}
