//! Microphone capture port interfaces
//!
//! Mirrors the three platform capabilities the capture session needs:
//! acquiring a live input stream, recording it in periodic chunks, and
//! tapping it for real-time analysis.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::CaptureConstraints;
use crate::domain::session::ErrorKind;

/// Message shown when the microphone cannot be opened
pub const PERMISSION_DENIED_MESSAGE: &str =
    "Microphone access denied. Please allow microphone access and try again.";

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("No audio input device available")]
    NoAudioDevice,

    #[error("Failed to start recorder: {0}")]
    RecorderFailed(String),

    #[error("Recording interrupted: {0}")]
    Interrupted(String),

    #[error("No audio data recorded")]
    NoAudioData,

    #[error("Audio recording too short. Please try again.")]
    TooShort { size: usize },
}

impl CaptureError {
    /// Failures that happen while opening the device or the recorder
    pub fn is_acquisition(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_) | Self::NoAudioDevice | Self::RecorderFailed(_)
        )
    }

    /// Session error classification
    pub fn kind(&self) -> ErrorKind {
        if self.is_acquisition() {
            ErrorKind::Permission
        } else {
            ErrorKind::Recording
        }
    }

    /// Message for the user; acquisition failures share one fixed message
    pub fn user_message(&self) -> String {
        if self.is_acquisition() {
            PERMISSION_DENIED_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

/// Platform capability lookup for recorder encodings
pub trait EncodingSupport {
    /// Whether the platform recorder can produce this encoding
    fn is_type_supported(&self, mime: &str) -> bool;
}

/// Port for acquiring live microphone streams
#[async_trait]
pub trait AudioInput: EncodingSupport + Send + Sync {
    /// Request an input stream honoring the constraints where possible.
    /// Denial or device failure is reported, never retried.
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn InputStream>, CaptureError>;
}

/// A live microphone stream owned by one capture pass
pub trait InputStream: Send {
    /// Start a recorder that delivers encoded chunks every `timeslice`.
    /// An empty `mime` selects the platform default encoding.
    fn start_recorder(
        &mut self,
        mime: &str,
        timeslice: Duration,
    ) -> Result<Box<dyn ChunkRecorder>, CaptureError>;

    /// Live signal source for frequency analysis
    fn signal_tap(&self) -> Arc<dyn SignalTap>;

    /// Release analysis resources attached to the stream
    fn release_analyser(&mut self);

    /// Stop every track; the device is released afterwards
    fn stop_tracks(&mut self);
}

/// Chunked recorder over an input stream
#[async_trait]
pub trait ChunkRecorder: Send {
    /// Encoding the recorder actually produces; empty when unknown
    fn mime_type(&self) -> String;

    /// Next chunk in delivery order, or None once the recorder has finished
    async fn next_chunk(&mut self) -> Option<Vec<u8>>;

    /// Stop recording. Buffered audio is delivered as a final chunk,
    /// after which `next_chunk` returns None.
    async fn stop(&mut self) -> Result<(), CaptureError>;
}

/// Read access to the most recent samples of a live stream
pub trait SignalTap: Send + Sync {
    /// Copy the latest samples into `out`, oldest first.
    /// Missing history is zero-filled at the front.
    fn read_latest(&self, out: &mut [f32]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquisition_errors_share_permission_message() {
        for err in [
            CaptureError::PermissionDenied("denied".into()),
            CaptureError::NoAudioDevice,
            CaptureError::RecorderFailed("bad mime".into()),
        ] {
            assert_eq!(err.kind(), ErrorKind::Permission);
            assert_eq!(err.user_message(), PERMISSION_DENIED_MESSAGE);
        }
    }

    #[test]
    fn recording_errors_keep_their_message() {
        assert_eq!(CaptureError::NoAudioData.kind(), ErrorKind::Recording);
        assert_eq!(CaptureError::NoAudioData.user_message(), "No audio data recorded");
        let short = CaptureError::TooShort { size: 12 };
        assert_eq!(short.kind(), ErrorKind::Recording);
        assert_eq!(
            short.user_message(),
            "Audio recording too short. Please try again."
        );
    }
}
