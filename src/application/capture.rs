//! Fixed-duration microphone capture
//!
//! One capture pass walks `Idle → RequestingDevice → Recording → Stopping`
//! and ends in `Ready` with an artifact or `Aborted` with an error. Every
//! handle acquired on the way is owned by one [`ActiveCapture`] bundle and
//! released on every exit path.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::domain::audio::{CaptureArtifact, CaptureConstraints};
use crate::domain::session::SessionMode;

use super::negotiation::EncodingNegotiator;
use super::ports::{AudioInput, CaptureError, ChunkRecorder, InputStream};
use super::visualizer::LevelVisualizer;

/// Recorder buffering interval
pub const CHUNK_INTERVAL: Duration = Duration::from_millis(100);

/// Encoding assumed when neither the recorder nor negotiation names one
const FALLBACK_MIME: &str = "audio/webm";

/// Capture lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    RequestingDevice,
    Recording,
    Stopping,
    Ready,
    Aborted,
}

/// How a capture pass ended
#[derive(Debug)]
pub enum CaptureOutcome {
    Ready(CaptureArtifact),
    Aborted(CaptureError),
}

/// Requests an early end to the current recording.
///
/// Cloneable so signal handlers can hold one. Stopping outside a recording
/// has no effect: each capture clears the request when it starts.
#[derive(Debug, Clone)]
pub struct StopHandle {
    requested: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self {
            requested: Arc::new(watch::Sender::new(false)),
        }
    }

    /// Finalize the recording now instead of at its deadline
    pub fn stop(&self) {
        self.requested.send_replace(true);
    }

    fn reset(&self) {
        self.requested.send_replace(false);
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.requested.subscribe()
    }
}

impl Default for StopHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Resources held while recording. Released exactly once, on drop at the
/// latest.
struct ActiveCapture {
    stream: Box<dyn InputStream>,
    recorder: Box<dyn ChunkRecorder>,
    visualizer: Option<LevelVisualizer>,
    chunks: Vec<Vec<u8>>,
    mime_type: String,
    released: bool,
}

impl ActiveCapture {
    fn push(&mut self, chunk: Vec<u8>) {
        if !chunk.is_empty() {
            self.chunks.push(chunk);
        }
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(mut visualizer) = self.visualizer.take() {
            visualizer.cancel();
        }
        self.stream.release_analyser();
        self.stream.stop_tracks();
        tracing::debug!("capture resources released");
    }

    fn finalize(&mut self) -> Result<CaptureArtifact, CaptureError> {
        if self.chunks.is_empty() {
            return Err(CaptureError::NoAudioData);
        }
        let artifact =
            CaptureArtifact::from_chunks(std::mem::take(&mut self.chunks), self.mime_type.clone());
        if !artifact.is_valid() {
            return Err(CaptureError::TooShort {
                size: artifact.size_bytes(),
            });
        }
        Ok(artifact)
    }
}

impl Drop for ActiveCapture {
    fn drop(&mut self) {
        self.release();
    }
}

/// Records one fixed-length take from the microphone.
///
/// Assumes single-flight use; the session state machine rejects overlapping
/// attempts before they get here.
pub struct AudioCaptureSession<A: AudioInput> {
    input: A,
    negotiator: EncodingNegotiator,
    constraints: CaptureConstraints,
    level: Arc<watch::Sender<f32>>,
    stop: StopHandle,
    visualize: bool,
    state: CaptureState,
}

impl<A: AudioInput> AudioCaptureSession<A> {
    pub fn new(input: A) -> Self {
        Self {
            input,
            negotiator: EncodingNegotiator::default(),
            constraints: CaptureConstraints::speech(),
            level: Arc::new(watch::Sender::new(0.0)),
            stop: StopHandle::new(),
            visualize: true,
            state: CaptureState::Idle,
        }
    }

    pub fn with_negotiator(mut self, negotiator: EncodingNegotiator) -> Self {
        self.negotiator = negotiator;
        self
    }

    /// Enable or disable the live level meter
    pub fn with_visualizer(mut self, enabled: bool) -> Self {
        self.visualize = enabled;
        self
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Live input level while recording, 0 otherwise
    pub fn levels(&self) -> watch::Receiver<f32> {
        self.level.subscribe()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Record for the mode's fixed duration, or until stopped externally
    pub async fn capture(&mut self, mode: SessionMode) -> CaptureOutcome {
        self.stop.reset();
        self.state = CaptureState::Idle;

        let mut active = match self.start().await {
            Ok(active) => active,
            Err(e) => return self.abort(e),
        };

        // Armed once, at start; chunk arrival never ends the recording
        let deadline = tokio::time::sleep(mode.recording_duration());
        tokio::pin!(deadline);
        let mut stop_requested = self.stop.subscribe();

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    tracing::debug!(mode = %mode, "recording deadline reached");
                    break;
                }
                _ = stop_requested.wait_for(|requested| *requested) => {
                    tracing::debug!("recording stopped externally");
                    break;
                }
                chunk = active.recorder.next_chunk() => match chunk {
                    Some(chunk) => active.push(chunk),
                    None => {
                        tracing::warn!("recorder finished before the deadline");
                        break;
                    }
                },
            }
        }

        self.stop_recording(active).await
    }

    async fn start(&mut self) -> Result<ActiveCapture, CaptureError> {
        self.state = CaptureState::RequestingDevice;
        tracing::debug!(
            sample_rate = self.constraints.sample_rate,
            channels = self.constraints.channels,
            echo_cancellation = self.constraints.echo_cancellation,
            noise_suppression = self.constraints.noise_suppression,
            auto_gain_control = self.constraints.auto_gain_control,
            "requesting microphone"
        );
        let mut stream = self.input.acquire(&self.constraints).await?;

        let negotiated = self.negotiator.select(&self.input);
        let requested = negotiated.as_deref().unwrap_or("");
        let recorder = match stream.start_recorder(requested, CHUNK_INTERVAL) {
            Ok(recorder) => recorder,
            Err(e) => {
                stream.release_analyser();
                stream.stop_tracks();
                return Err(e);
            }
        };

        let mime_type = [recorder.mime_type(), requested.to_string()]
            .into_iter()
            .find(|m| !m.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_MIME.to_string());
        tracing::debug!(negotiated = ?negotiated, mime_type = %mime_type, "recorder started");

        let visualizer = self
            .visualize
            .then(|| LevelVisualizer::start(stream.signal_tap(), Arc::clone(&self.level)));

        self.state = CaptureState::Recording;
        Ok(ActiveCapture {
            stream,
            recorder,
            visualizer,
            chunks: Vec::new(),
            mime_type,
            released: false,
        })
    }

    async fn stop_recording(&mut self, mut active: ActiveCapture) -> CaptureOutcome {
        self.state = CaptureState::Stopping;

        let stopped = active.recorder.stop().await;
        if stopped.is_ok() {
            while let Some(chunk) = active.recorder.next_chunk().await {
                active.push(chunk);
            }
        }
        active.release();

        let result = stopped.and_then(|()| active.finalize());
        match result {
            Ok(artifact) => {
                tracing::debug!(
                    size = %artifact.human_readable_size(),
                    mime_type = artifact.mime_type(),
                    "capture ready"
                );
                self.state = CaptureState::Ready;
                CaptureOutcome::Ready(artifact)
            }
            Err(e) => self.abort(e),
        }
    }

    fn abort(&mut self, error: CaptureError) -> CaptureOutcome {
        tracing::warn!(error = %error, "capture aborted");
        self.state = CaptureState::Aborted;
        CaptureOutcome::Aborted(error)
    }
}
