//! In-memory port implementations shared by the use case tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::audio::encoding::same_encoding;
use crate::domain::audio::CaptureConstraints;

use super::ports::{
    AudioInput, CaptureError, ChunkRecorder, EncodingSupport, InputStream, MultipartPayload,
    ServiceTransport, SignalTap, TransportError,
};

/// Side-effect counters for the microphone mocks
#[derive(Debug, Default)]
pub struct CaptureCalls {
    pub acquire: AtomicUsize,
    pub recorder_started: AtomicUsize,
    pub recorder_stopped: AtomicUsize,
    pub analyser_released: AtomicUsize,
    pub tracks_stopped: AtomicUsize,
    pub last_mime: Mutex<Option<String>>,
}

pub fn count(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy)]
enum Script {
    Grant,
    Deny,
    RecorderFails,
}

/// Scripted microphone: delivers `chunks` one per timeslice, then the
/// optional final chunk on stop
pub struct MockInput {
    pub calls: Arc<CaptureCalls>,
    supported: Vec<&'static str>,
    chunks: Vec<Vec<u8>>,
    final_chunk: Option<Vec<u8>>,
    script: Script,
}

impl MockInput {
    pub fn granting(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            calls: Arc::new(CaptureCalls::default()),
            supported: vec!["audio/webm;codecs=opus", "audio/webm"],
            chunks,
            final_chunk: None,
            script: Script::Grant,
        }
    }

    /// `total` bytes split over chunks of `chunk` bytes
    pub fn with_bytes(total: usize, chunk: usize) -> Self {
        let mut chunks = Vec::new();
        let mut left = total;
        while left > 0 {
            let n = left.min(chunk);
            chunks.push(vec![7u8; n]);
            left -= n;
        }
        Self::granting(chunks)
    }

    pub fn denying() -> Self {
        Self {
            script: Script::Deny,
            ..Self::granting(Vec::new())
        }
    }

    pub fn failing_recorder() -> Self {
        Self {
            script: Script::RecorderFails,
            ..Self::granting(Vec::new())
        }
    }

    pub fn supporting(mut self, supported: Vec<&'static str>) -> Self {
        self.supported = supported;
        self
    }

    pub fn with_final_chunk(mut self, chunk: Vec<u8>) -> Self {
        self.final_chunk = Some(chunk);
        self
    }
}

impl EncodingSupport for MockInput {
    fn is_type_supported(&self, mime: &str) -> bool {
        self.supported.iter().any(|s| same_encoding(s, mime))
    }
}

#[async_trait]
impl AudioInput for MockInput {
    async fn acquire(
        &self,
        _constraints: &CaptureConstraints,
    ) -> Result<Box<dyn InputStream>, CaptureError> {
        self.calls.acquire.fetch_add(1, Ordering::SeqCst);
        match self.script {
            Script::Deny => Err(CaptureError::PermissionDenied("NotAllowedError".into())),
            _ => Ok(Box::new(MockStream {
                calls: Arc::clone(&self.calls),
                chunks: self.chunks.clone(),
                final_chunk: self.final_chunk.clone(),
                recorder_fails: matches!(self.script, Script::RecorderFails),
            })),
        }
    }
}

struct MockStream {
    calls: Arc<CaptureCalls>,
    chunks: Vec<Vec<u8>>,
    final_chunk: Option<Vec<u8>>,
    recorder_fails: bool,
}

impl InputStream for MockStream {
    fn start_recorder(
        &mut self,
        mime: &str,
        timeslice: Duration,
    ) -> Result<Box<dyn ChunkRecorder>, CaptureError> {
        if self.recorder_fails {
            return Err(CaptureError::RecorderFailed("NotSupportedError".into()));
        }
        self.calls.recorder_started.fetch_add(1, Ordering::SeqCst);
        *self.calls.last_mime.lock().unwrap() = Some(mime.to_string());
        let mime = if mime.is_empty() { "audio/wav" } else { mime };
        Ok(Box::new(MockRecorder {
            calls: Arc::clone(&self.calls),
            mime: mime.to_string(),
            chunks: self.chunks.drain(..).collect(),
            final_chunk: self.final_chunk.take(),
            timeslice,
            stopped: false,
        }))
    }

    fn signal_tap(&self) -> Arc<dyn SignalTap> {
        Arc::new(ToneTap)
    }

    fn release_analyser(&mut self) {
        self.calls.analyser_released.fetch_add(1, Ordering::SeqCst);
    }

    fn stop_tracks(&mut self) {
        self.calls.tracks_stopped.fetch_add(1, Ordering::SeqCst);
    }
}

struct MockRecorder {
    calls: Arc<CaptureCalls>,
    mime: String,
    chunks: VecDeque<Vec<u8>>,
    final_chunk: Option<Vec<u8>>,
    timeslice: Duration,
    stopped: bool,
}

#[async_trait]
impl ChunkRecorder for MockRecorder {
    fn mime_type(&self) -> String {
        self.mime.clone()
    }

    async fn next_chunk(&mut self) -> Option<Vec<u8>> {
        if self.stopped {
            return self.final_chunk.take();
        }
        tokio::time::sleep(self.timeslice).await;
        match self.chunks.pop_front() {
            Some(chunk) => Some(chunk),
            None => std::future::pending().await,
        }
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.calls.recorder_stopped.fetch_add(1, Ordering::SeqCst);
        self.stopped = true;
        Ok(())
    }
}

struct ToneTap;

impl SignalTap for ToneTap {
    fn read_latest(&self, out: &mut [f32]) {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = (i as f32 * 0.3).sin() * 0.5;
        }
    }
}

/// A recorded service call
#[derive(Debug, Clone)]
pub struct SentRequest {
    pub path: String,
    pub payload: MultipartPayload,
    pub timeout: Duration,
}

/// Scripted service answering every call with the same result
pub struct MockTransport {
    pub calls: Arc<AtomicUsize>,
    pub sent: Arc<Mutex<Vec<SentRequest>>>,
    result: Result<Value, TransportError>,
    delay: Duration,
}

impl MockTransport {
    pub fn replying(body: Value) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
            result: Ok(body),
            delay: Duration::ZERO,
        }
    }

    /// Answer only after `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(error: TransportError) -> Self {
        Self {
            result: Err(error),
            ..Self::replying(Value::Null)
        }
    }

    pub fn last(&self) -> Option<SentRequest> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ServiceTransport for MockTransport {
    async fn post_multipart(
        &self,
        path: &str,
        payload: MultipartPayload,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(SentRequest {
            path: path.to_string(),
            payload,
            timeout,
        });
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}
