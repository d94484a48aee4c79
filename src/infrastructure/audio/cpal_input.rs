//! Microphone input using cpal
//!
//! Opens the default input device, preferring a mono 16kHz configuration.
//! The cpal stream is not `Send`, so it lives on a dedicated thread that
//! drops it when the tracks are stopped. Captured audio is downmixed to
//! mono, resampled to 16kHz and delivered as WAV chunks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BuildStreamError, SampleFormat, SampleRate, StreamConfig};
use tokio::sync::oneshot;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use super::resample::StreamResampler;
use super::tap::LatestSamples;
use super::wav::{downmix_to_mono, encode_pcm16, streaming_header};
use crate::application::ports::{
    AudioInput, CaptureError, ChunkRecorder, EncodingSupport, InputStream, SignalTap,
};
use crate::domain::audio::encoding::same_encoding;
use crate::domain::audio::CaptureConstraints;

/// Encodings the recorder can produce; the first is the default
pub const SUPPORTED_ENCODINGS: &[&str] = &["audio/wav", "audio/x-wav"];

/// Samples of history kept for the level meter
const TAP_CAPACITY: usize = 4096;

/// Audio delivered by the device callback
#[derive(Debug, Default)]
struct Captured {
    recording: AtomicBool,
    samples: StdMutex<Vec<f32>>,
}

impl Captured {
    fn push(&self, mono: &[f32]) {
        if !self.recording.load(Ordering::SeqCst) {
            return;
        }
        if let Ok(mut samples) = self.samples.lock() {
            samples.extend_from_slice(mono);
        }
    }

    fn take(&self) -> Vec<f32> {
        self.samples
            .lock()
            .map(|mut samples| std::mem::take(&mut *samples))
            .unwrap_or_default()
    }
}

/// Default-device microphone adapter
#[derive(Debug, Default, Clone)]
pub struct CpalAudioInput;

impl CpalAudioInput {
    pub fn new() -> Self {
        Self
    }

    fn input_device() -> Result<cpal::Device, CaptureError> {
        cpal::default_host()
            .default_input_device()
            .ok_or(CaptureError::NoAudioDevice)
    }

    /// Pick a configuration, preferring fewer channels and one that
    /// includes the target rate
    fn input_config(
        device: &cpal::Device,
        constraints: &CaptureConstraints,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let target = constraints.sample_rate;
        let supported = device
            .supported_input_configs()
            .map_err(|e| CaptureError::PermissionDenied(format!("Failed to get configs: {}", e)))?;

        let includes_target = |c: &cpal::SupportedStreamConfigRange| {
            c.min_sample_rate().0 <= target && c.max_sample_rate().0 >= target
        };

        let mut best: Option<cpal::SupportedStreamConfigRange> = None;
        for config in supported {
            if !matches!(config.sample_format(), SampleFormat::I16 | SampleFormat::F32) {
                continue;
            }
            let is_better = match &best {
                None => true,
                Some(current) => {
                    (config.channels() < current.channels())
                        || (config.channels() == current.channels()
                            && includes_target(&config)
                            && !includes_target(current))
                }
            };
            if is_better {
                best = Some(config);
            }
        }

        let range = best.ok_or_else(|| {
            CaptureError::PermissionDenied("No suitable input configuration".into())
        })?;

        let sample_rate = if includes_target(&range) {
            SampleRate(target)
        } else {
            range.min_sample_rate()
        };

        Ok((
            StreamConfig {
                channels: range.channels(),
                sample_rate,
                buffer_size: cpal::BufferSize::Default,
            },
            range.sample_format(),
        ))
    }

    fn build_stream(
        device: &cpal::Device,
        config: &StreamConfig,
        format: SampleFormat,
        captured: Arc<Captured>,
        tap: Arc<LatestSamples>,
    ) -> Result<cpal::Stream, CaptureError> {
        let channels = config.channels as usize;
        let on_error = |err: cpal::StreamError| tracing::warn!(error = %err, "audio stream error");

        let stream = match format {
            SampleFormat::I16 => device.build_input_stream(
                config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let floats: Vec<f32> = data.iter().map(|&s| s as f32 / 32768.0).collect();
                    let mono = downmix_to_mono(&floats, channels);
                    tap.write(&mono);
                    captured.push(&mono);
                },
                on_error,
                None,
            ),
            SampleFormat::F32 => device.build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mono = downmix_to_mono(data, channels);
                    tap.write(&mono);
                    captured.push(&mono);
                },
                on_error,
                None,
            ),
            other => {
                return Err(CaptureError::PermissionDenied(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        };

        stream.map_err(|e| match e {
            BuildStreamError::DeviceNotAvailable => CaptureError::NoAudioDevice,
            other => CaptureError::PermissionDenied(other.to_string()),
        })
    }

    /// Open and play the stream, then hold it until `release` fires
    fn run_stream(
        constraints: CaptureConstraints,
        captured: Arc<Captured>,
        tap: Arc<LatestSamples>,
        ready: oneshot::Sender<Result<u32, CaptureError>>,
        release: mpsc::Receiver<()>,
    ) {
        let opened = (|| -> Result<(cpal::Stream, u32), CaptureError> {
            let device = Self::input_device()?;
            let (config, format) = Self::input_config(&device, &constraints)?;
            tracing::debug!(
                device = %device.name().unwrap_or_default(),
                sample_rate = config.sample_rate.0,
                channels = config.channels,
                format = ?format,
                "opening input stream"
            );
            let stream = Self::build_stream(&device, &config, format, captured, tap)?;
            stream
                .play()
                .map_err(|e| CaptureError::PermissionDenied(e.to_string()))?;
            Ok((stream, config.sample_rate.0))
        })();

        match opened {
            Ok((stream, sample_rate)) => {
                if ready.send(Ok(sample_rate)).is_err() {
                    return;
                }
                // Blocks until stop_tracks sends or the handle is dropped
                let _ = release.recv();
                drop(stream);
                tracing::debug!("input stream closed");
            }
            Err(e) => {
                let _ = ready.send(Err(e));
            }
        }
    }
}

impl EncodingSupport for CpalAudioInput {
    fn is_type_supported(&self, mime: &str) -> bool {
        SUPPORTED_ENCODINGS.iter().any(|s| same_encoding(s, mime))
    }
}

#[async_trait]
impl AudioInput for CpalAudioInput {
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn InputStream>, CaptureError> {
        // cpal exposes no processing controls; these stay advisory
        tracing::debug!(
            echo_cancellation = constraints.echo_cancellation,
            noise_suppression = constraints.noise_suppression,
            auto_gain_control = constraints.auto_gain_control,
            "input processing constraints are advisory"
        );

        let captured = Arc::new(Captured::default());
        let tap = Arc::new(LatestSamples::new(TAP_CAPACITY));
        let (ready_tx, ready_rx) = oneshot::channel();
        let (release_tx, release_rx) = mpsc::channel();

        let thread_captured = Arc::clone(&captured);
        let thread_tap = Arc::clone(&tap);
        let thread_constraints = *constraints;
        std::thread::Builder::new()
            .name("voiceguard-input".into())
            .spawn(move || {
                Self::run_stream(thread_constraints, thread_captured, thread_tap, ready_tx, release_rx)
            })
            .map_err(|e| CaptureError::PermissionDenied(format!("Failed to spawn audio thread: {}", e)))?;

        let device_rate = ready_rx
            .await
            .map_err(|_| CaptureError::PermissionDenied("Audio thread exited".into()))??;

        Ok(Box::new(CpalStream {
            captured,
            tap,
            release: Some(release_tx),
            device_rate,
            target_rate: constraints.sample_rate,
            channels: constraints.channels,
        }))
    }
}

/// Live stream held open by the input thread
struct CpalStream {
    captured: Arc<Captured>,
    tap: Arc<LatestSamples>,
    release: Option<mpsc::Sender<()>>,
    device_rate: u32,
    target_rate: u32,
    channels: u16,
}

impl InputStream for CpalStream {
    fn start_recorder(
        &mut self,
        mime: &str,
        timeslice: Duration,
    ) -> Result<Box<dyn ChunkRecorder>, CaptureError> {
        if self.release.is_none() {
            return Err(CaptureError::RecorderFailed("Input stream already stopped".into()));
        }
        if !mime.trim().is_empty() && !SUPPORTED_ENCODINGS.iter().any(|s| same_encoding(s, mime)) {
            return Err(CaptureError::RecorderFailed(format!("Unsupported encoding: {}", mime)));
        }

        let resampler = StreamResampler::new(self.device_rate, self.target_rate)?;
        self.captured.take();
        self.captured.recording.store(true, Ordering::SeqCst);

        let mut ticker = interval_at(Instant::now() + timeslice, timeslice);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Ok(Box::new(WavChunkRecorder {
            captured: Arc::clone(&self.captured),
            resampler,
            ticker,
            sample_rate: self.target_rate,
            channels: self.channels.max(1),
            header_sent: false,
            state: RecorderState::Recording,
        }))
    }

    fn signal_tap(&self) -> Arc<dyn SignalTap> {
        Arc::clone(&self.tap) as Arc<dyn SignalTap>
    }

    fn release_analyser(&mut self) {
        self.tap.detach();
    }

    fn stop_tracks(&mut self) {
        self.captured.recording.store(false, Ordering::SeqCst);
        if let Some(release) = self.release.take() {
            let _ = release.send(());
        }
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecorderState {
    Recording,
    Flushing,
    Finished,
}

/// Drains the device buffer once per timeslice into WAV chunks
struct WavChunkRecorder {
    captured: Arc<Captured>,
    resampler: StreamResampler,
    ticker: Interval,
    sample_rate: u32,
    channels: u16,
    header_sent: bool,
    state: RecorderState,
}

impl WavChunkRecorder {
    fn encode(&mut self, samples: &[f32]) -> Vec<u8> {
        if samples.is_empty() {
            return Vec::new();
        }
        let mut chunk = Vec::new();
        if !self.header_sent {
            chunk.extend_from_slice(&streaming_header(self.sample_rate, self.channels));
            self.header_sent = true;
        }
        encode_pcm16(samples, &mut chunk);
        chunk
    }

    fn drain(&mut self) -> Result<Vec<u8>, CaptureError> {
        let raw = self.captured.take();
        let resampled = self.resampler.process(&raw)?;
        Ok(self.encode(&resampled))
    }
}

#[async_trait]
impl ChunkRecorder for WavChunkRecorder {
    fn mime_type(&self) -> String {
        SUPPORTED_ENCODINGS[0].to_string()
    }

    async fn next_chunk(&mut self) -> Option<Vec<u8>> {
        match self.state {
            RecorderState::Finished => None,
            RecorderState::Flushing => {
                self.state = RecorderState::Finished;
                let mut samples = match self.resampler.process(&self.captured.take()) {
                    Ok(samples) => samples,
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping final audio");
                        return None;
                    }
                };
                match self.resampler.flush() {
                    Ok(tail) => samples.extend(tail),
                    Err(e) => tracing::warn!(error = %e, "dropping resampler tail"),
                }
                let chunk = self.encode(&samples);
                (!chunk.is_empty()).then_some(chunk)
            }
            RecorderState::Recording => {
                self.ticker.tick().await;
                match self.drain() {
                    Ok(chunk) => Some(chunk),
                    Err(e) => {
                        tracing::warn!(error = %e, "recorder failed");
                        self.state = RecorderState::Finished;
                        None
                    }
                }
            }
        }
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.captured.recording.store(false, Ordering::SeqCst);
        if self.state == RecorderState::Recording {
            self.state = RecorderState::Flushing;
        }
        Ok(())
    }
}
