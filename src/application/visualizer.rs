//! Live input level meter
//!
//! Samples the input stream once per frame tick, runs a 256-point FFT and
//! reduces the magnitude spectrum to one mean level in `0.0..=255.0`.
//! The loop runs until cancelled; it does not notice the stream ending.

use std::sync::Arc;
use std::time::Duration;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::ports::SignalTap;

/// Analysis window size
pub const FFT_SIZE: usize = 256;

/// One analysis per frame (about 60 per second)
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Upper bound of the published level
pub const MAX_LEVEL: f32 = 255.0;

const SMOOTHING: f32 = 0.8;
const MIN_DECIBELS: f32 = -100.0;
const MAX_DECIBELS: f32 = -30.0;

/// Windowed magnitude spectrum reduced to a mean byte-scaled level
pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    samples: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    pub fn new() -> Self {
        let fft = FftPlanner::new().plan_fft_forward(FFT_SIZE);
        Self {
            fft,
            window: blackman_window(FFT_SIZE),
            samples: vec![0.0; FFT_SIZE],
            buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            smoothed: vec![0.0; FFT_SIZE / 2],
        }
    }

    /// Number of frequency bins averaged into the level
    pub fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Analyse the latest window of a live stream
    pub fn level(&mut self, tap: &dyn SignalTap) -> f32 {
        tap.read_latest(&mut self.samples);
        self.compute()
    }

    /// Analyse an explicit window; shorter input is zero-padded at the front
    pub fn analyse(&mut self, samples: &[f32]) -> f32 {
        let take = samples.len().min(FFT_SIZE);
        let pad = FFT_SIZE - take;
        self.samples[..pad].fill(0.0);
        self.samples[pad..].copy_from_slice(&samples[samples.len() - take..]);
        self.compute()
    }

    fn compute(&mut self) -> f32 {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            *slot = Complex::new(self.samples[i] * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let scale = 1.0 / FFT_SIZE as f32;
        let range = MAX_DECIBELS - MIN_DECIBELS;
        let mut total = 0.0;
        for (bin, smoothed) in self.smoothed.iter_mut().enumerate() {
            let magnitude = self.buffer[bin].norm() * scale;
            *smoothed = SMOOTHING * *smoothed + (1.0 - SMOOTHING) * magnitude;
            if *smoothed > 0.0 {
                let db = 20.0 * smoothed.log10();
                total += ((db - MIN_DECIBELS) / range * MAX_LEVEL)
                    .clamp(0.0, MAX_LEVEL)
                    .floor();
            }
        }
        total / self.smoothed.len() as f32
    }
}

impl Default for SpectrumAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

fn blackman_window(size: usize) -> Vec<f32> {
    let n = size as f32;
    (0..size)
        .map(|i| {
            let x = 2.0 * std::f32::consts::PI * i as f32 / n;
            0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
        })
        .collect()
}

/// Frame-driven level loop bound to one input stream.
///
/// Must be cancelled when the stream stops; dropping it also cancels.
pub struct LevelVisualizer {
    task: Option<JoinHandle<()>>,
    level: Arc<watch::Sender<f32>>,
}

impl LevelVisualizer {
    /// Spawn the sampling loop, publishing into `level`
    pub fn start(tap: Arc<dyn SignalTap>, level: Arc<watch::Sender<f32>>) -> Self {
        let publisher = Arc::clone(&level);
        let task = tokio::spawn(async move {
            let mut analyser = SpectrumAnalyser::new();
            let mut ticker = tokio::time::interval(FRAME_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                publisher.send_replace(analyser.level(tap.as_ref()));
            }
        });

        Self {
            task: Some(task),
            level,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the loop and reset the published level. Idempotent.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::trace!("level visualizer cancelled");
        }
        self.level.send_replace(0.0);
    }
}

impl Drop for LevelVisualizer {
    fn drop(&mut self) {
        self.cancel();
    }
}
