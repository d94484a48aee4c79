//! Incremental resampling to the capture rate

use rubato::{FftFixedIn, Resampler};

use crate::application::ports::CaptureError;

const CHUNK_FRAMES: usize = 1024;

/// Mono resampler fed in arbitrary slices.
///
/// Input that does not fill a whole resampler block waits for the next
/// call; [`StreamResampler::flush`] pads and emits the remainder.
pub struct StreamResampler {
    inner: Option<FftFixedIn<f32>>,
    pending: Vec<f32>,
    ratio: f64,
    consumed: usize,
    produced: usize,
}

impl StreamResampler {
    pub fn new(source_rate: u32, target_rate: u32) -> Result<Self, CaptureError> {
        let inner = if source_rate == target_rate {
            None
        } else {
            Some(
                FftFixedIn::<f32>::new(
                    source_rate as usize,
                    target_rate as usize,
                    CHUNK_FRAMES,
                    2,
                    1,
                )
                .map_err(|e| CaptureError::RecorderFailed(format!("Resampler init failed: {}", e)))?,
            )
        };
        Ok(Self {
            inner,
            pending: Vec::new(),
            ratio: target_rate as f64 / source_rate as f64,
            consumed: 0,
            produced: 0,
        })
    }

    pub fn is_passthrough(&self) -> bool {
        self.inner.is_none()
    }

    /// Resample as much of the buffered input as fills whole blocks
    pub fn process(&mut self, samples: &[f32]) -> Result<Vec<f32>, CaptureError> {
        self.consumed += samples.len();
        let Some(resampler) = self.inner.as_mut() else {
            self.produced += samples.len();
            return Ok(samples.to_vec());
        };

        self.pending.extend_from_slice(samples);
        let mut output = Vec::new();
        let mut offset = 0;
        loop {
            let needed = resampler.input_frames_next();
            if self.pending.len() - offset < needed {
                break;
            }
            let block = [&self.pending[offset..offset + needed]];
            let resampled = resampler
                .process(&block, None)
                .map_err(|e| CaptureError::Interrupted(format!("Resampling failed: {}", e)))?;
            output.extend_from_slice(&resampled[0]);
            offset += needed;
        }
        self.pending.drain(..offset);
        self.produced += output.len();
        Ok(output)
    }

    /// Emit whatever is still buffered, zero-padded, trimmed to the
    /// expected total length
    pub fn flush(&mut self) -> Result<Vec<f32>, CaptureError> {
        let Some(resampler) = self.inner.as_mut() else {
            return Ok(Vec::new());
        };
        let expected = (self.consumed as f64 * self.ratio).ceil() as usize;
        if self.pending.is_empty() || self.produced >= expected {
            self.pending.clear();
            return Ok(Vec::new());
        }

        let mut block = std::mem::take(&mut self.pending);
        block.resize(resampler.input_frames_next(), 0.0);
        let resampled = resampler
            .process(&[block], None)
            .map_err(|e| CaptureError::Interrupted(format!("Resampling failed: {}", e)))?;

        let mut output = resampled.into_iter().next().unwrap_or_default();
        output.truncate(expected - self.produced);
        self.produced += output.len();
        Ok(output)
    }
}
