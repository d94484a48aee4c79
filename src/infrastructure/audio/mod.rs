//! Microphone infrastructure module
//!
//! Provides cross-platform capture using cpal. Audio is resampled to
//! 16kHz mono and delivered as streaming WAV chunks.

mod cpal_input;
mod resample;
mod tap;
pub mod wav;

pub use cpal_input::{CpalAudioInput, SUPPORTED_ENCODINGS};
pub use resample::StreamResampler;
pub use tap::LatestSamples;
