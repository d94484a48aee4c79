//! Audio domain module

mod artifact;
mod constraints;
pub mod encoding;

pub use artifact::{CaptureArtifact, MIN_ARTIFACT_BYTES};
pub use constraints::{CaptureConstraints, TARGET_SAMPLE_RATE};
pub use encoding::DEFAULT_ENCODING_CANDIDATES;
