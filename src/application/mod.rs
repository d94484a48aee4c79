//! Application layer - Use cases and port interfaces
//!
//! Contains the session workflow and trait definitions
//! for external system interactions.

pub mod capture;
pub mod connectivity;
pub mod error_classifier;
pub mod negotiation;
pub mod ports;
pub mod session;
pub mod submission;
pub mod visualizer;

#[cfg(test)]
pub(crate) mod testing;

// Re-export use cases
pub use capture::{AudioCaptureSession, CaptureOutcome, CaptureState, StopHandle, CHUNK_INTERVAL};
pub use connectivity::ConnectivityMonitor;
pub use error_classifier::classify;
pub use negotiation::{select_encoding, EncodingNegotiator};
pub use session::{SessionError, SessionStateMachine};
pub use submission::{SubmissionClient, SubmissionError, Verdict};
pub use visualizer::{LevelVisualizer, SpectrumAnalyser};
