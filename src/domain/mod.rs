//! Domain layer - Core business logic
//!
//! Contains value objects, the session entity, and domain errors.
//! This layer has no dependencies on external systems.

pub mod audio;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod session;

// Re-export common types
pub use audio::{CaptureArtifact, CaptureConstraints};
pub use config::AppConfig;
pub use connectivity::ConnectivityState;
pub use error::*;
pub use session::{ErrorKind, Session, SessionMode, SessionStatus, SessionView, VerdictMetrics};
