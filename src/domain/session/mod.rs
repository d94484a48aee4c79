//! Session domain module

mod metrics;
mod mode;
mod status;

pub use metrics::VerdictMetrics;
pub use mode::{SessionMode, AUTHENTICATE_DURATION_MS, ENROLL_DURATION_MS};
pub use status::{
    ErrorKind, InvalidStateTransition, Session, SessionStatus, SessionView, PROCESSING_MESSAGE,
};
