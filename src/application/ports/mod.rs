//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod service;

// Re-export common types
pub use capture::{
    AudioInput, CaptureError, ChunkRecorder, EncodingSupport, InputStream, SignalTap,
    PERMISSION_DENIED_MESSAGE,
};
pub use config::ConfigStore;
pub use service::{
    HealthProbe, MultipartPayload, PayloadPart, ResponseBody, ServiceResponse, ServiceTransport,
    TransportCode, TransportError,
};
