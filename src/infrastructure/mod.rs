//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the microphone, the authentication service and
//! the configuration file.

pub mod audio;
pub mod config;
pub mod http;

// Re-export adapters
pub use audio::CpalAudioInput;
pub use config::XdgConfigStore;
pub use http::HttpServiceClient;
