//! VoiceGuard - voice biometric capture and submission agent
//!
//! This crate records a short voice sample from the microphone and submits
//! it to a voice biometric service to enroll a user or authenticate them,
//! reporting one authoritative status for every attempt.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Session entity, status rules, value objects, and errors
//! - **Application**: Use cases (capture, submission, session orchestration) and port traits
//! - **Infrastructure**: Adapter implementations (cpal microphone, reqwest service client, XDG config)
//! - **CLI**: Command-line interface, argument parsing, and Ctrl+C handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
