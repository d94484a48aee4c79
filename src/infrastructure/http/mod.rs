//! HTTP infrastructure module

mod client;

pub use client::{HttpServiceClient, HEALTH_PATH};
