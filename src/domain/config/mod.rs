//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, DEFAULT_HEALTH_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER_URL,
};
