//! Configuration layer

mod app_config;

pub use app_config::{AppConfig, CredentialConfig, LogFormat, LoggingConfig};
