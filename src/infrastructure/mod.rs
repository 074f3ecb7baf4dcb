//! Infrastructure layer - Services, stores and sinks

pub mod access;
pub mod api_key;
pub mod audit;
pub mod logging;
pub mod usage;
