//! Usage metering infrastructure

mod in_memory;
mod service;

pub use in_memory::InMemoryUsageRepository;
pub use service::{LogUsageParams, UsageMeter};
