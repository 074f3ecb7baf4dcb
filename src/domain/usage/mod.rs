//! Usage metering domain types

mod record;
mod repository;

pub use record::{EndpointCount, UsageRange, UsageRecord, UsageRecordId, UsageStats};
pub use repository::UsageRepository;
