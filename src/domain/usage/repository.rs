//! Usage repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::record::{UsageRange, UsageRecord, UsageStats};
use crate::domain::api_key::ApiKeyId;
use crate::domain::DomainError;

/// Storage seam for append-only usage records.
#[async_trait]
pub trait UsageRepository: Send + Sync + Debug {
    /// Append one record
    async fn insert(&self, record: UsageRecord) -> Result<(), DomainError>;

    /// Aggregate statistics for one key over a range
    async fn aggregate(
        &self,
        api_key_id: &ApiKeyId,
        range: &UsageRange,
    ) -> Result<UsageStats, DomainError>;
}
