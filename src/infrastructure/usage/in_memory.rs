//! In-memory usage repository

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::api_key::ApiKeyId;
use crate::domain::usage::{UsageRange, UsageRecord, UsageRepository, UsageStats};
use crate::domain::DomainError;

/// Append-only in-memory usage store for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryUsageRepository {
    records: RwLock<Vec<UsageRecord>>,
    should_fail: RwLock<bool>,
}

impl InMemoryUsageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().expect("lock poisoned") = fail;
    }

    fn check_should_fail(&self) -> Result<(), DomainError> {
        if *self.should_fail.read().expect("lock poisoned") {
            return Err(DomainError::storage("store unreachable"));
        }
        Ok(())
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UsageRepository for InMemoryUsageRepository {
    async fn insert(&self, record: UsageRecord) -> Result<(), DomainError> {
        self.check_should_fail()?;
        self.records
            .write()
            .map_err(|e| DomainError::internal(format!("lock poisoned: {}", e)))?
            .push(record);
        Ok(())
    }

    async fn aggregate(
        &self,
        api_key_id: &ApiKeyId,
        range: &UsageRange,
    ) -> Result<UsageStats, DomainError> {
        self.check_should_fail()?;
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::internal(format!("lock poisoned: {}", e)))?;

        Ok(UsageStats::collect(
            records
                .iter()
                .filter(|r| &r.api_key_id == api_key_id && range.contains(r.created_at)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, endpoint: &str, status: u16) -> UsageRecord {
        UsageRecord::new(ApiKeyId::from(key), endpoint, "POST", status)
    }

    #[tokio::test]
    async fn test_aggregate_filters_by_key() {
        let repo = InMemoryUsageRepository::new();
        repo.insert(record("key-1", "/v1/content", 200)).await.unwrap();
        repo.insert(record("key-1", "/v1/content", 500)).await.unwrap();
        repo.insert(record("key-2", "/v1/content", 200)).await.unwrap();

        let stats = repo
            .aggregate(&ApiKeyId::from("key-1"), &UsageRange::unbounded())
            .await
            .unwrap();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(stats.failed_requests, 1);
    }

    #[tokio::test]
    async fn test_aggregate_unknown_key_is_zero() {
        let repo = InMemoryUsageRepository::new();

        let stats = repo
            .aggregate(&ApiKeyId::from("key-missing"), &UsageRange::unbounded())
            .await
            .unwrap();
        assert_eq!(stats, UsageStats::default());
    }

    #[tokio::test]
    async fn test_aggregate_honors_range() {
        let repo = InMemoryUsageRepository::new();
        repo.insert(record("key-1", "/v1/content", 200)).await.unwrap();

        let past = UsageRange::new(None, Some(chrono::Utc::now() - chrono::Duration::hours(1)));
        let stats = repo.aggregate(&ApiKeyId::from("key-1"), &past).await.unwrap();
        assert_eq!(stats.total_requests, 0);
    }

    #[tokio::test]
    async fn test_should_fail_simulates_outage() {
        let repo = InMemoryUsageRepository::new();
        repo.set_should_fail(true);

        assert!(repo.insert(record("key-1", "/v1/content", 200)).await.is_err());
        assert!(repo
            .aggregate(&ApiKeyId::from("key-1"), &UsageRange::unbounded())
            .await
            .is_err());
    }
}
