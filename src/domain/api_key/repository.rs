//! API Key repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ApiKey, ApiKeyId};
use crate::domain::ids::ClientId;
use crate::domain::DomainError;

/// Storage seam for API key records.
///
/// Lookups during authentication go through the secret digest only; the
/// display prefix is never a query key.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Persist a new API key record
    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError>;

    /// Find a key by its secret digest
    async fn find_by_hash(&self, secret_hash: &str) -> Result<Option<ApiKey>, DomainError>;

    /// Find a key by its ID
    async fn find_by_id(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError>;

    /// Update an existing key record
    async fn update(&self, api_key: &ApiKey) -> Result<ApiKey, DomainError>;

    /// List every key scoped to a client, regardless of lifecycle state
    async fn list_by_client(&self, client_id: &ClientId) -> Result<Vec<ApiKey>, DomainError>;

    /// Touch `last_used_at`. Last-write-wins under concurrency.
    async fn record_usage(&self, id: &ApiKeyId) -> Result<(), DomainError>;
}
