//! In-memory API key repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::api_key::{ApiKey, ApiKeyId, ApiKeyRepository};
use crate::domain::ids::ClientId;
use crate::domain::DomainError;

/// In-memory key store for tests and local runs.
///
/// `set_should_fail` simulates an unreachable backing store so callers
/// can verify fail-closed behavior.
#[derive(Debug, Default)]
pub struct InMemoryApiKeyRepository {
    keys: RwLock<HashMap<String, ApiKey>>,
    should_fail: RwLock<bool>,
}

impl InMemoryApiKeyRepository {
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
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn create(&self, api_key: ApiKey) -> Result<ApiKey, DomainError> {
        self.check_should_fail()?;
        let mut keys = self
            .keys
            .write()
            .map_err(|e| DomainError::internal(format!("lock poisoned: {}", e)))?;
        let id = api_key.id().as_str().to_string();

        if keys.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "API key '{}' already exists",
                id
            )));
        }

        keys.insert(id, api_key.clone());
        Ok(api_key)
    }

    async fn find_by_hash(&self, secret_hash: &str) -> Result<Option<ApiKey>, DomainError> {
        self.check_should_fail()?;
        let keys = self
            .keys
            .read()
            .map_err(|e| DomainError::internal(format!("lock poisoned: {}", e)))?;

        Ok(keys
            .values()
            .find(|k| k.secret_hash() == secret_hash)
            .cloned())
    }

    async fn find_by_id(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        self.check_should_fail()?;
        let keys = self
            .keys
            .read()
            .map_err(|e| DomainError::internal(format!("lock poisoned: {}", e)))?;

        Ok(keys.get(id.as_str()).cloned())
    }

    async fn update(&self, api_key: &ApiKey) -> Result<ApiKey, DomainError> {
        self.check_should_fail()?;
        let mut keys = self
            .keys
            .write()
            .map_err(|e| DomainError::internal(format!("lock poisoned: {}", e)))?;
        let id = api_key.id().as_str().to_string();

        if !keys.contains_key(&id) {
            return Err(DomainError::not_found(format!("API key '{}' not found", id)));
        }

        keys.insert(id, api_key.clone());
        Ok(api_key.clone())
    }

    async fn list_by_client(&self, client_id: &ClientId) -> Result<Vec<ApiKey>, DomainError> {
        self.check_should_fail()?;
        let keys = self
            .keys
            .read()
            .map_err(|e| DomainError::internal(format!("lock poisoned: {}", e)))?;

        let mut result: Vec<ApiKey> = keys
            .values()
            .filter(|k| k.client_id() == client_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at().cmp(&b.created_at()));

        Ok(result)
    }

    async fn record_usage(&self, id: &ApiKeyId) -> Result<(), DomainError> {
        self.check_should_fail()?;
        let mut keys = self
            .keys
            .write()
            .map_err(|e| DomainError::internal(format!("lock poisoned: {}", e)))?;

        match keys.get_mut(id.as_str()) {
            Some(key) => {
                key.record_usage();
                Ok(())
            }
            None => Err(DomainError::not_found(format!(
                "API key '{}' not found",
                id
            ))),
        }
    }
}
