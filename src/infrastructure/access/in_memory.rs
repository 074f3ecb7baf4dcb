//! In-memory access repository

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::access::AccessRepository;
use crate::domain::ids::{ClientId, UserId};
use crate::domain::DomainError;

/// In-memory override and assignment store for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemoryAccessRepository {
    overrides: RwLock<HashMap<String, String>>,
    assignments: RwLock<HashSet<(String, String)>>,
    should_fail: RwLock<bool>,
}

impl InMemoryAccessRepository {
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

    /// Assign a user to a client
    pub fn assign(&self, user_id: &UserId, client_id: &ClientId) {
        self.assignments
            .write()
            .expect("lock poisoned")
            .insert((user_id.as_str().to_string(), client_id.as_str().to_string()));
    }
}

#[async_trait]
impl AccessRepository for InMemoryAccessRepository {
    async fn find_overrides(&self, user_id: &UserId) -> Result<Option<String>, DomainError> {
        self.check_should_fail()?;
        let overrides = self
            .overrides
            .read()
            .map_err(|e| DomainError::internal(format!("lock poisoned: {}", e)))?;

        Ok(overrides.get(user_id.as_str()).cloned())
    }

    async fn save_overrides(&self, user_id: &UserId, blob: &str) -> Result<(), DomainError> {
        self.check_should_fail()?;
        self.overrides
            .write()
            .map_err(|e| DomainError::internal(format!("lock poisoned: {}", e)))?
            .insert(user_id.as_str().to_string(), blob.to_string());
        Ok(())
    }

    async fn is_assigned(
        &self,
        user_id: &UserId,
        client_id: &ClientId,
    ) -> Result<bool, DomainError> {
        self.check_should_fail()?;
        let assignments = self
            .assignments
            .read()
            .map_err(|e| DomainError::internal(format!("lock poisoned: {}", e)))?;

        Ok(assignments
            .contains(&(user_id.as_str().to_string(), client_id.as_str().to_string())))
    }
}
