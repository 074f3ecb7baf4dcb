//! Access repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::ids::{ClientId, UserId};
use crate::domain::DomainError;

/// Storage seam for permission overrides and user-client assignments.
#[async_trait]
pub trait AccessRepository: Send + Sync + Debug {
    /// Raw override blob for a user, if any is stored. Parsing happens
    /// at the caller so corrupt blobs cannot fail the read path.
    async fn find_overrides(&self, user_id: &UserId) -> Result<Option<String>, DomainError>;

    /// Persist a user's override blob, replacing any previous one
    async fn save_overrides(&self, user_id: &UserId, blob: &str) -> Result<(), DomainError>;

    /// Whether the user has an explicit assignment to the client
    async fn is_assigned(&self, user_id: &UserId, client_id: &ClientId)
        -> Result<bool, DomainError>;
}
