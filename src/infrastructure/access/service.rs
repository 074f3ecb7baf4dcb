//! Permission resolution service
//!
//! Resolves what a human principal may do within one client: role
//! defaults merged with stored per-client overrides. Owner-equivalent
//! roles short-circuit to the full superset without touching storage.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::access::{AccessRepository, Role, UserPermissionOverrides};
use crate::domain::api_key::{validate_permission_tokens, PermissionSet};
use crate::domain::audit::{AuditAction, AuditEvent, AuditSink};
use crate::domain::ids::{ClientId, UserId};
use crate::domain::DomainError;

const AUDIT_RESOURCE: &str = "permission_overrides";

/// Permission resolution service
#[derive(Debug)]
pub struct AccessService<R>
where
    R: AccessRepository,
{
    repository: Arc<R>,
    audit: Arc<dyn AuditSink>,
}

impl<R: AccessRepository> AccessService<R> {
    pub fn new(repository: Arc<R>, audit: Arc<dyn AuditSink>) -> Self {
        Self { repository, audit }
    }

    /// Effective permissions for a user within one client.
    ///
    /// Owner-equivalent roles return the full superset without a
    /// storage read. Everyone else gets role defaults unioned with any
    /// stored overrides for that client; overrides only add.
    pub async fn resolve(
        &self,
        user_id: &UserId,
        role: Role,
        client_id: &ClientId,
    ) -> Result<PermissionSet, DomainError> {
        if role.is_owner_equivalent() {
            return Ok(PermissionSet::full());
        }

        let overrides = match self.repository.find_overrides(user_id).await? {
            Some(blob) => UserPermissionOverrides::parse(user_id, &blob),
            None => UserPermissionOverrides::empty(),
        };

        let mut permissions = role.default_permissions();
        permissions.merge(&overrides.for_client(client_id));

        debug!(
            user_id = %user_id,
            %role,
            client_id = %client_id,
            granted = permissions.len(),
            "resolved permissions"
        );

        Ok(permissions)
    }

    /// Whether the user may operate on the client at all.
    ///
    /// Unrestricted roles reach every client; everyone else needs an
    /// explicit assignment.
    pub async fn can_access_client(
        &self,
        user_id: &UserId,
        role: Role,
        client_id: &ClientId,
    ) -> Result<bool, DomainError> {
        if role.is_unrestricted() {
            return Ok(true);
        }

        self.repository.is_assigned(user_id, client_id).await
    }

    /// Replace a user's override grants for one client.
    ///
    /// Tokens are validated against the closed vocabulary before the
    /// blob is rewritten; grants for other clients are preserved.
    pub async fn set_overrides(
        &self,
        actor: &str,
        user_id: &UserId,
        client_id: &ClientId,
        permission_tokens: &[String],
    ) -> Result<(), DomainError> {
        let permissions = validate_permission_tokens(permission_tokens)?;

        let mut overrides = match self.repository.find_overrides(user_id).await? {
            Some(blob) => UserPermissionOverrides::parse(user_id, &blob),
            None => UserPermissionOverrides::empty(),
        };
        overrides.set(client_id, permissions);

        let blob = overrides.to_blob()?;
        self.repository.save_overrides(user_id, &blob).await?;

        if let Err(error) = self
            .audit
            .record(
                AuditEvent::new(actor, AuditAction::Update, AUDIT_RESOURCE, user_id.as_str())
                    .with_details(json!({
                        "client_id": client_id.as_str(),
                        "permissions": permission_tokens,
                    })),
            )
            .await
        {
            warn!(%error, "audit delivery failed");
        }

        Ok(())
    }
}
