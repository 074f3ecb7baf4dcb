//! API Key service
//!
//! Issues, validates, patches and revokes client-scoped bearer
//! credentials. The validator fails closed: any storage fault surfaces
//! as an error that callers must treat as a denial, and every invalid
//! credential (never issued, expired, revoked) collapses to `None`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::api_key::{
    validate_expiry, validate_key_name, validate_permission_tokens, ApiKey, ApiKeyId, ApiKeyPatch,
    ApiKeyRepository, Permission,
};
use crate::domain::audit::{AuditAction, AuditEvent, AuditSink};
use crate::domain::ids::ClientId;
use crate::domain::DomainError;

use super::generator::ApiKeyGenerator;

const AUDIT_RESOURCE: &str = "api_key";

/// Result of creating a new API key
#[derive(Debug)]
pub struct CreateApiKeyResult {
    /// The persisted record (without the secret)
    pub api_key: ApiKey,
    /// The full secret. Returned exactly once, never stored.
    pub secret: String,
}

/// API Key service for issuance and validation
#[derive(Debug)]
pub struct ApiKeyService<R>
where
    R: ApiKeyRepository,
{
    repository: Arc<R>,
    generator: ApiKeyGenerator,
    audit: Arc<dyn AuditSink>,
}

impl<R: ApiKeyRepository + 'static> ApiKeyService<R> {
    pub fn new(repository: Arc<R>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            repository,
            generator: ApiKeyGenerator::default(),
            audit,
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: ApiKeyGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Issue a new key for a client.
    ///
    /// Duplicate names under one client are permitted by design.
    pub async fn create_api_key(
        &self,
        actor: &str,
        client_id: ClientId,
        name: &str,
        permission_tokens: &[String],
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<CreateApiKeyResult, DomainError> {
        validate_key_name(name)?;
        let permissions = validate_permission_tokens(permission_tokens)?;
        validate_expiry(expires_at)?;

        let generated = self.generator.generate();

        let mut api_key = ApiKey::new(
            ApiKeyId::generate(),
            name,
            &generated.hash,
            &generated.display_prefix,
            client_id,
        )
        .with_permissions(permissions);

        if let Some(expires_at) = expires_at {
            api_key = api_key.with_expiration(expires_at);
        }

        let created = self.repository.create(api_key).await?;

        info!(
            id = %created.id(),
            client_id = %created.client_id(),
            key_prefix = %created.key_prefix(),
            "API key created"
        );

        self.emit(
            AuditEvent::new(actor, AuditAction::Create, AUDIT_RESOURCE, created.id().as_str())
                .with_details(json!({
                    "client_id": created.client_id().as_str(),
                    "name": created.name(),
                    "key_prefix": created.key_prefix(),
                    "permissions": created.permissions().tokens(),
                    "expires_at": created.expires_at(),
                })),
        )
        .await;

        Ok(CreateApiKeyResult {
            api_key: created,
            secret: generated.secret,
        })
    }

    /// Resolve a presented secret to an active, non-expired key.
    ///
    /// Returns `Ok(None)` for malformed, unknown, expired and revoked
    /// secrets alike. A storage fault is an `Err` and callers deny.
    pub async fn validate(&self, raw_secret: &str) -> Result<Option<ApiKey>, DomainError> {
        if !self.generator.is_well_formed(raw_secret) {
            debug!("credential rejected by shape check");
            return Ok(None);
        }

        let hash = self.generator.hash_secret(raw_secret);

        let Some(key) = self.repository.find_by_hash(&hash).await? else {
            return Ok(None);
        };

        if !key.is_valid() {
            debug!(id = %key.id(), lifecycle = %key.lifecycle(), "credential not usable");
            return Ok(None);
        }

        // Informational telemetry: detached from the gating path, lost
        // updates are acceptable.
        let repository = Arc::clone(&self.repository);
        let id = key.id().clone();
        tokio::spawn(async move {
            if let Err(error) = repository.record_usage(&id).await {
                warn!(id = %id, %error, "failed to record key usage");
            }
        });

        Ok(Some(key))
    }

    /// Flat membership-or-wildcard permission check
    pub fn has_permission(&self, key: &ApiKey, permission: Permission) -> bool {
        key.permissions().allows(permission)
    }

    /// Apply an optional-field patch to a key.
    ///
    /// Revocation is terminal: `is_active: true` on a revoked key is
    /// rejected, `is_active: false` revokes.
    pub async fn update(
        &self,
        actor: &str,
        id: &ApiKeyId,
        patch: ApiKeyPatch,
    ) -> Result<ApiKey, DomainError> {
        let mut key = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("API key '{}' not found", id)))?;

        if let Some(ref name) = patch.name {
            validate_key_name(name)?;
        }

        let permissions = match patch.permissions.as_deref() {
            Some(tokens) => Some(validate_permission_tokens(tokens)?),
            None => None,
        };

        if let Some(Some(expires_at)) = patch.expires_at {
            validate_expiry(Some(expires_at))?;
        }

        let mut revoked_now = false;

        match patch.is_active {
            Some(true) if !key.is_active() => {
                return Err(DomainError::validation(
                    "is_active",
                    "revoked keys cannot be reactivated",
                ));
            }
            Some(false) if key.is_active() => {
                key.revoke();
                revoked_now = true;
            }
            _ => {}
        }

        if let Some(name) = patch.name {
            key.set_name(name);
        }

        if let Some(permissions) = permissions {
            key.set_permissions(permissions);
        }

        if let Some(expires_at) = patch.expires_at {
            key.set_expiration(expires_at);
        }

        let updated = self.repository.update(&key).await?;

        info!(id = %id, revoked = revoked_now, "API key updated");

        let action = if revoked_now {
            AuditAction::Revoke
        } else {
            AuditAction::Update
        };

        self.emit(
            AuditEvent::new(actor, action, AUDIT_RESOURCE, id.as_str()).with_details(json!({
                "client_id": updated.client_id().as_str(),
                "name": updated.name(),
                "permissions": updated.permissions().tokens(),
                "is_active": updated.is_active(),
                "expires_at": updated.expires_at(),
            })),
        )
        .await;

        Ok(updated)
    }

    /// Revoke a key. Terminal; the record survives for usage history.
    pub async fn revoke(&self, actor: &str, id: &ApiKeyId) -> Result<ApiKey, DomainError> {
        let mut key = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("API key '{}' not found", id)))?;

        key.revoke();
        let revoked = self.repository.update(&key).await?;

        info!(id = %id, client_id = %revoked.client_id(), "API key revoked");

        self.emit(
            AuditEvent::new(actor, AuditAction::Revoke, AUDIT_RESOURCE, id.as_str())
                .with_details(json!({ "client_id": revoked.client_id().as_str() })),
        )
        .await;

        Ok(revoked)
    }

    /// Get a key by ID
    pub async fn get(&self, id: &ApiKeyId) -> Result<Option<ApiKey>, DomainError> {
        self.repository.find_by_id(id).await
    }

    /// List a client's keys. Exposes the lifecycle distinction the
    /// validator hides.
    pub async fn list_by_client(&self, client_id: &ClientId) -> Result<Vec<ApiKey>, DomainError> {
        self.repository.list_by_client(client_id).await
    }

    /// Synchronous-with-the-mutation, non-fatal audit delivery
    async fn emit(&self, event: AuditEvent) {
        if let Err(error) = self.audit.record(event).await {
            warn!(%error, "audit delivery failed");
        }
    }
}
