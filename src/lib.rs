//! Brandgate
//!
//! Multi-tenant credential and permission engine:
//! - API key issuance, validation and lifecycle (active/expired/revoked)
//! - Per-key usage metering with aggregate statistics
//! - Role-based permission resolution with per-client overrides
//! - Audit trail for every security-relevant mutation

pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::audit::AuditSink;
use infrastructure::{
    access::{AccessService, InMemoryAccessRepository},
    api_key::{ApiKeyGenerator, ApiKeyService, InMemoryApiKeyRepository},
    audit::InMemoryAuditSink,
    usage::{InMemoryUsageRepository, UsageMeter},
};

/// All core services wired together over in-memory stores.
#[derive(Debug)]
pub struct CoreServices {
    pub api_keys: Arc<ApiKeyService<InMemoryApiKeyRepository>>,
    pub usage: Arc<UsageMeter<InMemoryUsageRepository>>,
    pub access: Arc<AccessService<InMemoryAccessRepository>>,
    pub audit: Arc<InMemoryAuditSink>,
}

impl CoreServices {
    /// Wire up every service over in-memory stores, sharing one audit
    /// sink. Suitable for tests and local runs.
    pub fn in_memory(config: &AppConfig) -> Self {
        let audit = Arc::new(InMemoryAuditSink::new());
        let audit_sink: Arc<dyn AuditSink> = audit.clone();

        let generator = ApiKeyGenerator::new(config.credentials.key_prefix.clone())
            .with_secret_bytes(config.credentials.secret_bytes);

        let api_keys = Arc::new(
            ApiKeyService::new(Arc::new(InMemoryApiKeyRepository::new()), audit_sink.clone())
                .with_generator(generator),
        );
        let usage = Arc::new(UsageMeter::new(Arc::new(InMemoryUsageRepository::new())));
        let access = Arc::new(AccessService::new(
            Arc::new(InMemoryAccessRepository::new()),
            audit_sink,
        ));

        Self {
            api_keys,
            usage,
            access,
            audit,
        }
    }
}
