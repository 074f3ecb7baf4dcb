//! Domain layer - Core business logic and entities

pub mod access;
pub mod api_key;
pub mod audit;
pub mod error;
pub mod ids;
pub mod usage;

pub use access::{AccessRepository, Role, UserPermissionOverrides};
pub use api_key::{
    ApiKey, ApiKeyId, ApiKeyLifecycle, ApiKeyPatch, ApiKeyRepository, Permission, PermissionSet,
};
pub use audit::{AuditAction, AuditEvent, AuditSink};
pub use error::DomainError;
pub use ids::{ClientId, UserId};
pub use usage::{EndpointCount, UsageRange, UsageRecord, UsageRepository, UsageStats};
