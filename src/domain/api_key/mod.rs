//! API Key domain types

mod entity;
mod permission;
mod repository;
mod validation;

pub use entity::{ApiKey, ApiKeyId, ApiKeyLifecycle, ApiKeyPatch};
pub use permission::{Permission, PermissionSet, UnknownPermission};
pub use repository::ApiKeyRepository;
pub use validation::{validate_expiry, validate_key_name, validate_permission_tokens};
