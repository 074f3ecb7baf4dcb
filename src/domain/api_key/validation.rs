//! Boundary validation for key creation and patching

use chrono::{DateTime, Utc};

use super::permission::{Permission, PermissionSet};
use crate::domain::DomainError;

const MAX_KEY_NAME_LENGTH: usize = 100;

/// Validate a key display name: non-empty, at most 100 characters.
pub fn validate_key_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::validation("name", "must not be empty"));
    }

    if name.chars().count() > MAX_KEY_NAME_LENGTH {
        return Err(DomainError::validation(
            "name",
            format!("must be at most {} characters", MAX_KEY_NAME_LENGTH),
        ));
    }

    Ok(())
}

/// Validate raw permission tokens against the closed vocabulary.
///
/// Rejects with every offending token enumerated, not just the first.
pub fn validate_permission_tokens(tokens: &[String]) -> Result<PermissionSet, DomainError> {
    let mut set = PermissionSet::new();
    let mut unknown = Vec::new();

    for token in tokens {
        match Permission::parse(token) {
            Ok(permission) => set.insert(permission),
            Err(_) => unknown.push(token.clone()),
        }
    }

    if !unknown.is_empty() {
        return Err(DomainError::validation(
            "permissions",
            format!("unknown permission tokens: {}", unknown.join(", ")),
        ));
    }

    Ok(set)
}

/// Validate that an expiry, when present, is strictly in the future.
pub fn validate_expiry(expires_at: Option<DateTime<Utc>>) -> Result<(), DomainError> {
    if let Some(expires_at) = expires_at {
        if expires_at <= Utc::now() {
            return Err(DomainError::validation(
                "expires_at",
                "must be in the future",
            ));
        }
    }

    Ok(())
}
