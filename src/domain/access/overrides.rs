//! Per-user permission overrides
//!
//! Stored as an opaque JSON blob mapping client IDs to permission-token
//! lists. The blob comes from an external store and may be stale or
//! corrupt; reading degrades to "no overrides" with a warn-level
//! diagnostic rather than failing the authorization path.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::api_key::{Permission, PermissionSet};
use crate::domain::ids::{ClientId, UserId};
use crate::domain::DomainError;

/// Sparse per-user map of client ID to extra grants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPermissionOverrides {
    by_client: HashMap<String, PermissionSet>,
}

impl UserPermissionOverrides {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the stored blob. Unparsable blobs and unknown tokens degrade
    /// to empty, never to extra grants.
    pub fn parse(user_id: &UserId, raw: &str) -> Self {
        let parsed: HashMap<String, Vec<String>> = match serde_json::from_str(raw) {
            Ok(map) => map,
            Err(error) => {
                warn!(
                    user_id = %user_id,
                    %error,
                    "unparsable permission-override blob, treating as no overrides"
                );
                return Self::empty();
            }
        };

        let mut by_client = HashMap::new();

        for (client_id, tokens) in parsed {
            let mut set = PermissionSet::new();

            for token in tokens {
                match Permission::parse(&token) {
                    Ok(permission) => set.insert(permission),
                    Err(_) => {
                        warn!(
                            user_id = %user_id,
                            client_id = %client_id,
                            token = %token,
                            "unknown permission token in stored overrides, skipping"
                        );
                    }
                }
            }

            by_client.insert(client_id, set);
        }

        Self { by_client }
    }

    /// Overrides for one client, empty if none are stored.
    pub fn for_client(&self, client_id: &ClientId) -> PermissionSet {
        self.by_client
            .get(client_id.as_str())
            .cloned()
            .unwrap_or_default()
    }

    pub fn set(&mut self, client_id: &ClientId, permissions: PermissionSet) {
        self.by_client
            .insert(client_id.as_str().to_string(), permissions);
    }

    pub fn is_empty(&self) -> bool {
        self.by_client.is_empty()
    }

    /// Serialize back to the stored blob form.
    pub fn to_blob(&self) -> Result<String, DomainError> {
        let map: HashMap<&str, Vec<String>> = self
            .by_client
            .iter()
            .map(|(client_id, set)| (client_id.as_str(), set.tokens()))
            .collect();

        serde_json::to_string(&map)
            .map_err(|e| DomainError::internal(format!("failed to serialize overrides: {}", e)))
    }
}
