//! Operator roles and their default permission vectors

use serde::{Deserialize, Serialize};

use crate::domain::api_key::{Permission, PermissionSet};

/// Role of a human principal. Closed enumeration; each role carries a
/// fixed default permission vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Tenant owner
    Owner,
    /// Platform administrator
    Admin,
    /// Manages every client under the tenant
    Manager,
    /// Creates and edits content
    Editor,
    /// Read-only access
    Viewer,
    /// Regular member
    User,
}

impl Role {
    /// Owner-equivalent roles bypass per-client overrides entirely and
    /// resolve to the full permission superset.
    pub fn is_owner_equivalent(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Unrestricted roles may access any client without an explicit
    /// assignment, but their permissions still merge with overrides.
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin | Self::Manager)
    }

    /// The fixed default permission vector for this role.
    pub fn default_permissions(&self) -> PermissionSet {
        match self {
            Self::Owner | Self::Admin | Self::Manager => PermissionSet::full(),
            Self::Editor => [
                Permission::ContentGenerate,
                Permission::ContentRead,
                Permission::JobsRead,
            ]
            .into_iter()
            .collect(),
            Self::Viewer => [Permission::ContentRead].into_iter().collect(),
            Self::User => [Permission::ContentRead, Permission::JobsRead]
                .into_iter()
                .collect(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Admin => write!(f, "admin"),
            Self::Manager => write!(f, "manager"),
            Self::Editor => write!(f, "editor"),
            Self::Viewer => write!(f, "viewer"),
            Self::User => write!(f, "user"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_equivalent_roles() {
        assert!(Role::Owner.is_owner_equivalent());
        assert!(Role::Admin.is_owner_equivalent());
        assert!(!Role::Manager.is_owner_equivalent());
        assert!(!Role::Viewer.is_owner_equivalent());
    }

    #[test]
    fn test_unrestricted_roles() {
        assert!(Role::Manager.is_unrestricted());
        assert!(!Role::Editor.is_unrestricted());
        assert!(!Role::User.is_unrestricted());
    }

    #[test]
    fn test_viewer_defaults_to_read_only() {
        let defaults = Role::Viewer.default_permissions();
        assert_eq!(defaults.len(), 1);
        assert!(defaults.allows(Permission::ContentRead));
        assert!(!defaults.allows(Permission::ContentGenerate));
    }

    #[test]
    fn test_owner_defaults_to_full_superset() {
        let defaults = Role::Owner.default_permissions();
        for p in Permission::concrete() {
            assert!(defaults.allows(p));
        }
    }

    #[test]
    fn test_editor_cannot_read_client_metadata() {
        let defaults = Role::Editor.default_permissions();
        assert!(defaults.allows(Permission::ContentGenerate));
        assert!(!defaults.allows(Permission::ClientRead));
    }
}
