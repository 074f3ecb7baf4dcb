//! Permission tokens and sets
//!
//! The token vocabulary is closed and case-sensitive. Tokens differing only
//! in case or surrounding whitespace are distinct and rejected at the
//! boundary.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A token outside the closed vocabulary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown permission token: '{0}'")]
pub struct UnknownPermission(pub String);

/// One enumerated capability.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Permission {
    /// Generate content on behalf of a client
    ContentGenerate,
    /// Read a client's content
    ContentRead,
    /// Read client metadata
    ClientRead,
    /// Read job status
    JobsRead,
    /// Wildcard grant covering every token
    All,
}

impl Permission {
    /// Parse a token by exact string equality. No trimming, no case folding.
    pub fn parse(token: &str) -> Result<Self, UnknownPermission> {
        match token {
            "content:generate" => Ok(Self::ContentGenerate),
            "content:read" => Ok(Self::ContentRead),
            "client:read" => Ok(Self::ClientRead),
            "jobs:read" => Ok(Self::JobsRead),
            "*" => Ok(Self::All),
            other => Err(UnknownPermission(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentGenerate => "content:generate",
            Self::ContentRead => "content:read",
            Self::ClientRead => "client:read",
            Self::JobsRead => "jobs:read",
            Self::All => "*",
        }
    }

    /// The four concrete capabilities, excluding the wildcard.
    pub fn concrete() -> [Permission; 4] {
        [
            Self::ContentGenerate,
            Self::ContentRead,
            Self::ClientRead,
            Self::JobsRead,
        ]
    }
}

impl std::str::FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Permission {
    type Error = UnknownPermission;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Permission> for String {
    fn from(p: Permission) -> Self {
        p.as_str().to_string()
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An unordered, de-duplicated set of permission tokens.
///
/// Backed by a `BTreeSet` so iteration order is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The full concrete superset (every capability, no wildcard).
    pub fn full() -> Self {
        Permission::concrete().into_iter().collect()
    }

    pub fn insert(&mut self, permission: Permission) {
        self.0.insert(permission);
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    /// Flat membership-or-wildcard check. No implied hierarchy.
    pub fn allows(&self, permission: Permission) -> bool {
        self.0.contains(&permission) || self.0.contains(&Permission::All)
    }

    pub fn has_wildcard(&self) -> bool {
        self.0.contains(&Permission::All)
    }

    /// Union the other set into this one.
    pub fn merge(&mut self, other: &PermissionSet) {
        for p in &other.0 {
            self.0.insert(*p);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Token strings, in deterministic order.
    pub fn tokens(&self) -> Vec<String> {
        self.0.iter().map(|p| p.as_str().to_string()).collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tokens() {
        assert_eq!(
            Permission::parse("content:generate").unwrap(),
            Permission::ContentGenerate
        );
        assert_eq!(Permission::parse("*").unwrap(), Permission::All);
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!(Permission::parse("Content:Read").is_err());
        assert!(Permission::parse("CONTENT:READ").is_err());
    }

    #[test]
    fn test_parse_rejects_surrounding_whitespace() {
        assert!(Permission::parse(" content:read").is_err());
        assert!(Permission::parse("content:read ").is_err());
    }

    #[test]
    fn test_parse_unknown_token() {
        let err = Permission::parse("content:delete").unwrap_err();
        assert_eq!(err, UnknownPermission("content:delete".to_string()));
    }

    #[test]
    fn test_wildcard_allows_every_token() {
        let set: PermissionSet = [Permission::All].into_iter().collect();
        for p in Permission::concrete() {
            assert!(set.allows(p));
        }
        assert!(set.allows(Permission::All));
    }

    #[test]
    fn test_no_implied_permissions() {
        let set: PermissionSet = [Permission::ContentRead].into_iter().collect();
        assert!(set.allows(Permission::ContentRead));
        assert!(!set.allows(Permission::ContentGenerate));
        assert!(!set.allows(Permission::ClientRead));
    }

    #[test]
    fn test_merge_deduplicates() {
        let mut a: PermissionSet = [Permission::ContentRead].into_iter().collect();
        let b: PermissionSet = [Permission::ContentRead, Permission::JobsRead]
            .into_iter()
            .collect();
        a.merge(&b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_full_set_excludes_wildcard() {
        let full = PermissionSet::full();
        assert_eq!(full.len(), 4);
        assert!(!full.has_wildcard());
        assert!(full.allows(Permission::ContentGenerate));
    }

    #[test]
    fn test_tokens_are_deterministic() {
        let set: PermissionSet = [Permission::JobsRead, Permission::ContentRead]
            .into_iter()
            .collect();
        assert_eq!(set.tokens(), set.tokens());
    }

    #[test]
    fn test_serde_round_trip() {
        let set: PermissionSet = [Permission::ContentRead, Permission::All]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("content:read"));
        assert!(json.contains("*"));
        let back: PermissionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
