//! Release identity resolution

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Default namespace when the caller supplies none
pub const DEFAULT_NAMESPACE: &str = "default";

/// The (name, namespace) pair that uniquely keys a release
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReleaseIdentity {
    pub name: String,
    pub namespace: String,
}

impl ReleaseIdentity {
    /// Resolve an identity from caller-supplied identifiers.
    ///
    /// The name is required; an absent or empty namespace resolves to
    /// `"default"`. No further normalization happens here - cluster-level
    /// naming constraints are the caller's problem.
    pub fn resolve(name: Option<&str>, namespace: Option<&str>) -> Result<Self> {
        let name = match name {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => return Err(CoreError::validation("name", "release name is required")),
        };

        let namespace = match namespace {
            Some(ns) if !ns.is_empty() => ns.to_string(),
            _ => DEFAULT_NAMESPACE.to_string(),
        };

        Ok(Self { name, namespace })
    }
}

impl std::fmt::Display for ReleaseIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_defaults() {
        let id = ReleaseIdentity::resolve(Some("demo"), None).unwrap();
        assert_eq!(id.name, "demo");
        assert_eq!(id.namespace, "default");

        let id = ReleaseIdentity::resolve(Some("demo"), Some("")).unwrap();
        assert_eq!(id.namespace, "default");
    }

    #[test]
    fn test_explicit_namespace_kept() {
        let id = ReleaseIdentity::resolve(Some("demo"), Some("team-7")).unwrap();
        assert_eq!(id.namespace, "team-7");
    }

    #[test]
    fn test_missing_name_fails() {
        assert!(ReleaseIdentity::resolve(None, Some("default")).is_err());
        assert!(ReleaseIdentity::resolve(Some(""), None).is_err());
    }

    #[test]
    fn test_display() {
        let id = ReleaseIdentity::resolve(Some("demo"), Some("team-7")).unwrap();
        assert_eq!(id.to_string(), "team-7/demo");
    }
}
