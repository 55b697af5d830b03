//! Resource identity and optimistic-concurrency version token
//!
//! Follows the Kubernetes object reference pattern: a resource is identified
//! by kind, namespace, and name. The identity is the store key for both
//! desired and existing lookups and is never mutated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable key identifying one managed resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Kind of the resource (e.g., "Workload")
    pub kind: String,

    /// Namespace the resource lives in
    pub namespace: String,

    /// Name of the resource
    pub name: String,
}

impl Identity {
    /// Create a new identity
    pub fn new(
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Identity for a workload resource in the given namespace
    pub fn workload(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new("Workload", namespace, name)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.kind, self.namespace, self.name)
    }
}

/// Opaque version token read at `get` time and checked at `update` time.
///
/// The store bumps the token on every successful write; a stale token on
/// update is reported as a conflict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct VersionToken(pub String);

impl VersionToken {
    /// Create a token from any displayable value
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The token as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
