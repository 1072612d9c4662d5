//! Collision records.
//!
//! Duplicate entity names, illegal identifiers and flattener key clashes
//! are resolved first-writer-wins. Each resolution is logged and recorded
//! here so callers and tests can see what was dropped.

use serde::Serialize;
use std::fmt;

/// What kind of name was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollisionKind {
    /// A second entity formatted to an already emitted interface name.
    EntityName,
    /// A name containing `{`, `}` or `:` was skipped.
    IllegalName,
    /// Two nested objects shared a key but not a shape.
    FlattenKey,
}

impl CollisionKind {
    /// Short label used in logs and reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EntityName => "entity-name",
            Self::IllegalName => "illegal-name",
            Self::FlattenKey => "flatten-key",
        }
    }
}

/// One dropped name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    /// Kind of collision.
    pub kind: CollisionKind,
    /// The name involved.
    pub name: String,
    /// Where it came from.
    pub detail: String,
}

impl Collision {
    /// Creates a collision record.
    #[must_use]
    pub fn new(kind: CollisionKind, name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.kind.as_str(), self.name, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let collision = Collision::new(CollisionKind::EntityName, "User", "/admin/base/user");
        assert_eq!(collision.to_string(), "[entity-name] User (/admin/base/user)");
    }

    #[test]
    fn test_serialize_kind() {
        let value = serde_json::to_value(CollisionKind::FlattenKey).unwrap();
        assert_eq!(value, "flatten-key");
    }
}
