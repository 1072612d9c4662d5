//! Target platform identifier.
//!
//! The target decides where the schema lives on the backend, how the
//! declaration file is shaped, and which entities survive normalization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform the generated code is consumed by.
///
/// # Examples
///
/// ```
/// use epsgen_core::Target;
///
/// let target: Target = "uniapp-x".parse().unwrap();
/// assert!(target.is_cross_platform());
/// assert_eq!(target.declaration_file_name(), "eps.ts");
/// assert_eq!(Target::Admin.schema_endpoint(), "/admin/base/open/eps");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// Admin web front end (ambient `declare namespace` output).
    #[default]
    Admin,
    /// Client application.
    App,
    /// Cross-platform client built by a stricter compiler (exported types).
    UniappX,
}

impl Target {
    /// Returns the configuration spelling of the target.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::App => "app",
            Self::UniappX => "uniapp-x",
        }
    }

    /// Schema endpoint path used when no override is configured.
    #[must_use]
    pub const fn schema_endpoint(&self) -> &'static str {
        match self {
            Self::Admin => "/admin/base/open/eps",
            Self::App | Self::UniappX => "/app/base/comm/eps",
        }
    }

    /// Route prefix of the platform's own API (`/admin` or `/app`).
    #[must_use]
    pub const fn platform_prefix(&self) -> &'static str {
        match self {
            Self::Admin => "/admin",
            Self::App | Self::UniappX => "/app",
        }
    }

    /// `true` for the cross-platform target.
    #[must_use]
    pub const fn is_cross_platform(&self) -> bool {
        matches!(self, Self::UniappX)
    }

    /// `true` for client-side targets that share a schema with the admin
    /// back end and therefore need entity filtering.
    #[must_use]
    pub const fn is_client(&self) -> bool {
        matches!(self, Self::App | Self::UniappX)
    }

    /// File name of the generated declaration file.
    #[must_use]
    pub const fn declaration_file_name(&self) -> &'static str {
        if self.is_cross_platform() {
            "eps.ts"
        } else {
            "eps.d.ts"
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "app" => Ok(Self::App),
            "uniapp-x" | "uniappx" => Ok(Self::UniappX),
            _ => Err(crate::Error::InvalidArgument(format!(
                "invalid target: '{s}' (expected: admin, app, or uniapp-x)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_endpoints() {
        assert_eq!(Target::Admin.schema_endpoint(), "/admin/base/open/eps");
        assert_eq!(Target::App.schema_endpoint(), "/app/base/comm/eps");
        assert_eq!(Target::UniappX.schema_endpoint(), "/app/base/comm/eps");
    }

    #[test]
    fn test_platform_prefix() {
        assert_eq!(Target::Admin.platform_prefix(), "/admin");
        assert_eq!(Target::App.platform_prefix(), "/app");
    }

    #[test]
    fn test_client_targets() {
        assert!(!Target::Admin.is_client());
        assert!(Target::App.is_client());
        assert!(Target::UniappX.is_client());
    }

    #[test]
    fn test_parse_roundtrip() {
        for target in [Target::Admin, Target::App, Target::UniappX] {
            assert_eq!(target.as_str().parse::<Target>().unwrap(), target);
        }
        assert!("desktop".parse::<Target>().is_err());
    }

    #[test]
    fn test_serde_spelling() {
        let json = serde_json::to_string(&Target::UniappX).unwrap();
        assert_eq!(json, "\"uniapp-x\"");
    }
}
