//! Configuration types for the EPS type generator.
//!
//! Every section deserializes with defaults, so a configuration file only
//! needs to name the values it changes.
//!
//! # Examples
//!
//! ```
//! use epsgen_core::{GeneratorConfig, Target};
//!
//! let config = GeneratorConfig {
//!     target: Target::App,
//!     req_url: "http://127.0.0.1:9001".to_string(),
//!     ..Default::default()
//! };
//!
//! assert_eq!(config.schema_url(), "http://127.0.0.1:9001/app/base/comm/eps");
//! assert_eq!(config.namespace_id(), "app");
//! ```

use crate::{Error, Result, Target};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default output directory for `eps.json` and the declaration file.
pub const DEFAULT_DIST: &str = "./build/cool";

/// Default timeout for schema and dictionary requests.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Complete generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Platform the output is generated for.
    pub target: Target,

    /// Base URL of the backend (schema and dictionary endpoints are
    /// appended to it).
    pub req_url: String,

    /// Project root; `eps.dist` is resolved against it.
    pub root_dir: PathBuf,

    /// Schema generation settings.
    pub eps: EpsConfig,

    /// Tailwind class and unit conversion settings.
    pub tailwind: TailwindConfig,

    /// Icon naming settings, carried for the asset bundler.
    pub svg: SvgConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            target: Target::default(),
            req_url: String::new(),
            root_dir: PathBuf::from("."),
            eps: EpsConfig::default(),
            tailwind: TailwindConfig::default(),
            svg: SvgConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Schema endpoint path.
    ///
    /// `eps.api` wins when set; the aliases `admin`, `app` and `uniapp-x`
    /// expand to the platform endpoints, any other value is used verbatim.
    ///
    /// # Examples
    ///
    /// ```
    /// use epsgen_core::GeneratorConfig;
    ///
    /// let mut config = GeneratorConfig::default();
    /// assert_eq!(config.schema_endpoint(), "/admin/base/open/eps");
    ///
    /// config.eps.api = "app".to_string();
    /// assert_eq!(config.schema_endpoint(), "/app/base/comm/eps");
    ///
    /// config.eps.api = "/custom/eps".to_string();
    /// assert_eq!(config.schema_endpoint(), "/custom/eps");
    /// ```
    #[must_use]
    pub fn schema_endpoint(&self) -> String {
        let api = self.eps.api.trim();
        if api.is_empty() {
            return self.target.schema_endpoint().to_string();
        }

        match api.parse::<Target>() {
            Ok(alias) => alias.schema_endpoint().to_string(),
            Err(_) => api.to_string(),
        }
    }

    /// First path segment of the schema endpoint.
    ///
    /// Entity prefixes have this identifier removed before they are split
    /// into namespace tree segments.
    #[must_use]
    pub fn namespace_id(&self) -> String {
        self.schema_endpoint()
            .split('/')
            .nth(1)
            .unwrap_or_default()
            .to_string()
    }

    /// Full schema URL.
    #[must_use]
    pub fn schema_url(&self) -> String {
        format!("{}{}", self.req_url, self.schema_endpoint())
    }

    /// Full dictionary-keys URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use epsgen_core::GeneratorConfig;
    ///
    /// let config = GeneratorConfig {
    ///     req_url: "http://localhost:8001".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(config.dict_url(), "http://localhost:8001/admin/dict/info/types");
    /// ```
    #[must_use]
    pub fn dict_url(&self) -> String {
        format!(
            "{}{}/dict/info/types",
            self.req_url,
            self.target.platform_prefix()
        )
    }

    /// Output directory for generated files.
    #[must_use]
    pub fn dist_dir(&self) -> PathBuf {
        self.root_dir.join(&self.eps.dist)
    }

    /// Timeout applied to schema and dictionary requests.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.eps.timeout_ms)
    }

    /// Checks numeric settings that would make the output meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for a zero timeout or non-positive
    /// unit conversion factors.
    pub fn validate(&self) -> Result<()> {
        if self.eps.timeout_ms == 0 {
            return Err(Error::ConfigError {
                message: "eps.timeout_ms must be greater than zero".to_string(),
            });
        }
        if self.tailwind.rem_unit <= 0.0 || self.tailwind.rpx_ratio <= 0.0 {
            return Err(Error::ConfigError {
                message: "tailwind.rem_unit and tailwind.rpx_ratio must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Schema generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpsConfig {
    /// Whether generation runs at all.
    pub enable: bool,

    /// Schema endpoint override (`admin`, `app`, or a raw path).
    pub api: String,

    /// Output directory, relative to the project root.
    pub dist: PathBuf,

    /// Request timeout in milliseconds.
    pub timeout_ms: u64,

    /// Field type mapping rules, tested before the built-in rules.
    pub mapping: Vec<MappingRule>,
}

impl Default for EpsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            api: String::new(),
            dist: PathBuf::from(DEFAULT_DIST),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            mapping: Vec::new(),
        }
    }
}

/// Static field type mapping rule: any column type listed in `test` maps
/// to `target_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRule {
    /// TypeScript type emitted on match.
    #[serde(rename = "type")]
    pub target_type: String,

    /// Column type names matched by exact string comparison.
    #[serde(default)]
    pub test: Vec<String>,
}

impl MappingRule {
    /// Creates a rule from a target type and the column types it matches.
    #[must_use]
    pub fn new(target_type: impl Into<String>, test: &[&str]) -> Self {
        Self {
            target_type: target_type.into(),
            test: test.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    /// Built-in rules, in evaluation order.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("string", &["varchar", "text", "simple-json"]),
            Self::new("string[]", &["simple-array"]),
            Self::new("Date", &["datetime", "date"]),
            Self::new("number", &["tinyint", "int", "decimal"]),
            Self::new("BigInt", &["bigint"]),
            Self::new("any", &["json"]),
        ]
    }
}

/// Tailwind class rewriting and unit conversion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailwindConfig {
    /// Whether class rewriting runs.
    pub enable: bool,

    /// Root font size in px that `1rem` stands for.
    pub rem_unit: f64,

    /// Decimal places kept when a rem value carries none of its own.
    pub rem_precision: u32,

    /// rpx per px.
    pub rpx_ratio: f64,

    /// Class injected into `<text>` nodes for dark mode.
    pub dark_text_class: String,
}

impl Default for TailwindConfig {
    fn default() -> Self {
        Self {
            enable: true,
            rem_unit: 14.0,
            rem_precision: 6,
            rpx_ratio: 2.0,
            dark_text_class: "dark:text-surface-50".to_string(),
        }
    }
}

impl TailwindConfig {
    /// Multiplier turning a rem amount into rpx.
    #[must_use]
    pub fn rpx_factor(&self) -> f64 {
        self.rem_unit * self.rpx_ratio
    }
}

/// Icon naming settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgConfig {
    /// Module names not prefixed onto icon names.
    pub skip_names: Vec<String>,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            skip_names: vec!["base".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.target, Target::Admin);
        assert!(config.eps.enable);
        assert_eq!(config.eps.timeout_ms, 5000);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert!((config.tailwind.rpx_factor() - 28.0).abs() < f64::EPSILON);
        assert_eq!(config.svg.skip_names, vec!["base".to_string()]);
    }

    #[test]
    fn test_namespace_id_per_target() {
        let mut config = GeneratorConfig::default();
        assert_eq!(config.namespace_id(), "admin");

        config.target = Target::UniappX;
        assert_eq!(config.namespace_id(), "app");

        config.eps.api = "/open/eps".to_string();
        assert_eq!(config.namespace_id(), "open");
    }

    #[test]
    fn test_dist_dir_resolves_against_root() {
        let config = GeneratorConfig {
            root_dir: PathBuf::from("/project"),
            ..Default::default()
        };
        assert_eq!(config.dist_dir(), PathBuf::from("/project/./build/cool"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = GeneratorConfig::default();
        config.eps.timeout_ms = 0;
        assert!(config.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn test_validate_rejects_negative_ratio() {
        let mut config = GeneratorConfig::default();
        config.tailwind.rpx_ratio = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml() {
        let config: GeneratorConfig = toml::from_str(
            r#"
            target = "uniapp-x"
            req_url = "http://localhost:8001"

            [[eps.mapping]]
            type = "number"
            test = ["float"]

            [tailwind]
            rem_unit = 16.0
            "#,
        )
        .unwrap();

        assert_eq!(config.target, Target::UniappX);
        assert_eq!(config.eps.mapping, vec![MappingRule::new("number", &["float"])]);
        assert!((config.tailwind.rem_unit - 16.0).abs() < f64::EPSILON);
        assert_eq!(config.tailwind.rem_precision, 6);
        assert_eq!(config.eps.dist, PathBuf::from(DEFAULT_DIST));
    }

    #[test]
    fn test_default_mapping_order() {
        let defaults = MappingRule::defaults();
        assert_eq!(defaults[0].target_type, "string");
        assert_eq!(defaults[3].test, vec!["tinyint", "int", "decimal"]);
        assert_eq!(defaults.last().unwrap().target_type, "any");
    }
}
