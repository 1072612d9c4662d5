//! Column type mapping.
//!
//! A [`TypeMapper`] holds an ordered rule list. Custom rules are closures
//! that may decline; static rules match the column type by exact string
//! membership. The first rule that produces a type wins, and an unmatched
//! column type passes through unchanged.
//!
//! # Examples
//!
//! ```
//! use epsgen_codegen::mapping::TypeMapper;
//!
//! let mapper = TypeMapper::from_config(&[]).with_custom(|property, _| {
//!     property.ends_with("Id").then(|| "string".to_string())
//! });
//!
//! assert_eq!(mapper.map("userId", "bigint"), "string");
//! assert_eq!(mapper.map("age", "int"), "number");
//! assert_eq!(mapper.map("shape", "geometry"), "geometry");
//! ```

use epsgen_core::MappingRule;
use std::fmt;
use std::sync::Arc;

/// Closure rule: `(property_name, column_type) -> Some(ts_type)` or decline.
pub type CustomRule = Arc<dyn Fn(&str, &str) -> Option<String> + Send + Sync>;

/// One mapping rule.
#[derive(Clone)]
pub enum TypeRule {
    /// Arbitrary predicate, tested before every static rule.
    Custom(CustomRule),
    /// Emits `target_type` when the column type is one of `matches`.
    StaticTest {
        /// TypeScript type emitted on match.
        target_type: String,
        /// Column type names.
        matches: Vec<String>,
    },
}

impl TypeRule {
    fn apply(&self, property_name: &str, column_type: &str) -> Option<String> {
        match self {
            Self::Custom(rule) => rule(property_name, column_type).filter(|t| !t.is_empty()),
            Self::StaticTest {
                target_type,
                matches,
            } => matches
                .iter()
                .any(|m| m == column_type)
                .then(|| target_type.clone()),
        }
    }
}

impl fmt::Debug for TypeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(_) => f.write_str("Custom(<fn>)"),
            Self::StaticTest {
                target_type,
                matches,
            } => f
                .debug_struct("StaticTest")
                .field("target_type", target_type)
                .field("matches", matches)
                .finish(),
        }
    }
}

impl From<&MappingRule> for TypeRule {
    fn from(rule: &MappingRule) -> Self {
        Self::StaticTest {
            target_type: rule.target_type.clone(),
            matches: rule.test.clone(),
        }
    }
}

/// Ordered rule list.
#[derive(Debug, Clone)]
pub struct TypeMapper {
    rules: Vec<TypeRule>,
}

impl TypeMapper {
    /// Creates a mapper from an explicit rule list, evaluated as given.
    #[must_use]
    pub const fn new(rules: Vec<TypeRule>) -> Self {
        Self { rules }
    }

    /// Configured rules followed by the built-in ones.
    #[must_use]
    pub fn from_config(user_rules: &[MappingRule]) -> Self {
        let rules = user_rules
            .iter()
            .chain(&MappingRule::defaults())
            .map(TypeRule::from)
            .collect();
        Self { rules }
    }

    /// Adds a custom rule after the existing custom rules and before every
    /// static rule.
    #[must_use]
    pub fn with_custom<F>(mut self, rule: F) -> Self
    where
        F: Fn(&str, &str) -> Option<String> + Send + Sync + 'static,
    {
        let position = self
            .rules
            .iter()
            .position(|r| matches!(r, TypeRule::StaticTest { .. }))
            .unwrap_or(self.rules.len());
        self.rules.insert(position, TypeRule::Custom(Arc::new(rule)));
        self
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[TypeRule] {
        &self.rules
    }

    /// TypeScript type for a column.
    #[must_use]
    pub fn map(&self, property_name: &str, column_type: &str) -> String {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(property_name, column_type))
            .unwrap_or_else(|| column_type.to_string())
    }
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self::from_config(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let mapper = TypeMapper::default();
        assert_eq!(mapper.map("name", "varchar"), "string");
        assert_eq!(mapper.map("tags", "simple-array"), "string[]");
        assert_eq!(mapper.map("createTime", "datetime"), "Date");
        assert_eq!(mapper.map("age", "tinyint"), "number");
        assert_eq!(mapper.map("id", "bigint"), "BigInt");
        assert_eq!(mapper.map("meta", "json"), "any");
    }

    #[test]
    fn test_unmatched_passes_through() {
        assert_eq!(TypeMapper::default().map("x", "point"), "point");
        assert_eq!(TypeMapper::default().map("x", ""), "");
    }

    #[test]
    fn test_user_rules_win_over_defaults() {
        let mapper = TypeMapper::from_config(&[MappingRule::new("string", &["bigint"])]);
        assert_eq!(mapper.map("id", "bigint"), "string");
    }

    #[test]
    fn test_custom_rule_declines() {
        let mapper = TypeMapper::default().with_custom(|_, _| None);
        assert_eq!(mapper.map("age", "int"), "number");

        let mapper = TypeMapper::default().with_custom(|_, _| Some(String::new()));
        assert_eq!(mapper.map("age", "int"), "number");
    }

    #[test]
    fn test_custom_rules_keep_order_before_static() {
        let mapper = TypeMapper::default()
            .with_custom(|p, _| (p == "a").then(|| "First".to_string()))
            .with_custom(|_, _| Some("Second".to_string()));

        assert!(matches!(mapper.rules()[0], TypeRule::Custom(_)));
        assert!(matches!(mapper.rules()[1], TypeRule::Custom(_)));
        assert_eq!(mapper.map("a", "int"), "First");
        assert_eq!(mapper.map("b", "int"), "Second");
    }

    #[test]
    fn test_debug_hides_closures() {
        let mapper = TypeMapper::new(vec![]).with_custom(|_, _| None);
        assert!(format!("{mapper:?}").contains("Custom(<fn>)"));
    }
}
