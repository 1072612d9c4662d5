//! EPS data model.
//!
//! The backend payload is loosely typed: any field may be missing or `null`,
//! and entities carry arbitrary extra keys. Every field therefore
//! deserializes with a default, and unknown keys are kept in `extra` so the
//! full-form cache file round-trips them.
//!
//! # Examples
//!
//! ```
//! use epsgen_schema::Entity;
//!
//! let entity: Entity = serde_json::from_str(r#"{
//!     "prefix": "/admin/base/sys/user",
//!     "name": "BaseSysUserEntity",
//!     "api": [{ "method": "post", "path": "/page" }],
//!     "columns": [{ "propertyName": "age", "type": "int", "source": "a.age" }],
//!     "module": null
//! }"#).unwrap();
//!
//! assert_eq!(entity.api[0].path, "/page");
//! assert_eq!(entity.columns[0].property_name, "age");
//! assert!(entity.namespace.is_empty());
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Treats `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One backend resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Route prefix, e.g. `/admin/base/sys/user`. Unique per entity.
    #[serde(default, deserialize_with = "nullable")]
    pub prefix: String,

    /// Type identifier. May collide across entities.
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    /// Namespace hint supplied by the backend.
    #[serde(default, deserialize_with = "nullable")]
    pub namespace: String,

    /// Owning backend module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// API operations, in declaration order.
    #[serde(default, deserialize_with = "nullable")]
    pub api: Vec<Method>,

    /// Entity fields.
    #[serde(default, deserialize_with = "nullable")]
    pub columns: Vec<Column>,

    /// Extra fields only returned by the page query.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub page_columns: Vec<Column>,

    /// Page query configuration listing searchable column sources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_query_op: Option<PageQueryOp>,

    /// Searchable columns, grouped by match kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<Search>,

    /// Keys not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity {
    /// Union of `columns` and `pageColumns`, deduplicated by `source`.
    ///
    /// The first column seen for a source wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use epsgen_schema::{Column, Entity};
    ///
    /// let entity = Entity {
    ///     columns: vec![Column::new("age", "int", "a.age")],
    ///     page_columns: vec![
    ///         Column::new("ageText", "varchar", "a.age"),
    ///         Column::new("dept", "varchar", "d.name"),
    ///     ],
    ///     ..Default::default()
    /// };
    ///
    /// let merged = entity.merged_columns();
    /// assert_eq!(merged.len(), 2);
    /// assert_eq!(merged[0].property_name, "age");
    /// ```
    #[must_use]
    pub fn merged_columns(&self) -> Vec<&Column> {
        let mut merged: Vec<&Column> = Vec::new();
        for column in self.columns.iter().chain(&self.page_columns) {
            if !merged.iter().any(|seen| seen.source == column.source) {
                merged.push(column);
            }
        }
        merged
    }

    /// Resolves column sources against `columns` then `pageColumns`.
    ///
    /// Sources that are not strings or match no column are dropped.
    #[must_use]
    pub fn find_columns(&self, sources: &[Value]) -> Vec<Column> {
        sources
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|source| {
                self.columns
                    .iter()
                    .chain(&self.page_columns)
                    .find(|column| column.source == source)
                    .cloned()
            })
            .collect()
    }

    /// Derives [`Search`] from `pageQueryOp` when the payload has none.
    pub fn fill_search(&mut self) {
        if self.search.is_some() {
            return;
        }

        let op = self.page_query_op.clone().unwrap_or_default();
        self.search = Some(Search {
            field_eq: self.find_columns(&op.field_eq),
            field_like: self.find_columns(&op.field_like),
            key_word_like_fields: self.find_columns(&op.key_word_like_fields),
        });
    }

    /// Reduced form written to the cache file for non-cross-platform
    /// targets.
    #[must_use]
    pub fn summary(&self) -> EntitySummary {
        EntitySummary {
            prefix: self.prefix.clone(),
            name: self.name.clone(),
            api: self.api.iter().map(Method::summary).collect(),
            search: self.search.clone(),
        }
    }
}

/// One API operation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Method {
    /// Route suffix relative to the entity prefix, e.g. `/page`.
    #[serde(default, deserialize_with = "nullable")]
    pub path: String,

    /// HTTP verb.
    #[serde(default, deserialize_with = "nullable")]
    pub method: String,

    /// Name override for the generated method signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// Entity prefix the method belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,

    /// Grouping tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Request shape.
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "MethodDts::is_empty"
    )]
    pub dts: MethodDts,

    /// Keys not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Method {
    /// Creates a method from its verb and path.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Name used in generated code: the override when present, otherwise
    /// the last path segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use epsgen_schema::Method;
    ///
    /// assert_eq!(Method::new("get", "/user/info").display_name(), "info");
    /// ```
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.path.rsplit('/').next().unwrap_or_default(),
        }
    }

    /// Request parameters, in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.dts.parameters
    }

    /// `{name, method, path}` triple stored in the summary cache.
    #[must_use]
    pub fn summary(&self) -> MethodSummary {
        MethodSummary {
            name: self.name.clone(),
            method: self.method.clone(),
            path: self.path.clone(),
        }
    }
}

/// Request description attached to a [`Method`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodDts {
    /// Request parameters.
    #[serde(default, deserialize_with = "nullable")]
    pub parameters: Vec<Parameter>,
}

impl MethodDts {
    /// `true` when no parameters are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// One request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,

    /// Whether callers must supply it.
    #[serde(default, deserialize_with = "nullable")]
    pub required: bool,

    /// Documentation emitted above the parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Declared value schema.
    #[serde(default, deserialize_with = "nullable")]
    pub schema: ParameterSchema,
}

/// Declared value schema of a [`Parameter`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// TypeScript type name; `string` is assumed when absent.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

/// One entity field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Field name in generated interfaces.
    #[serde(default, deserialize_with = "nullable")]
    pub property_name: String,

    /// Logical type name fed to the type mapper.
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub column_type: String,

    /// Raw source name; the deduplication key.
    #[serde(default, deserialize_with = "nullable")]
    pub source: String,

    /// Field documentation.
    #[serde(default, deserialize_with = "nullable")]
    pub comment: String,

    /// Whether the column accepts null.
    #[serde(default, deserialize_with = "nullable")]
    pub nullable: bool,

    /// Keys not modeled above (`dict`, `defaultValue`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Column {
    /// Creates a column with an empty comment.
    #[must_use]
    pub fn new(
        property_name: impl Into<String>,
        column_type: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            column_type: column_type.into(),
            source: source.into(),
            ..Default::default()
        }
    }

    /// Sets the field documentation.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

/// Page query configuration: searchable column sources per match kind.
///
/// Entries are kept as raw JSON values; only string entries resolve.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQueryOp {
    /// Exact-match sources.
    #[serde(default, deserialize_with = "nullable")]
    pub field_eq: Vec<Value>,

    /// Substring-match sources.
    #[serde(default, deserialize_with = "nullable")]
    pub field_like: Vec<Value>,

    /// Sources searched by the keyword box.
    #[serde(default, deserialize_with = "nullable")]
    pub key_word_like_fields: Vec<Value>,
}

/// Searchable columns, resolved from [`PageQueryOp`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Search {
    /// Exact-match columns.
    #[serde(default, deserialize_with = "nullable")]
    pub field_eq: Vec<Column>,

    /// Substring-match columns.
    #[serde(default, deserialize_with = "nullable")]
    pub field_like: Vec<Column>,

    /// Keyword-searched columns.
    #[serde(default, deserialize_with = "nullable")]
    pub key_word_like_fields: Vec<Column>,
}

/// Cache-file form of an [`Entity`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    /// Route prefix.
    pub prefix: String,
    /// Type identifier.
    pub name: String,
    /// Method triples.
    pub api: Vec<MethodSummary>,
    /// Searchable columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<Search>,
}

/// Cache-file form of a [`Method`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSummary {
    /// Name override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// HTTP verb.
    pub method: String,
    /// Route suffix.
    pub path: String,
}
