//! Schema Normalizer.
//!
//! Fetches the remote schema, falls back to the cached copy when the
//! backend is unreachable, and normalizes every entity: defaults are
//! filled in, `search` is derived from `pageQueryOp`, and client targets
//! drop entities outside the `/app` and `/admin` route trees.

use crate::cache::{CACHE_FILE_NAME, read_cache};
use crate::model::Entity;
use crate::response::ApiResponse;
use crate::transport::SchemaTransport;
use epsgen_core::{GeneratorConfig, Target};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where the entity list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaOrigin {
    /// Fresh from the backend.
    Remote,
    /// Cached copy; the backend was unreachable or returned nothing usable.
    Cache,
}

/// Normalized entity list plus its origin.
#[derive(Debug, Clone)]
pub struct FetchedSchema {
    /// Normalized entities.
    pub entities: Vec<Entity>,
    /// Where they came from.
    pub origin: SchemaOrigin,
}

/// Fetches and normalizes the entity list.
///
/// # Examples
///
/// ```no_run
/// use epsgen_core::GeneratorConfig;
/// use epsgen_schema::{HttpTransport, SchemaNormalizer, SchemaOrigin};
///
/// # async fn example() {
/// let normalizer = SchemaNormalizer::new(HttpTransport::new(), &GeneratorConfig::default());
/// let fetched = normalizer.fetch().await;
/// if fetched.origin == SchemaOrigin::Cache {
///     println!("backend down, using {} cached entities", fetched.entities.len());
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct SchemaNormalizer<T> {
    transport: T,
    url: String,
    target: Target,
    timeout: Duration,
    cache_path: PathBuf,
}

impl<T: SchemaTransport> SchemaNormalizer<T> {
    /// Creates a normalizer for the configured backend and output directory.
    #[must_use]
    pub fn new(transport: T, config: &GeneratorConfig) -> Self {
        Self {
            transport,
            url: config.schema_url(),
            target: config.target,
            timeout: config.request_timeout(),
            cache_path: config.dist_dir().join(CACHE_FILE_NAME),
        }
    }

    /// Schema URL requested by [`fetch`](Self::fetch).
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path of the cache file.
    #[must_use]
    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Loads the cache, then replaces it with the remote list when the
    /// backend answers with a success code, even if the payload is empty.
    ///
    /// Never fails: transport errors and non-success codes are logged and
    /// the cached list is used instead.
    pub async fn fetch(&self) -> FetchedSchema {
        let cached = read_cache(&self.cache_path).await;
        debug!("{} cached entities in {}", cached.len(), self.cache_path.display());

        let (entities, origin) = match self.fetch_remote().await {
            Some(remote) => (remote, SchemaOrigin::Remote),
            None => (cached, SchemaOrigin::Cache),
        };

        let entities = normalize(entities, self.target);
        info!("{} entities loaded ({:?})", entities.len(), origin);

        FetchedSchema { entities, origin }
    }

    async fn fetch_remote(&self) -> Option<Vec<Entity>> {
        let body = match self.transport.get_json(&self.url, self.timeout).await {
            Ok(body) => body,
            Err(e) => {
                warn!("API service is not running → {}", self.url);
                debug!("schema fetch failed: {}", e);
                return None;
            }
        };

        let response: ApiResponse = match serde_json::from_value(body) {
            Ok(response) => response,
            Err(e) => {
                warn!("unexpected schema response from {}: {}", self.url, e);
                return None;
            }
        };

        if !response.is_success() {
            warn!("{}", response.message_or_default());
            return None;
        }

        let entities = response.data.map(flatten_payload).unwrap_or_default();
        if entities.is_empty() {
            debug!("schema payload empty");
        }

        Some(entities)
    }
}

/// Flattens the grouped payload one level into an entity list.
///
/// The payload maps group names to entity arrays, read in the order the
/// backend sent them; an array payload is
/// accepted as-is. Elements that do not deserialize are skipped.
///
/// # Examples
///
/// ```
/// use epsgen_schema::normalizer::flatten_payload;
/// use serde_json::json;
///
/// let list = flatten_payload(json!({
///     "base": [{ "prefix": "/admin/base/sys/user" }],
///     "demo": [{ "prefix": "/admin/demo/goods" }]
/// }));
/// assert_eq!(list.len(), 2);
/// ```
#[must_use]
pub fn flatten_payload(data: Value) -> Vec<Entity> {
    let groups: Vec<Value> = match data {
        Value::Object(map) => map.into_iter().map(|(_, group)| group).collect(),
        Value::Array(items) => items,
        _ => Vec::new(),
    };

    let mut items = Vec::new();
    for group in groups {
        match group {
            Value::Array(entities) => items.extend(entities),
            Value::Null => {}
            other => items.push(other),
        }
    }

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Entity>(item) {
            Ok(entity) => Some(entity),
            Err(e) => {
                debug!("skipping malformed entity: {}", e);
                None
            }
        })
        .collect()
}

/// Fills defaults and applies the client-target route filter.
#[must_use]
pub fn normalize(entities: Vec<Entity>, target: Target) -> Vec<Entity> {
    entities
        .into_iter()
        .filter(|entity| {
            !target.is_client()
                || entity.prefix.starts_with("/app")
                || entity.prefix.starts_with("/admin")
        })
        .map(|mut entity| {
            entity.fill_search();
            entity
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_payload_object_groups() {
        let list = flatten_payload(json!({
            "a": [{ "prefix": "/admin/a", "name": "A" }],
            "b": [{ "prefix": "/admin/b", "name": "B" }],
        }));
        let names: Vec<_> = list.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_flatten_payload_keeps_response_order() {
        let list = flatten_payload(json!({
            "zeta": [{ "prefix": "/admin/zeta", "name": "Z" }],
            "alpha": [{ "prefix": "/admin/alpha", "name": "A" }],
            "mid": [
                { "prefix": "/admin/mid/b", "name": "M2" },
                { "prefix": "/admin/mid/a", "name": "M1" }
            ],
        }));
        let names: Vec<_> = list.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Z", "A", "M2", "M1"]);
    }

    #[test]
    fn test_flatten_payload_skips_malformed() {
        let list = flatten_payload(json!({
            "a": [{ "prefix": "/admin/a" }, 42, { "prefix": ["bad"] }],
            "b": null,
        }));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_flatten_payload_scalar() {
        assert!(flatten_payload(json!("nope")).is_empty());
    }

    #[test]
    fn test_normalize_client_filter() {
        let entities = vec![
            Entity {
                prefix: "/app/user/info".to_string(),
                ..Default::default()
            },
            Entity {
                prefix: "/admin/base/sys/user".to_string(),
                ..Default::default()
            },
            Entity {
                prefix: "/open/demo".to_string(),
                ..Default::default()
            },
        ];

        assert_eq!(normalize(entities.clone(), Target::Admin).len(), 3);
        assert_eq!(normalize(entities.clone(), Target::App).len(), 2);
        assert_eq!(normalize(entities, Target::UniappX).len(), 2);
    }

    #[test]
    fn test_normalize_derives_search() {
        let list = normalize(vec![Entity::default()], Target::Admin);
        assert_eq!(list[0].search, Some(crate::model::Search::default()));
    }
}
