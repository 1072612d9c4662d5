//! Namespace Tree Builder.
//!
//! Route prefixes such as `/admin/base/sys/user` become nested nodes keyed
//! by camel-cased path segments (`base` → `sys` → `user`). The last segment
//! is a leaf bound to the entity through `namespace`, carrying a permission
//! map, the entity's search groups and one entry per method.
//!
//! # Examples
//!
//! ```
//! use epsgen_codegen::tree::NamespaceTree;
//! use epsgen_schema::{Entity, Method};
//!
//! let entity = Entity {
//!     prefix: "/admin/base/sys-user".to_string(),
//!     api: vec![Method::new("post", "/page"), Method::new("post", "/export-excel")],
//!     ..Default::default()
//! };
//!
//! let tree = NamespaceTree::build(&[entity], "admin");
//! let leaf = tree.get(&["base", "sysUser"]).unwrap();
//!
//! assert_eq!(leaf.namespace.as_deref(), Some("admin/base/sys-user"));
//! assert!(leaf.methods.contains_key("page"));
//! assert!(!leaf.methods.contains_key("export-excel"));
//! ```

use crate::naming::to_camel;
use epsgen_schema::{Entity, Method, Search};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// One tree node. Interior nodes only have `children`; leaves have a
/// `namespace`.
///
/// A node can be both when one prefix is nested under another. Leaf data
/// then takes precedence in generated code.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Node {
    /// Entity prefix without the leading slash. Set on leaves only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Member name → colon-joined permission string.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub permission: IndexMap<String, String>,

    /// Search groups of the bound entity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<Search>,

    /// Methods keyed by their trailing path segment.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub methods: IndexMap<String, Method>,

    /// Child nodes keyed by camel-cased path segment.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, Self>,
}

impl Node {
    /// `true` when the node is bound to an entity.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.namespace.is_some()
    }

    /// Names currently attached to the node, excluding `namespace` and
    /// `permission`.
    fn member_names(&self) -> Vec<String> {
        let search = self.search.as_ref().map(|_| "search".to_string());
        search
            .into_iter()
            .chain(self.methods.keys().cloned())
            .chain(self.children.keys().cloned())
            .collect()
    }
}

/// Nested namespace tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NamespaceTree {
    roots: IndexMap<String, Node>,
}

impl NamespaceTree {
    /// Builds the tree.
    ///
    /// `namespace_id` (the first segment of the schema endpoint) is removed
    /// from each prefix once, wherever it first occurs, before the prefix
    /// is split. Entities sharing a leaf are merged into it; later methods
    /// replace earlier ones under the same key.
    #[must_use]
    pub fn build(entities: &[Entity], namespace_id: &str) -> Self {
        let mut tree = Self::default();
        for entity in entities {
            tree.insert(entity, namespace_id);
        }
        tree
    }

    fn insert(&mut self, entity: &Entity, namespace_id: &str) {
        let path = entity.prefix.strip_prefix('/').unwrap_or(&entity.prefix);
        let segments: Vec<String> = path
            .replacen(namespace_id, "", 1)
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(to_camel)
            .collect();

        let Some((last, parents)) = segments.split_last() else {
            debug!("prefix '{}' has no segments, skipped", entity.prefix);
            return;
        };

        let mut level = &mut self.roots;
        for segment in parents {
            level = &mut level.entry(segment.clone()).or_default().children;
        }
        let leaf = level.entry(last.clone()).or_default();

        let namespace = leaf.namespace.get_or_insert_with(|| path.to_string()).clone();
        let base = namespace.replacen(&format!("{namespace_id}/"), "", 1);
        for name in leaf.member_names() {
            let permission = format!("{base}/{name}").replace('/', ":");
            leaf.permission.insert(name, permission);
        }

        leaf.search.clone_from(&entity.search);

        for method in &entity.api {
            let key = method.path.rsplit('/').next().unwrap_or_default();
            if key.is_empty() || key.contains(['-', ':']) {
                debug!("method '{}' on '{}' not registered", method.path, entity.prefix);
                continue;
            }
            leaf.methods.insert(key.to_string(), method.clone());
        }
    }

    /// Top-level nodes.
    #[must_use]
    pub const fn roots(&self) -> &IndexMap<String, Node> {
        &self.roots
    }

    /// Node at a key path.
    #[must_use]
    pub fn get(&self, path: &[&str]) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.roots.get(*first)?, |node, key| node.children.get(*key))
    }

    /// `true` when no entity produced a node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
