//! Runtime service object.
//!
//! Mirrors the namespace tree as a TypeScript object literal whose leaf
//! methods forward to a `request` function in scope. Each leaf is cast to
//! its controller type and each interior node to its flattened
//! `<Key>Interface`, so the literal type-checks against the cross-platform
//! declaration file.
//!
//! # Examples
//!
//! ```
//! use epsgen_codegen::service_code::ServiceCode;
//! use epsgen_codegen::tree::NamespaceTree;
//! use epsgen_schema::{Entity, Method};
//!
//! let entity = Entity {
//!     prefix: "/app/user/info".to_string(),
//!     name: "UserInfoEntity".to_string(),
//!     api: vec![Method::new("get", "/person")],
//!     ..Default::default()
//! };
//! let entities = vec![entity];
//! let tree = NamespaceTree::build(&entities, "app");
//!
//! let code = ServiceCode::build(&tree, &entities);
//! assert!(code.content.contains("url: \"/app/user/info/person\""));
//! assert!(code.content.contains("} as UserInfo,"));
//! assert_eq!(code.types, vec!["UserInfoEntity", "UserInfo", "UserInterface"]);
//! ```

use crate::naming::{first_upper_case, format_name, interface_name, is_lawful_name, to_camel};
use crate::tree::{NamespaceTree, Node};
use epsgen_schema::Entity;
use indexmap::IndexMap;
use serde::Serialize;

/// Runtime object source plus the type names it references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceCode {
    /// Object literal source, `{ ... }`.
    pub content: String,
    /// Referenced type names, first occurrence order, without duplicates.
    pub types: Vec<String>,
}

impl ServiceCode {
    /// Builds the object literal from the tree. A top-level or nested
    /// `swagger` key is skipped.
    #[must_use]
    pub fn build(tree: &NamespaceTree, entities: &[Entity]) -> Self {
        let mut builder = Builder {
            entities,
            chain: String::new(),
            types: Vec::new(),
        };
        builder.walk(tree.roots(), "");

        Self {
            content: format!("{{\n{}}}", builder.chain),
            types: builder.types,
        }
    }
}

struct Builder<'a> {
    entities: &'a [Entity],
    chain: String,
    types: Vec<String>,
}

impl Builder<'_> {
    fn push_type(&mut self, name: &str) {
        if !self.types.iter().any(|t| t == name) {
            self.types.push(name.to_string());
        }
    }

    fn walk(&mut self, nodes: &IndexMap<String, Node>, prefix: &str) {
        for (key, node) in nodes {
            if key == "swagger" {
                continue;
            }

            let key_name = format_name(key);
            let name = format!("{prefix}{}", to_camel(&first_upper_case(&key_name)));
            if !is_lawful_name(&name) {
                continue;
            }

            if let Some(namespace) = &node.namespace {
                let prefix_path = format!("/{namespace}");
                let Some(entity) = self.entities.iter().find(|e| e.prefix == prefix_path) else {
                    continue;
                };
                let body = self.leaf(entity, &prefix_path);
                self.chain
                    .push_str(&format!("{key_name}: {{\n{body}}} as {name},\n"));
                self.push_type(&name);
            } else {
                self.chain.push_str(&format!("{key_name}: {{\n"));
                self.walk(&node.children, &name);
                let interface = interface_name(key);
                self.chain.push_str(&format!("}} as {interface},\n"));
                self.push_type(&interface);
            }
        }
    }

    fn leaf(&mut self, entity: &Entity, prefix_path: &str) -> String {
        let mut body = String::new();

        for method in &entity.api {
            let method_name = to_camel(&format_name(method.display_name()));
            if !is_lawful_name(&method_name) {
                continue;
            }
            if !entity.name.is_empty() {
                self.push_type(&entity.name);
            }

            let summary = method
                .summary
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(&method_name);
            let verb = if method.method.is_empty() {
                "GET".to_string()
            } else {
                method.method.to_uppercase()
            };

            body.push_str(&format!(
                "/**\n * {summary}\n */\n\
                 {method_name}(data?: any): Promise<any> {{\n\
                 return request({{\n\
                 url: \"{prefix_path}{path}\",\n\
                 method: \"{verb}\",\n\
                 data,\n\
                 }});\n\
                 }},\n",
                path = method.path,
            ));
        }

        body
    }
}
