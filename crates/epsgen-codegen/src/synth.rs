//! Type Synthesizer.
//!
//! Two passes over the entity list and the namespace tree:
//!
//! - **Entities**: one interface per unique formatted entity name, with a
//!   field per merged column and a catch-all index signature.
//! - **Controllers**: one interface per tree leaf, one method signature per
//!   API method, plus the nested `Service` chain that ties them together.
//!
//! The default target wraps the result in `declare namespace Eps { }`. The
//! cross-platform target exports every declaration, omits index signatures
//! and request bindings, then runs the [`flatten`](crate::flatten::flatten)
//! and [`interface_to_type`](crate::flatten::interface_to_type) rewrites.
//!
//! # Examples
//!
//! ```
//! use epsgen_codegen::synth::TypeSynthesizer;
//! use epsgen_codegen::tree::NamespaceTree;
//! use epsgen_codegen::mapping::TypeMapper;
//! use epsgen_core::Target;
//! use epsgen_schema::{Column, Entity};
//!
//! let user = Entity {
//!     prefix: "/admin/base/user".to_string(),
//!     name: "User".to_string(),
//!     columns: vec![Column::new("age", "int", "age").with_comment("age")],
//!     ..Default::default()
//! };
//! let entities = vec![user];
//! let tree = NamespaceTree::build(&entities, "admin");
//!
//! let synth = TypeSynthesizer::new(Target::Admin, TypeMapper::default()).unwrap();
//! let out = synth.synthesize(&entities, &tree, None).unwrap();
//!
//! assert!(out.text.starts_with("declare namespace Eps {"));
//! assert!(out.text.contains("age?: number;"));
//! assert!(out.text.contains("[key: string]: any;"));
//! ```

use crate::flatten::{flatten, interface_to_type};
use crate::mapping::TypeMapper;
use crate::naming::{first_upper_case, format_name, is_lawful_name, to_camel};
use crate::report::{Collision, CollisionKind};
use crate::template_engine::TemplateEngine;
use crate::tree::{NamespaceTree, Node};
use epsgen_core::{Result, Target};
use epsgen_schema::{Entity, Method};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Synthesized declaration text plus the names dropped on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synthesized {
    /// Declaration source, unformatted.
    pub text: String,
    /// Dropped names.
    pub collisions: Vec<Collision>,
}

#[derive(Debug, Serialize)]
struct FieldDecl {
    name: String,
    ts_type: String,
    comment: String,
}

#[derive(Debug, Serialize)]
struct EntityDecl<'a> {
    export_kw: &'a str,
    name: String,
    fields: Vec<FieldDecl>,
    index_signature: bool,
}

#[derive(Debug, Serialize)]
struct ParamDecl {
    name: String,
    optional: bool,
    ts_type: String,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct MethodDecl {
    name: String,
    summary: String,
    params: Vec<ParamDecl>,
    returns: String,
}

#[derive(Debug, Serialize)]
struct ControllerDecl<'a> {
    export_kw: &'a str,
    name: String,
    methods: Vec<MethodDecl>,
    with_permissions: bool,
    permissions: Vec<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct PageResponseDecl {
    name: String,
    entity: String,
}

#[derive(Debug, Serialize)]
struct DeclarationContext<'a> {
    export_kw: &'a str,
    entities: String,
    dict_key: Option<String>,
    index_signature: bool,
    page_responses: Vec<PageResponseDecl>,
    controllers: String,
    request_binding: bool,
    chain: String,
}

#[derive(Debug, Default)]
struct ControllerPass {
    controllers: String,
    chain: String,
    page_responses: Vec<PageResponseDecl>,
}

/// Keeps generated doc comments on one line and closed only where intended.
fn doc_text(text: &str) -> String {
    text.replace("*/", "*\\/")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Right-hand side of the `DictKey` alias.
///
/// # Examples
///
/// ```
/// use epsgen_codegen::synth::dict_key_union;
///
/// assert_eq!(dict_key_union(&[]), "string");
/// assert_eq!(
///     dict_key_union(&["brand".to_string(), "color".to_string()]),
///     r#""brand" | "color""#
/// );
/// ```
#[must_use]
pub fn dict_key_union(keys: &[String]) -> String {
    if keys.is_empty() {
        return "string".to_string();
    }
    keys.iter()
        .map(|key| serde_json::Value::from(key.as_str()).to_string())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Declaration synthesizer for one target.
#[derive(Debug)]
pub struct TypeSynthesizer {
    target: Target,
    mapper: TypeMapper,
    engine: TemplateEngine<'static>,
}

impl TypeSynthesizer {
    /// Creates a synthesizer.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in templates fail to register.
    pub fn new(target: Target, mapper: TypeMapper) -> Result<Self> {
        Ok(Self {
            target,
            mapper,
            engine: TemplateEngine::new()?,
        })
    }

    const fn export_kw(&self) -> &'static str {
        if self.target.is_cross_platform() {
            "export "
        } else {
            ""
        }
    }

    /// Synthesizes the declaration file contents.
    ///
    /// `dict_keys` is `None` when the dictionary could not be fetched, which
    /// omits the `DictKey` alias entirely.
    ///
    /// # Errors
    ///
    /// Returns a template error if rendering fails, and
    /// [`epsgen_core::Error::UnbalancedBraces`] or
    /// [`epsgen_core::Error::MissingServiceBlock`] from the cross-platform
    /// flattening step.
    pub fn synthesize(
        &self,
        entities: &[Entity],
        tree: &NamespaceTree,
        dict_keys: Option<&[String]>,
    ) -> Result<Synthesized> {
        let mut collisions = Vec::new();
        let cross_platform = self.target.is_cross_platform();

        let entity_text = self.entities(entities, &mut collisions)?;

        let mut pass = ControllerPass::default();
        self.walk(tree.roots(), "", entities, &mut pass, &mut collisions)?;

        let context = DeclarationContext {
            export_kw: self.export_kw(),
            entities: entity_text,
            dict_key: dict_keys.map(dict_key_union),
            index_signature: !cross_platform,
            page_responses: pass.page_responses,
            controllers: pass.controllers,
            request_binding: !cross_platform,
            chain: pass.chain,
        };
        let text = self.engine.render("eps/declaration", &context)?;

        let text = if cross_platform {
            let flattened = flatten(&text)?;
            collisions.extend(flattened.collisions);
            interface_to_type(&flattened.text)
        } else {
            format!("declare namespace Eps {{\n{text}\n}}\n")
        };

        Ok(Synthesized { text, collisions })
    }

    fn entities(&self, entities: &[Entity], collisions: &mut Vec<Collision>) -> Result<String> {
        let mut seen = HashSet::new();
        let mut text = String::new();

        for entity in entities {
            let name = format_name(&entity.name);
            if !is_lawful_name(&entity.name) || !is_lawful_name(&name) {
                if !entity.name.is_empty() {
                    debug!("entity name '{}' skipped", entity.name);
                    collisions.push(Collision::new(
                        CollisionKind::IllegalName,
                        &entity.name,
                        &entity.prefix,
                    ));
                }
                continue;
            }
            if !seen.insert(name.clone()) {
                warn!("duplicate entity name '{}' from {} dropped", name, entity.prefix);
                collisions.push(Collision::new(
                    CollisionKind::EntityName,
                    &name,
                    &entity.prefix,
                ));
                continue;
            }

            let fields = entity
                .merged_columns()
                .into_iter()
                .map(|column| FieldDecl {
                    name: column.property_name.clone(),
                    ts_type: self.mapper.map(&column.property_name, &column.column_type),
                    comment: doc_text(if column.comment.is_empty() {
                        &column.property_name
                    } else {
                        &column.comment
                    }),
                })
                .collect();

            let decl = EntityDecl {
                export_kw: self.export_kw(),
                name,
                fields,
                index_signature: !self.target.is_cross_platform(),
            };
            text.push_str(&self.engine.render("eps/entity", &decl)?);
            text.push('\n');
        }

        Ok(text)
    }

    fn walk(
        &self,
        nodes: &IndexMap<String, Node>,
        prefix: &str,
        entities: &[Entity],
        pass: &mut ControllerPass,
        collisions: &mut Vec<Collision>,
    ) -> Result<()> {
        for (key, node) in nodes {
            let key_name = format_name(key);
            let name = format!("{prefix}{}", to_camel(&first_upper_case(&key_name)));
            if !is_lawful_name(&name) {
                collisions.push(Collision::new(CollisionKind::IllegalName, &name, key));
                continue;
            }

            if let Some(namespace) = &node.namespace {
                let prefix_path = format!("/{namespace}");
                let Some(entity) = entities.iter().find(|e| e.prefix == prefix_path) else {
                    debug!("no entity for namespace '{}'", namespace);
                    continue;
                };
                let controller = self.controller(&name, entity, &mut pass.page_responses, collisions)?;
                pass.controllers.push_str(&controller);
                pass.controllers.push('\n');
                pass.chain.push_str(&format!("{key_name}: {name};\n"));
            } else {
                pass.chain.push_str(&format!("{key_name}: {{\n"));
                self.walk(&node.children, &name, entities, pass, collisions)?;
                pass.chain.push_str("};\n");
            }
        }
        Ok(())
    }

    fn controller(
        &self,
        name: &str,
        entity: &Entity,
        page_responses: &mut Vec<PageResponseDecl>,
        collisions: &mut Vec<Collision>,
    ) -> Result<String> {
        let entity_type = {
            let formatted = format_name(&entity.name);
            if is_lawful_name(&entity.name) && is_lawful_name(&formatted) {
                formatted
            } else {
                "any".to_string()
            }
        };

        let mut methods = Vec::new();
        let mut permissions: Vec<String> = Vec::new();

        for method in &entity.api {
            let method_name = to_camel(&format_name(method.display_name()));
            if !is_lawful_name(&method_name) {
                if !method_name.is_empty() {
                    collisions.push(Collision::new(
                        CollisionKind::IllegalName,
                        &method_name,
                        format!("{}{}", entity.prefix, method.path),
                    ));
                }
                continue;
            }

            let returns = match method.path.as_str() {
                "/page" => {
                    let response = PageResponseDecl {
                        name: format!("{name}PageResponse"),
                        entity: entity_type.clone(),
                    };
                    let response_name = response.name.clone();
                    if !page_responses.contains(&response) {
                        page_responses.push(response);
                    }
                    response_name
                }
                "/list" => format!("{entity_type}[]"),
                "/info" => entity_type.clone(),
                _ => "any".to_string(),
            };
            // Cross-platform declarations return untyped promises.
            let returns = if self.target.is_cross_platform() {
                "any".to_string()
            } else {
                returns
            };

            methods.push(MethodDecl {
                summary: doc_text(
                    method
                        .summary
                        .as_deref()
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or(&method_name),
                ),
                params: params(method),
                returns,
                name: method_name.clone(),
            });

            if !permissions.contains(&method_name) {
                permissions.push(method_name);
            }
        }

        let decl = ControllerDecl {
            export_kw: self.export_kw(),
            name: name.to_string(),
            methods,
            with_permissions: !self.target.is_cross_platform(),
            permissions,
        };
        self.engine.render("eps/controller", &decl)
    }
}

fn params(method: &Method) -> Vec<ParamDecl> {
    method
        .parameters()
        .iter()
        .filter(|p| is_lawful_name(&p.name))
        .map(|p| ParamDecl {
            name: p.name.clone(),
            optional: !p.required,
            ts_type: p
                .schema
                .value_type
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "string".to_string()),
            description: p
                .description
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .map(doc_text),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use epsgen_schema::{Column, Parameter, ParameterSchema};

    fn user_entity() -> Entity {
        let mut add = Method::new("post", "/add");
        add.summary = Some("Create user".to_string());
        add.dts.parameters = vec![
            Parameter {
                name: "username".to_string(),
                required: true,
                description: Some("Login name".to_string()),
                schema: ParameterSchema::default(),
            },
            Parameter {
                name: "age".to_string(),
                required: false,
                description: None,
                schema: ParameterSchema {
                    value_type: Some("number".to_string()),
                },
            },
            Parameter {
                name: "bad:name".to_string(),
                ..Default::default()
            },
        ];

        Entity {
            prefix: "/admin/base/sys/user".to_string(),
            name: "BaseSysUserEntity".to_string(),
            api: vec![
                add,
                Method::new("post", "/page"),
                Method::new("post", "/list"),
                Method::new("get", "/info"),
                Method::new("post", "/move"),
            ],
            columns: vec![
                Column::new("age", "int", "a.age").with_comment("Age"),
                Column::new("createTime", "datetime", "a.createTime"),
            ],
            page_columns: vec![Column::new("ageDup", "varchar", "a.age")],
            ..Default::default()
        }
    }

    fn synthesize(target: Target, entities: &[Entity], dict: Option<&[String]>) -> Synthesized {
        let tree = NamespaceTree::build(entities, target.platform_prefix().trim_start_matches('/'));
        TypeSynthesizer::new(target, TypeMapper::default())
            .unwrap()
            .synthesize(entities, &tree, dict)
            .unwrap()
    }

    #[test]
    fn test_entity_interface() {
        let out = synthesize(Target::Admin, &[user_entity()], None);

        assert!(out.text.contains("interface BaseSysUserEntity {"));
        assert!(out.text.contains("age?: number;"));
        assert!(out.text.contains("createTime?: Date;"));
        assert!(out.text.contains("* Age"));
        assert!(!out.text.contains("ageDup"));
        assert!(out.text.contains("[key: string]: any;"));
    }

    #[test]
    fn test_controller_signatures() {
        let out = synthesize(Target::Admin, &[user_entity()], None);

        assert!(out.text.contains("interface BaseSysUser {"));
        assert!(out.text.contains("* Create user"));
        assert!(out.text.contains("/** Login name */"));
        assert!(out.text.contains("username: string;"));
        assert!(out.text.contains("age?: number;"));
        assert!(!out.text.contains("bad:name"));
        assert!(out.text.contains("page(data?: any): Promise<BaseSysUserPageResponse>;"));
        assert!(out.text.contains("list(data?: any): Promise<BaseSysUserEntity[]>;"));
        assert!(out.text.contains("info(data?: any): Promise<BaseSysUserEntity>;"));
        assert!(out.text.contains("move(data?: any): Promise<any>;"));
        assert!(out.text.contains("interface BaseSysUserPageResponse {"));
        assert!(out.text.contains("list: BaseSysUserEntity[];"));
        assert!(out.text.contains("permission: { add: string; page: string;"));
        assert!(out.text.contains("request: Request;"));
    }

    #[test]
    fn test_service_chain_and_helpers() {
        let out = synthesize(Target::Admin, &[user_entity()], None);

        assert!(out.text.contains("type Service = {"));
        assert!(out.text.contains("base: {\nsys: {\nuser: BaseSysUser;\n};\n};"));
        assert!(out.text.contains("type json = any;"));
        assert!(out.text.contains("interface PagePagination {"));
        assert!(out.text.contains("interface PageResponse<T> {"));
        assert!(out.text.contains("type Request = (options: RequestOptions) => Promise<any>;"));
        assert!(!out.text.contains("DictKey"));
        assert!(!out.text.contains("export "));
    }

    #[test]
    fn test_dict_key_variants() {
        let keys = vec!["brand".to_string()];
        let out = synthesize(Target::Admin, &[user_entity()], Some(&keys));
        assert!(out.text.contains("type DictKey = \"brand\";"));

        let out = synthesize(Target::Admin, &[user_entity()], Some(&[]));
        assert!(out.text.contains("type DictKey = string;"));
    }

    #[test]
    fn test_duplicate_and_illegal_entity_names() {
        let mut duplicate = user_entity();
        duplicate.prefix = "/admin/base/sys/user2".to_string();
        duplicate.columns = vec![Column::new("other", "varchar", "other")];
        let illegal = Entity {
            prefix: "/admin/odd".to_string(),
            name: "Odd{Name}".to_string(),
            ..Default::default()
        };

        let out = synthesize(Target::Admin, &[user_entity(), duplicate, illegal], None);

        assert_eq!(out.text.matches("interface BaseSysUserEntity {").count(), 1);
        assert!(!out.text.contains("other?: string;"));
        let kinds: Vec<_> = out.collisions.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&CollisionKind::EntityName));
        assert!(kinds.contains(&CollisionKind::IllegalName));
    }

    #[test]
    fn test_cross_platform_output() {
        let app_user = Entity {
            prefix: "/app/user/info".to_string(),
            ..user_entity()
        };
        let out = synthesize(Target::UniappX, &[app_user], None);

        assert!(!out.text.contains("declare namespace"));
        assert!(!out.text.contains("[key: string]: any;"));
        assert!(!out.text.contains("permission"));
        assert!(!out.text.contains("request: Request;"));
        assert!(out.text.contains("export type BaseSysUserEntity = {"));
        assert!(out.text.contains("export type UserInterface = { info: UserInfo; }"));
        assert!(out.text.contains("export type Service = { user: UserInterface; }"));
        assert!(out.text.contains("info(data?: any): Promise<any>;"));
        assert!(!out.text.contains("Promise<BaseSysUserEntity>"));
    }

    #[test]
    fn test_empty_list() {
        let out = synthesize(Target::Admin, &[], None);
        assert!(out.text.contains("type Service = {"));
        assert!(out.collisions.is_empty());
    }

    #[test]
    fn test_doc_text_cannot_close_comment() {
        assert_eq!(doc_text("a */ b\n c"), "a *\\/ b c");
    }
}
