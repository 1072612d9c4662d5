//! Flattener and `interface` → `type` rewrite for the cross-platform target.
//!
//! That platform's compiler rejects deeply nested inline object types, so
//! every `key: { ... }` inside the `Service` type is lifted into a named
//! `<Key>Interface` declaration and replaced by a reference to it.
//!
//! # Examples
//!
//! ```
//! use epsgen_codegen::flatten::flatten;
//!
//! let text = "export type Service = {\n\tbase: {\n\t\tuser: BaseUser;\n\t};\n}";
//! let flat = flatten(text).unwrap();
//!
//! assert!(flat.text.contains("export interface BaseInterface { user: BaseUser; }"));
//! assert!(flat.text.ends_with("export type Service = { base: BaseInterface; }"));
//! ```

use crate::brace::find_closing_brace;
use crate::naming::interface_name;
use crate::report::{Collision, CollisionKind};
use epsgen_core::{Error, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

/// Header that opens the block the flattener rewrites.
pub const SERVICE_HEADER: &str = "export type Service = {";

static NESTED_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_]+)\s*:\s*\{").expect("valid regex"));

static SEMICOLON_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r";+").expect("valid regex"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static INTERFACE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"interface\s+([A-Za-z0-9_]+)(\s*extends\s+[A-Za-z0-9_]+)?\s*\{([^}]*)\}")
        .expect("valid regex")
});

/// Flattener output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened {
    /// Rewritten text.
    pub text: String,
    /// Keys whose later shapes were dropped.
    pub collisions: Vec<Collision>,
}

/// Lifts nested object types out of the `Service` block.
///
/// Text before the header is kept verbatim. Newlines and tabs are removed
/// from the header onwards, and one interface is emitted per nested key;
/// the first shape registered for a key wins.
///
/// # Errors
///
/// Returns [`Error::MissingServiceBlock`] when the header is absent and
/// [`Error::UnbalancedBraces`] when a block never closes.
pub fn flatten(template: &str) -> Result<Flattened> {
    let start = template
        .find(SERVICE_HEADER)
        .ok_or(Error::MissingServiceBlock)?;
    let (header, service) = template.split_at(start);
    let service: String = service.chars().filter(|c| !matches!(c, '\n' | '\t')).collect();

    let body_start = SERVICE_HEADER.len();
    let body_end = find_closing_brace(&service, body_start)?;
    let inner = service[body_start..body_end].trim();

    let service_content = current_level(inner)?;

    let mut registry = IndexMap::new();
    let mut collisions = Vec::new();
    collect(inner, &mut registry, &mut collisions)?;

    let mut text = String::from(header);
    for (key, content) in &registry {
        text.push_str(&format!(
            "\nexport interface {} {{ {content} }}\n",
            interface_name(key)
        ));
    }
    text.push_str(&format!("\nexport type Service = {{ {service_content} }}"));

    Ok(Flattened { text, collisions })
}

/// Registers every nested object under `content`, at any depth.
fn collect(
    content: &str,
    registry: &mut IndexMap<String, String>,
    collisions: &mut Vec<Collision>,
) -> Result<()> {
    for caps in NESTED_OBJECT.captures_iter(content) {
        let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let start = whole.end();
        let end = find_closing_brace(content, start)?;
        if end <= start {
            continue;
        }

        let inner = content[start..end].trim();
        let level = current_level(inner)?;
        let key = key.as_str();

        match registry.get(key) {
            None => {
                registry.insert(key.to_string(), level);
            }
            Some(existing) if *existing != level => {
                let detail = format!("dropped shape {{ {level} }}");
                if !collisions.iter().any(|c| c.name == key && c.detail == detail) {
                    warn!("flatten: '{}' already registered with another shape", key);
                    collisions.push(Collision::new(CollisionKind::FlattenKey, key, detail));
                }
            }
            Some(_) => {}
        }

        collect(inner, registry, collisions)?;
    }
    Ok(())
}

/// Replaces each directly nested object with a reference to its interface
/// and normalizes separators to `; `.
fn current_level(content: &str) -> Result<String> {
    let mut result = content.to_string();

    for caps in NESTED_OBJECT.captures_iter(content) {
        let (Some(whole), Some(key)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let start = whole.end();
        let end = find_closing_brace(content, start)?;
        if end > start {
            let full = &content[whole.start()..=end];
            let replacement = format!("{}: {};", key.as_str(), interface_name(key.as_str()));
            result = result.replacen(full, &replacement, 1);
        }
    }

    let result = SEMICOLON_RUN.replace_all(&result, "; ");
    Ok(WHITESPACE_RUN.replace_all(&result, " ").trim().to_string())
}

/// Rewrites `interface Name [extends Base] { ... }` as
/// `type Name [extends Base] = { ... }`.
///
/// Bodies must not contain `}`; declarations that do are rewritten up to
/// their first `}`, which keeps the surrounding text intact.
///
/// # Examples
///
/// ```
/// use epsgen_codegen::flatten::interface_to_type;
///
/// assert_eq!(
///     interface_to_type("export interface User { age?: number; }"),
///     "export type User = { age?: number; }"
/// );
/// ```
#[must_use]
pub fn interface_to_type(code: &str) -> String {
    INTERFACE_DECL
        .replace_all(code, "type ${1}${2} = {${3}}")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "export interface User { age?: number; }\n\
        export type Service = {\n\
        \tbase: {\n\
        \t\tsys: {\n\
        \t\t\tuser: BaseSysUser;\n\
        \t\t\tmenu: BaseSysMenu;\n\
        \t\t};\n\
        \t\tcomm: BaseComm;\n\
        \t};\n\
        \tdemo: DemoGoods;\n\
        }";

    #[test]
    fn test_lifts_nested_objects() {
        let flat = flatten(SAMPLE).unwrap();

        assert!(flat.text.starts_with("export interface User { age?: number; }\n"));
        assert!(
            flat.text
                .contains("export interface BaseInterface { sys: SysInterface; comm: BaseComm; }")
        );
        assert!(
            flat.text
                .contains("export interface SysInterface { user: BaseSysUser; menu: BaseSysMenu; }")
        );
        assert!(
            flat.text
                .ends_with("export type Service = { base: BaseInterface; demo: DemoGoods; }")
        );
        assert!(flat.collisions.is_empty());
    }

    #[test]
    fn test_missing_service_block() {
        let err = flatten("export interface A {}").unwrap_err();
        assert!(matches!(err, Error::MissingServiceBlock));
    }

    #[test]
    fn test_unbalanced_service_block() {
        let err = flatten("export type Service = { a: {").unwrap_err();
        assert!(err.is_unbalanced_braces());
    }

    #[test]
    fn test_idempotent_on_flat_output() {
        let once = flatten(SAMPLE).unwrap().text;
        let twice = flatten(&once).unwrap().text;

        let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(normalize(&once), normalize(&twice));
    }

    #[test]
    fn test_first_shape_wins() {
        let text = "export type Service = {\
            a: { info: { x: X; }; };\
            b: { info: { y: Y; }; };\
        }";
        let flat = flatten(text).unwrap();

        assert!(flat.text.contains("export interface InfoInterface { x: X; }"));
        assert!(!flat.text.contains("y: Y;"));
        assert_eq!(flat.collisions.len(), 1);
        assert_eq!(flat.collisions[0].kind, CollisionKind::FlattenKey);
        assert_eq!(flat.collisions[0].name, "info");
    }

    #[test]
    fn test_empty_nested_object_kept_inline() {
        let flat = flatten("export type Service = { a: {}; b: B; }").unwrap();
        assert!(flat.text.ends_with("export type Service = { a: {}; b: B; }"));
    }

    #[test]
    fn test_interface_to_type_with_extends() {
        assert_eq!(
            interface_to_type("interface A extends B {\n\tx: string;\n}"),
            "type A extends B = {\n\tx: string;\n}"
        );
    }

    #[test]
    fn test_interface_to_type_skips_generics() {
        let text = "export interface PageResponse<T> { list: T[]; }";
        assert_eq!(interface_to_type(text), text);
    }
}
