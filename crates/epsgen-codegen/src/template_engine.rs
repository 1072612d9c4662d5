//! Template engine for declaration output using Handlebars.
//!
//! Output is TypeScript, so HTML escaping is disabled: `<`, `>` and quotes
//! in types and comments must come through verbatim.
//!
//! # Examples
//!
//! ```
//! use epsgen_codegen::template_engine::TemplateEngine;
//! use serde_json::json;
//!
//! let engine = TemplateEngine::new().unwrap();
//! let text = engine
//!     .render(
//!         "eps/entity",
//!         &json!({
//!             "export_kw": "",
//!             "name": "User",
//!             "fields": [{ "name": "age", "ts_type": "number", "comment": "Age" }],
//!             "index_signature": true
//!         }),
//!     )
//!     .unwrap();
//!
//! assert!(text.contains("age?: number;"));
//! ```

use epsgen_core::{Error, Result};
use handlebars::Handlebars;
use serde::Serialize;

const TEMPLATES: [(&str, &str); 3] = [
    ("eps/entity", include_str!("../templates/entity.ts.hbs")),
    ("eps/controller", include_str!("../templates/controller.ts.hbs")),
    (
        "eps/declaration",
        include_str!("../templates/declaration.ts.hbs"),
    ),
];

/// Template engine for declaration output.
///
/// This type is `Send` and `Sync`.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl TemplateEngine<'_> {
    /// Creates an engine with the built-in templates registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if a built-in template fails to
    /// parse.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        let mut engine = Self { handlebars };
        for (name, template) in TEMPLATES {
            engine.register_template_string(name, template)?;
        }
        Ok(engine)
    }

    /// Renders a registered template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if the template is unknown, the
    /// context does not serialize, or a referenced field is missing.
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::TemplateError {
                message: format!("rendering '{template_name}' failed: {e}"),
            })
    }

    /// Registers an additional template, replacing any with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if the template does not parse.
    pub fn register_template_string(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| Error::TemplateError {
                message: format!("failed to register template '{name}': {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_engine_creation() {
        assert!(TemplateEngine::new().is_ok());
    }

    #[test]
    fn test_no_html_escaping() {
        let mut engine = TemplateEngine::new().unwrap();
        engine
            .register_template_string("raw", "Promise<{{t}}>")
            .unwrap();
        let text = engine.render("raw", &json!({"t": "Array<\"x\">"})).unwrap();
        assert_eq!(text, "Promise<Array<\"x\">>");
    }

    #[test]
    fn test_strict_mode_fails_on_missing_variable() {
        let engine = TemplateEngine::new().unwrap();
        let err = engine.render("eps/entity", &json!({"name": "X"})).unwrap_err();
        assert!(matches!(err, Error::TemplateError { .. }));
    }

    #[test]
    fn test_controller_template() {
        let engine = TemplateEngine::new().unwrap();
        let text = engine
            .render(
                "eps/controller",
                &json!({
                    "export_kw": "",
                    "name": "BaseSysUser",
                    "methods": [{
                        "name": "add",
                        "summary": "Create",
                        "params": [
                            { "name": "id", "optional": false, "ts_type": "number", "description": "Key" },
                            { "name": "note", "optional": true, "ts_type": "string", "description": null }
                        ],
                        "returns": "any"
                    }, {
                        "name": "list",
                        "summary": "list",
                        "params": [],
                        "returns": "BaseSysUserEntity[]"
                    }],
                    "with_permissions": true,
                    "permissions": ["add", "list"]
                }),
            )
            .unwrap();

        assert!(text.contains("interface BaseSysUser {"));
        assert!(text.contains("/** Key */"));
        assert!(text.contains("id: number;"));
        assert!(text.contains("note?: string;"));
        assert!(text.contains("list(data?: any): Promise<BaseSysUserEntity[]>;"));
        assert!(text.contains("permission: { add: string; list: string; "));
        assert!(text.contains("_permission: { add: boolean; list: boolean; "));
        assert!(text.contains("request: Request;"));
    }

    #[test]
    fn test_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TemplateEngine<'_>>();
    }
}
