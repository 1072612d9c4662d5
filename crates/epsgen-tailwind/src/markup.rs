//! Markup rewriting for cross-platform pages.
//!
//! Every tag in the page templates gets its Tailwind class names replaced
//! with selector-safe forms. Dark-variant classes move into a `:class`
//! binding keyed on `__isDark`, and `<text>` tags receive the configured
//! dark text color.

use crate::Transformed;
use crate::classify::is_tailwind_class;
use crate::extract::{class_contents, class_names};
use crate::safe_class::to_safe_class;
use crate::template::{add_script_content, template_nodes};
use epsgen_core::TailwindConfig;
use tracing::debug;

const DARK_IMPORT: &str = "import { isDark as __isDark } from '@/cool';";
const SCRIPT_STUB: &str = "\n<script lang=\"ts\" setup></script>";
const EMPTY_BINDING: &str = " :class=\"{}\"";
const DARK_PREFIX: &str = "dark-colon-";

/// Rewrites class names in `.uvue` page templates.
#[derive(Debug, Clone)]
pub struct MarkupTransformer {
    dark_text_class: String,
    safe_dark_text_class: String,
}

impl MarkupTransformer {
    /// Creates a transformer from the Tailwind settings.
    #[must_use]
    pub fn new(config: &TailwindConfig) -> Self {
        Self {
            dark_text_class: config.dark_text_class.clone(),
            safe_dark_text_class: to_safe_class(&config.dark_text_class),
        }
    }

    /// `true` for module ids this transformer handles.
    ///
    /// # Examples
    ///
    /// ```
    /// use epsgen_tailwind::MarkupTransformer;
    ///
    /// assert!(MarkupTransformer::applies_to("/src/pages/index.uvue"));
    /// assert!(MarkupTransformer::applies_to("/src/pages/index.uvue?type=page"));
    /// assert!(!MarkupTransformer::applies_to("/src/App.vue"));
    /// ```
    #[must_use]
    pub fn applies_to(id: &str) -> bool {
        id.ends_with(".uvue") || id.contains(".uvue?type=page")
    }

    /// Rewrites `code`, or returns `None` when nothing changed.
    #[must_use]
    pub fn transform(&self, code: &str) -> Option<Transformed> {
        let nodes = template_nodes(code);
        if nodes.is_empty() {
            return None;
        }

        let mut out = String::with_capacity(code.len() + code.len() / 4);
        let mut last = 0;
        for node in nodes {
            if node.text.starts_with("<!--") {
                continue;
            }
            out.push_str(&code[last..node.start]);
            out.push_str(&self.transform_node(node.text));
            last = node.end();
        }
        out.push_str(&code[last..]);

        let mut out = out
            .replace(EMPTY_BINDING, "")
            .replace(":class=\"{}\"", "")
            .replace("class=\"\"", "")
            .replace("class=\" \"", "");

        if out == code {
            return None;
        }

        if out.contains("__isDark") && !out.contains(DARK_IMPORT) {
            if !out.contains("<script") {
                out.push_str(SCRIPT_STUB);
            }
            if let Some(with_import) = add_script_content(&out, DARK_IMPORT) {
                out = with_import;
            }
        }

        Some(Transformed::new(out))
    }

    fn transform_node(&self, node: &str) -> String {
        let mut node = node.to_string();

        if is_text_tag(&node)
            && !node.contains(&self.dark_text_class)
            && !node.contains(&self.safe_dark_text_class)
        {
            node = self.add_dark_text_class(&node);
        }

        let mut names: Vec<String> = class_names(&node)
            .into_iter()
            .filter(|name| is_tailwind_class(name))
            .collect();
        names.sort_by_key(|name| std::cmp::Reverse(name.len()));

        let mut converted = Vec::with_capacity(names.len());
        for name in &names {
            let safe = to_safe_class(name);
            if safe != *name {
                node = node.replace(name.as_str(), &safe);
            }
            converted.push(safe);
        }

        if !node.contains(":class=") {
            node = insert_before_close(&node, EMPTY_BINDING);
        }

        let dark_names: Vec<&String> = converted
            .iter()
            .filter(|name| name.starts_with(DARK_PREFIX))
            .collect();
        if dark_names.is_empty() {
            return node;
        }

        for name in &dark_names {
            node = node.replace(name.as_str(), "");
        }
        let dark_entries = dark_names
            .iter()
            .map(|name| format!("'{name}': __isDark"))
            .collect::<Vec<_>>()
            .join(",");
        debug!(classes = %dark_entries, "binding dark classes");

        let contents = class_contents(&node);
        if let Some(object) = contents
            .iter()
            .find(|c| c.starts_with('{') && c.ends_with('}'))
        {
            let bound = format!("{{{dark_entries},{}", &object[1..]);
            node = node.replace(object.as_str(), &bound);
        }
        if let Some(array) = contents
            .iter()
            .find(|c| c.starts_with('[') && c.ends_with(']'))
        {
            let bound = format!("[{{{dark_entries}}},{}", &array[1..]);
            node = node.replace(array.as_str(), &bound);
        }

        node
    }

    /// Adds the dark text class to the static `class` attribute, creating
    /// one when the tag has none.
    fn add_dark_text_class(&self, node: &str) -> String {
        match static_class_value_start(node) {
            Some(at) => format!("{}{} {}", &node[..at], self.dark_text_class, &node[at..]),
            None => format!(
                "<text class=\"{}\"{}",
                self.dark_text_class,
                &node["<text".len()..]
            ),
        }
    }
}

fn is_text_tag(node: &str) -> bool {
    node.strip_prefix("<text")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_whitespace() || c == '>' || c == '/')
}

/// Byte offset just inside the opening quote of a plain `class` attribute.
fn static_class_value_start(node: &str) -> Option<usize> {
    node.match_indices("class=").find_map(|(at, _)| {
        let preceded_by_space = node[..at].ends_with(char::is_whitespace);
        let quoted = matches!(node.as_bytes().get(at + 6), Some(b'"' | b'\''));
        (preceded_by_space && quoted).then_some(at + 7)
    })
}

fn insert_before_close(node: &str, attribute: &str) -> String {
    if let Some(head) = node.strip_suffix("/>") {
        format!("{head}{attribute}/>")
    } else if let Some(head) = node.strip_suffix('>') {
        format!("{head}{attribute}>")
    } else {
        node.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transformer() -> MarkupTransformer {
        MarkupTransformer::new(&TailwindConfig::default())
    }

    #[test]
    fn test_dark_classes_bound() {
        let code = "<template>\n\t<view class=\"p-2 dark:bg-black\">\n\t</view>\n</template>\n<script setup lang=\"ts\">\nconst a = 1;\n</script>";
        let out = transformer().transform(code).unwrap().code;
        assert!(
            out.contains("<view class=\"p-2 \" :class=\"{'dark-colon-bg-black': __isDark,}\">"),
            "{out}"
        );
        assert!(out.contains(
            "<script setup lang=\"ts\">\nimport { isDark as __isDark } from '@/cool';\nconst a = 1;</script>"
        ));
    }

    #[test]
    fn test_text_gets_dark_color() {
        let code = "<template><text>Hi</text></template>";
        let out = transformer().transform(code).unwrap().code;
        assert!(
            out.contains("<text  :class=\"{'dark-colon-text-surface-50': __isDark,}\">Hi</text>"),
            "{out}"
        );
        assert!(out.ends_with(
            "<script lang=\"ts\" setup>\nimport { isDark as __isDark } from '@/cool';\n</script>"
        ));
    }

    #[test]
    fn test_text_with_existing_class() {
        let node = transformer().add_dark_text_class("<text class=\"a\">");
        assert_eq!(node, "<text class=\"dark:text-surface-50 a\">");
        let node = transformer().add_dark_text_class("<text :class=\"b\">");
        assert_eq!(node, "<text class=\"dark:text-surface-50\" :class=\"b\">");
    }

    #[test]
    fn test_textarea_is_not_text() {
        assert!(!is_text_tag("<textarea>"));
        assert!(is_text_tag("<text>"));
        assert!(is_text_tag("<text\n  class=\"a\">"));
    }

    #[test]
    fn test_self_closing_tag() {
        let code = "<template><input class=\"w-1/2\" /></template>";
        let out = transformer().transform(code).unwrap().code;
        assert_eq!(out, "<template><input class=\"w-1-slash-2\" /></template>");
    }

    #[test]
    fn test_array_binding() {
        let code = "<template><view class=\"dark:text-white\" :class=\"['a', b]\"></view></template>";
        let out = transformer().transform(code).unwrap().code;
        assert!(
            out.contains(":class=\"[{'dark-colon-text-white': __isDark},'a', b]\""),
            "{out}"
        );
    }

    #[test]
    fn test_longer_names_replaced_first() {
        let code = "<template><view class=\"w-1/2 md:w-1/2\"></view></template>";
        let out = transformer().transform(code).unwrap().code;
        assert!(out.contains("class=\"w-1-slash-2 md-colon-w-1-slash-2\""), "{out}");
    }

    #[test]
    fn test_unchanged_returns_none() {
        let code = "<template><view class=\"card\"><image src=\"a.png\" /></view></template>";
        assert!(transformer().transform(code).is_none());
        assert!(transformer().transform("<script>const a = 1;</script>").is_none());
    }

    #[test]
    fn test_comments_untouched() {
        let code = "<template><!-- <text> --><view class=\"card\"></view></template>";
        assert!(transformer().transform(code).is_none());
    }
}
