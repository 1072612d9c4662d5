//! Single-file component scanning: template tags and the script block.

use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<([^>]+)>").expect("valid regex"));

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<script\b[^>]*>(.*?)</script>").expect("valid regex")
});

const TEMPLATE_OPEN: &str = "<template";
const TEMPLATE_CLOSE: &str = "</template>";

/// One opening or self-closing tag inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateNode<'a> {
    /// Byte offset of `<` in the scanned source.
    pub start: usize,
    /// Tag text including `<` and `>`.
    pub text: &'a str,
}

impl TemplateNode<'_> {
    /// Byte offset just past `>`.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Content ranges of the top-level `<template>` blocks in `code`.
///
/// Nested templates are matched with a counter, so a block ends at its own
/// `</template>`. An opening tag without a match is skipped.
fn template_ranges(code: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut index = 0;

    while let Some(open) = code[index..].find(TEMPLATE_OPEN).map(|i| i + index) {
        let Some(tag_end) = code[open..].find('>').map(|i| i + open) else {
            break;
        };

        let mut depth = 1;
        let mut cursor = tag_end + 1;
        while depth > 0 {
            let Some(next_close) = code[cursor..].find(TEMPLATE_CLOSE).map(|i| i + cursor) else {
                break;
            };
            let next_open = code[cursor..].find(TEMPLATE_OPEN).map(|i| i + cursor);

            match next_open {
                Some(nested) if nested < next_close => {
                    let Some(nested_end) = code[nested..].find('>') else {
                        break;
                    };
                    depth += 1;
                    cursor = nested + nested_end + 1;
                }
                _ => {
                    depth -= 1;
                    cursor = next_close + TEMPLATE_CLOSE.len();
                }
            }
        }

        if depth == 0 {
            ranges.push((tag_end + 1, cursor - TEMPLATE_CLOSE.len()));
            index = cursor;
        } else {
            index = tag_end + 1;
        }
    }

    ranges
}

/// Opening and self-closing tags of every template block, in document
/// order. Closing tags and `<template>` tags themselves are left out.
///
/// # Examples
///
/// ```
/// use epsgen_tailwind::template::template_nodes;
///
/// let code = r#"<template><view class="a"><text>x</text></view></template>"#;
/// let nodes: Vec<_> = template_nodes(code).iter().map(|n| n.text).collect();
/// assert_eq!(nodes, vec![r#"<view class="a">"#, "<text>"]);
/// ```
#[must_use]
pub fn template_nodes(code: &str) -> Vec<TemplateNode<'_>> {
    let mut nodes = Vec::new();

    for (start, end) in template_ranges(code) {
        for caps in TAG.captures_iter(&code[start..end]) {
            let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let inner = inner.as_str();
            if inner.starts_with('/') || inner.starts_with("template") {
                continue;
            }
            nodes.push(TemplateNode {
                start: start + whole.start(),
                text: &code[start + whole.start()..start + whole.end()],
            });
        }
    }

    nodes
}

/// Prepends `content` to the first `<script>` block.
///
/// Returns `None` when the source has no script block.
///
/// # Examples
///
/// ```
/// use epsgen_tailwind::template::add_script_content;
///
/// let code = "<script setup>\nconst a = 1;\n</script>";
/// assert_eq!(
///     add_script_content(code, "import x from 'x';").unwrap(),
///     "<script setup>\nimport x from 'x';\nconst a = 1;</script>"
/// );
/// ```
#[must_use]
pub fn add_script_content(code: &str, content: &str) -> Option<String> {
    let caps = SCRIPT_BLOCK.captures(code)?;
    let body = caps.get(1)?;

    Some(format!(
        "{}\n{content}\n{}{}",
        &code[..body.start()],
        body.as_str().trim(),
        &code[body.end()..]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_templates() {
        let code = "<template>\n<view>\n<template v-if=\"a\"><text>a</text></template>\n</view>\n</template>";
        let nodes: Vec<_> = template_nodes(code).iter().map(|n| n.text).collect();
        assert_eq!(nodes, vec!["<view>", "<text>"]);
    }

    #[test]
    fn test_offsets_point_into_source() {
        let code = "<script></script>\n<template><image src=\"a\" /></template>";
        let node = template_nodes(code)[0];
        assert_eq!(&code[node.start..node.end()], "<image src=\"a\" />");
    }

    #[test]
    fn test_tags_outside_templates_ignored() {
        let code = "<style>.a{}</style><template><view></view></template><script>let b = '<view>';</script>";
        assert_eq!(template_nodes(code).len(), 1);
    }

    #[test]
    fn test_unclosed_template_skipped() {
        assert!(template_nodes("<template><view>").is_empty());
    }

    #[test]
    fn test_comments_are_nodes() {
        let code = "<template><!-- note --><view/></template>";
        let nodes: Vec<_> = template_nodes(code).iter().map(|n| n.text).collect();
        assert_eq!(nodes, vec!["<!-- note -->", "<view/>"]);
    }

    #[test]
    fn test_no_script_block() {
        assert!(add_script_content("<template></template>", "x").is_none());
    }
}
