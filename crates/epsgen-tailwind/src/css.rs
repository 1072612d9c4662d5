//! Stylesheet rewriting for the cross-platform style engine.
//!
//! Selectors go through [`to_safe_class`] so they match the rewritten
//! markup. Declarations are adapted to what the engine supports: `rem`
//! becomes `rpx`, Tailwind's `--tw-*` custom properties are inlined into
//! the declarations that read them, and unsupported properties are
//! dropped.
//!
//! The scanner understands rules, at-rules, comments and strings. Rules
//! whose selector and declarations come out unchanged are copied
//! verbatim, formatting included.
//!
//! # Examples
//!
//! ```
//! use epsgen_core::TailwindConfig;
//! use epsgen_tailwind::CssRewriter;
//!
//! let rewriter = CssRewriter::new(&TailwindConfig::default());
//! let out = rewriter.rewrite(".p-2 { padding: 0.5rem; }").unwrap();
//! assert_eq!(out.code, ".p-2 {\n\tpadding: 14rpx;\n}");
//! ```

use crate::Transformed;
use crate::safe_class::to_safe_class;
use epsgen_core::TailwindConfig;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::trace;

static REM_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?(?:[0-9]+\.?[0-9]*|\.[0-9]+))rem$").expect("valid regex")
});

static RGB_SLASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"rgb\(([0-9\s]+)/\s*([0-9.]+)\)").expect("valid regex")
});

/// Fragments Tailwind leaves behind when a transform variable is unset.
const NONE_TRANSFORMS: [&str; 6] = [
    "translate(none, none)",
    "rotate(none)",
    "skewX(none)",
    "skewY(none)",
    "scaleX(none)",
    "scaleY(none)",
];

const UNSUPPORTED_PROPERTIES: [&str; 3] = ["filter", "vertical-align", "visibility"];

/// Rewrites Tailwind output for the `uvue` style engine.
#[derive(Debug, Clone, Copy)]
pub struct CssRewriter {
    rem_unit: f64,
    rem_precision: u32,
    rpx_ratio: f64,
}

impl CssRewriter {
    /// Creates a rewriter from the Tailwind unit settings.
    #[must_use]
    pub const fn new(config: &TailwindConfig) -> Self {
        Self {
            rem_unit: config.rem_unit,
            rem_precision: config.rem_precision,
            rpx_ratio: config.rpx_ratio,
        }
    }

    /// Rewrites a stylesheet, or returns `None` when nothing changed.
    #[must_use]
    pub fn rewrite(&self, css: &str) -> Option<Transformed> {
        let mut out = String::with_capacity(css.len());
        self.rewrite_block(css, &mut out);
        (out != css).then(|| Transformed::new(out))
    }

    /// Converts a `rem` number (without unit) to an `rpx` length.
    ///
    /// The result keeps as many decimals as the input, or the configured
    /// precision when the input has none, with trailing zeros trimmed.
    ///
    /// # Examples
    ///
    /// ```
    /// use epsgen_core::TailwindConfig;
    /// use epsgen_tailwind::CssRewriter;
    ///
    /// let rewriter = CssRewriter::new(&TailwindConfig::default());
    /// assert_eq!(rewriter.rem_to_rpx("0.5"), "14rpx");
    /// assert_eq!(rewriter.rem_to_rpx("0.375"), "10.5rpx");
    /// assert_eq!(rewriter.rem_to_rpx("1"), "28rpx");
    /// ```
    #[must_use]
    pub fn rem_to_rpx(&self, number: &str) -> String {
        let decimals = number.split_once('.').map_or(0, |(_, frac)| frac.len());
        let precision = if decimals > 0 {
            decimals
        } else {
            self.rem_precision as usize
        };
        let value = number.parse::<f64>().unwrap_or_default() * self.rem_unit * self.rpx_ratio;

        let formatted = format!("{value:.precision$}");
        let trimmed = if formatted.contains('.') {
            formatted.trim_end_matches('0').trim_end_matches('.')
        } else {
            formatted.as_str()
        };
        format!("{trimmed}rpx")
    }

    fn rewrite_block(&self, text: &str, out: &mut String) {
        let bytes = text.as_bytes();
        let mut pos = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    i = comment_end(text, i);
                    if text[pos..i].trim_start().starts_with("/*") {
                        out.push_str(&text[pos..i]);
                        pos = i;
                    }
                }
                quote @ (b'"' | b'\'') => i = string_end(bytes, i, quote),
                b';' => {
                    out.push_str(&text[pos..=i]);
                    i += 1;
                    pos = i;
                }
                b'{' => {
                    let Some(close) = block_end(text, i + 1) else {
                        break;
                    };
                    self.rewrite_item(&text[pos..i], &text[i + 1..close], &text[pos..=close], out);
                    i = close + 1;
                    pos = i;
                }
                _ => i += 1,
            }
        }

        out.push_str(&text[pos..]);
    }

    fn rewrite_item(&self, prelude: &str, body: &str, raw: &str, out: &mut String) {
        let selector = prelude.trim();

        if selector.starts_with('@') {
            if body.contains('{') {
                out.push_str(prelude);
                out.push('{');
                self.rewrite_block(body, out);
                out.push('}');
            } else {
                out.push_str(raw);
            }
            return;
        }

        let lead = &prelude[..prelude.len() - prelude.trim_start().len()];
        let tail = &prelude[lead.len() + selector.len()..];
        let safe_selector = rewrite_selector(selector);

        match self.rewrite_declarations(&safe_selector, body) {
            Some(declarations) => {
                out.push_str(lead);
                out.push_str(&safe_selector);
                out.push_str(" {");
                out.push_str(&declarations);
                out.push('}');
            }
            None if safe_selector == selector => out.push_str(raw),
            None => {
                out.push_str(lead);
                out.push_str(&safe_selector);
                out.push_str(tail);
                out.push('{');
                out.push_str(body);
                out.push('}');
            }
        }
    }

    /// Rewritten declaration body, or `None` when every declaration is
    /// kept as is.
    fn rewrite_declarations(&self, selector: &str, body: &str) -> Option<String> {
        let mut tw_values = HashMap::new();
        let mut lines = Vec::new();
        let mut changed = false;

        for declaration in split_declarations(body) {
            let Some((prop, value)) = declaration.split_once(':') else {
                lines.push(declaration);
                continue;
            };
            let (prop, value) = (prop.trim(), value.trim());

            match self.rewrite_declaration(selector, prop, value, &mut tw_values) {
                Some((new_prop, new_value)) => {
                    changed |= new_prop != prop || new_value != value;
                    lines.push(format!("{new_prop}: {new_value}"));
                }
                None => {
                    trace!(selector, prop, "declaration removed");
                    changed = true;
                }
            }
        }

        changed.then(|| {
            let mut rendered: String = lines.iter().map(|line| format!("\n\t{line};")).collect();
            rendered.push('\n');
            rendered
        })
    }

    fn rewrite_declaration(
        &self,
        selector: &str,
        prop: &str,
        value: &str,
        tw_values: &mut HashMap<String, String>,
    ) -> Option<(String, String)> {
        if prop.contains("--tw-") {
            tw_values.insert(prop.to_string(), self.convert_units(value));
            return None;
        }
        if UNSUPPORTED_PROPERTIES.contains(&prop) {
            return None;
        }
        if selector == ".sticky" && (prop == "position" || value == "sticky") {
            return None;
        }

        let mut value = rgb_to_rgba(&substitute_tw_vars(&self.convert_units(value), tw_values));
        let mut prop = prop.to_string();

        if prop == "color" && value.contains("rpx") && selector.contains("text-") {
            prop = "font-size".to_string();
        }
        if prop == "flex" && value.starts_with('1') {
            value = "1".to_string();
        }

        Some((prop, strip_none_transforms(value)))
    }

    fn convert_units(&self, value: &str) -> String {
        if !value.contains("rem") {
            return value.to_string();
        }

        let mut out = String::with_capacity(value.len());
        let mut word_start = None;
        for (i, ch) in value.char_indices() {
            if is_value_separator(ch) {
                if let Some(start) = word_start.take() {
                    out.push_str(&self.convert_word(&value[start..i]));
                }
                out.push(ch);
            } else if word_start.is_none() {
                word_start = Some(i);
            }
        }
        if let Some(start) = word_start {
            out.push_str(&self.convert_word(&value[start..]));
        }
        out
    }

    fn convert_word(&self, word: &str) -> String {
        REM_WORD
            .captures(word)
            .and_then(|caps| caps.get(1))
            .map_or_else(|| word.to_string(), |number| self.rem_to_rpx(number.as_str()))
    }
}

const fn is_value_separator(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | ',' | '/' | '(' | ')')
}

/// Selector in safe form. Platform selectors are left alone.
fn rewrite_selector(selector: &str) -> String {
    if selector.contains("uni-") || selector.contains(".button-hover") {
        selector.to_string()
    } else {
        to_safe_class(selector)
    }
}

/// Replaces `var(--tw-*)` references with the value recorded earlier in the
/// same rule, or `none` when the rule never declared it.
fn substitute_tw_vars(value: &str, tw_values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(at) = rest.find("var(") {
        let inner_start = at + 4;
        let Some(close) = paren_end(rest, inner_start) else {
            break;
        };
        let name = rest[inner_start..close]
            .split(',')
            .next()
            .unwrap_or_default()
            .trim();

        out.push_str(&rest[..at]);
        if name.starts_with("--tw-") {
            out.push_str(tw_values.get(name).map_or("none", String::as_str));
        } else {
            out.push_str(&rest[at..=close]);
        }
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    out
}

fn rgb_to_rgba(value: &str) -> String {
    RGB_SLASH
        .replace_all(value, |caps: &Captures<'_>| {
            let channels: Vec<&str> = caps[1].split_whitespace().collect();
            match channels.as_slice() {
                [r, g, b] => format!("rgba({r}, {g}, {b}, {})", &caps[2]),
                _ => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn strip_none_transforms(value: String) -> String {
    let mut stripped = value;
    let mut removed = false;

    for fragment in NONE_TRANSFORMS {
        if let Some(at) = stripped.find(fragment) {
            stripped.replace_range(at..at + fragment.len(), "");
            removed = true;
        }
    }

    if !removed {
        return stripped;
    }
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        "none".to_string()
    } else {
        collapsed
    }
}

/// Trimmed declarations of a rule body, comments removed.
fn split_declarations(body: &str) -> Vec<String> {
    let bytes = body.as_bytes();
    let mut declarations = Vec::new();
    let mut current = String::new();
    let mut depth = 0_usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = comment_end(body, i);
                continue;
            }
            quote @ (b'"' | b'\'') => {
                let end = string_end(bytes, i, quote);
                current.push_str(&body[i..end]);
                i = end;
                continue;
            }
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b';' if depth == 0 => {
                push_declaration(&mut declarations, &current);
                current.clear();
                i += 1;
                continue;
            }
            _ => {}
        }
        let ch_len = body[i..].chars().next().map_or(1, char::len_utf8);
        current.push_str(&body[i..i + ch_len]);
        i += ch_len;
    }
    push_declaration(&mut declarations, &current);

    declarations
}

fn push_declaration(declarations: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        declarations.push(trimmed.to_string());
    }
}

/// Index just past the comment opening at `start`.
fn comment_end(text: &str, start: usize) -> usize {
    text[start + 2..]
        .find("*/")
        .map_or(text.len(), |i| start + 2 + i + 2)
}

/// Index just past the string literal opening at `start`.
fn string_end(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Index of the `}` closing a block whose body starts at `start`.
fn block_end(text: &str, start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 1_usize;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = comment_end(text, i);
                continue;
            }
            quote @ (b'"' | b'\'') => {
                i = string_end(bytes, i, quote);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Index of the `)` matching an opening paren just before `start`.
fn paren_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 1_usize;
    for (i, b) in text.bytes().enumerate().skip(start) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> CssRewriter {
        CssRewriter::new(&TailwindConfig::default())
    }

    fn rewrite(css: &str) -> Option<String> {
        rewriter().rewrite(css).map(|t| t.code)
    }

    #[test]
    fn test_rem_to_rpx_precision() {
        let r = rewriter();
        assert_eq!(r.rem_to_rpx("0"), "0rpx");
        assert_eq!(r.rem_to_rpx("0.25"), "7rpx");
        assert_eq!(r.rem_to_rpx("1.125"), "31.5rpx");
        assert_eq!(r.rem_to_rpx("-0.5"), "-14rpx");
        assert_eq!(r.rem_to_rpx("0.1"), "2.8rpx");
    }

    #[test]
    fn test_rem_factor_follows_config() {
        let config = TailwindConfig {
            rem_unit: 16.0,
            rpx_ratio: 1.0,
            ..TailwindConfig::default()
        };
        assert_eq!(CssRewriter::new(&config).rem_to_rpx("2"), "32rpx");
    }

    #[test]
    fn test_units_inside_functions() {
        let out = rewrite(".w-a { width: calc(100% - 0.5rem); margin: 0 1rem; }").unwrap();
        assert_eq!(out, ".w-a {\n\twidth: calc(100% - 14rpx);\n\tmargin: 0 28rpx;\n}");
    }

    #[test]
    fn test_selector_only_change_keeps_body() {
        assert_eq!(
            rewrite(r".w-1\/2 { width: 50%; }").unwrap(),
            ".w-1-slash-2 { width: 50%; }"
        );
    }

    #[test]
    fn test_unchanged_is_none() {
        assert!(rewrite(".card { color: red; }\n/* note */\n").is_none());
        assert!(rewrite(".uni-btn:hover { color: red; }").is_none());
        assert!(rewrite("@font-face { font-family: x; src: url('a.ttf'); }").is_none());
    }

    #[test]
    fn test_tw_variables_inlined() {
        let css = ".text-white { --tw-text-opacity: 1; color: rgb(255 255 255 / var(--tw-text-opacity)); }";
        assert_eq!(
            rewrite(css).unwrap(),
            ".text-white {\n\tcolor: rgba(255, 255, 255, 1);\n}"
        );
    }

    #[test]
    fn test_missing_tw_variable_becomes_none() {
        let css = ".rotate-0 { transform: translate(var(--tw-translate-x), var(--tw-translate-y)) rotate(var(--tw-rotate)); }";
        assert_eq!(rewrite(css).unwrap(), ".rotate-0 {\n\ttransform: none;\n}");
    }

    #[test]
    fn test_partial_none_transform() {
        let css = ".rotate-45 { --tw-rotate: 45deg; transform: translate(var(--tw-translate-x), var(--tw-translate-y)) rotate(var(--tw-rotate)) skewX(var(--tw-skew-x)); }";
        assert_eq!(
            rewrite(css).unwrap(),
            ".rotate-45 {\n\ttransform: rotate(45deg);\n}"
        );
    }

    #[test]
    fn test_unsupported_declarations_removed() {
        assert_eq!(rewrite(".blur { filter: blur(4px); }").unwrap(), ".blur {\n}");
        assert_eq!(
            rewrite(".sticky { position: sticky; top: 0; }").unwrap(),
            ".sticky {\n\ttop: 0;\n}"
        );
        assert_eq!(
            rewrite(".align-top { vertical-align: top; visibility: hidden; }").unwrap(),
            ".align-top {\n}"
        );
    }

    #[test]
    fn test_flex_shorthand() {
        assert_eq!(rewrite(".flex-1 { flex: 1 1 0%; }").unwrap(), ".flex-1 {\n\tflex: 1;\n}");
    }

    #[test]
    fn test_rpx_color_becomes_font_size() {
        let out = rewrite(r".text-\[28rpx\] { color: 28rpx; }").unwrap();
        assert_eq!(
            out,
            ".text--bracket-start-28rpx-bracket-end- {\n\tfont-size: 28rpx;\n}"
        );
    }

    #[test]
    fn test_media_rules_recursed() {
        let css = "@media (min-width: 640px) { .sm\\:p-2 { padding: 0.5rem; } }";
        assert_eq!(
            rewrite(css).unwrap(),
            "@media (min-width: 640px) { .sm-colon-p-2 {\n\tpadding: 14rpx;\n} }"
        );
    }

    #[test]
    fn test_strings_and_comments_do_not_split() {
        let css = ".a { content: '}'; /* { */ margin: 1rem; }";
        assert_eq!(rewrite(css).unwrap(), ".a {\n\tcontent: '}';\n\tmargin: 28rpx;\n}");
    }
}
