//! Class-name extraction from markup.
//!
//! Three attribute forms are recognized:
//!
//! - **static** `class` / `hover-class`: the value is split on whitespace
//! - **dynamic** `:class` / `:hover-class`: string literals are pulled out
//!   of object keys, array elements, ternary branches, template literals
//!   (with their `${}` expressions scanned recursively) and mixed
//!   template-plus-text values
//! - **`:pt`** pass-through trees: every `className:` entry is located with
//!   a bracket- and quote-aware scanner and treated like a dynamic value
//!
//! None of this is a real parser. Values that do not fit the patterns are
//! skipped.
//!
//! # Examples
//!
//! ```
//! use epsgen_tailwind::extract::class_names;
//!
//! assert_eq!(class_names(r#"<view class="p-2 flex">"#), vec!["p-2", "flex"]);
//! assert_eq!(
//!     class_names(r#"<view :class="{'text-red-900': active}">"#),
//!     vec!["text-red-900"]
//! );
//! ```

use indexmap::IndexSet;
use regex::Regex;
use std::sync::LazyLock;

static ATTRIBUTE_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(:class|:pt|:hover-class|class)\s*=\s*(['"`])"#).expect("valid regex")
});

static FUNCTION_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)[A-Za-z0-9_]+\s*\(\s*\{([^}]*)\}\s*\)").expect("valid regex")
});

static QUOTED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)['"](.*?)['"]\s*:"#).expect("valid regex"));

static OBJECT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)[{,]\s*['"](.*?)['"]\s*:"#).expect("valid regex"));

static ARRAY_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)(?:^|[,\[\s])\s*['"](.*?)['"]"#).expect("valid regex"));

static TERNARY_BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)(\?|:)\s*['"](.*?)['"]"#).expect("valid regex"));

static TEMPLATE_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]*)`").expect("valid regex"));

static TEMPLATE_EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]*)\}").expect("valid regex"));

static MIXED_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`[^`]*`\s+([a-zA-Z0-9\-_\s]+)").expect("valid regex"));

static PLAIN_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([A-Za-z0-9_\s\-!:/]+?)['"]"#).expect("valid regex"));

static FIRST_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"](.*?)['"]"#).expect("valid regex"));

static PT_CLASS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"className\s*:\s*").expect("valid regex"));

/// Kind of class-bearing attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassAttrKind {
    /// `class` or `hover-class`.
    Static,
    /// `:class` or `:hover-class`.
    Dynamic,
    /// `:pt`.
    PassThrough,
}

/// One class-bearing attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassAttr<'a> {
    /// Attribute kind.
    pub kind: ClassAttrKind,
    /// Value between the quotes, untrimmed.
    pub value: &'a str,
}

/// Byte index of the quote closing a value opened at `start`.
///
/// Quoted strings of the other two kinds are skipped whole, and a
/// backslash escapes the next byte.
fn closing_quote(code: &str, start: usize, quote: u8) -> Option<usize> {
    let bytes = code.as_bytes();
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b if b == quote => return Some(i),
            b'\\' => i += 2,
            inner @ (b'\'' | b'"' | b'`') => {
                let close = code[i + 1..].find(char::from(inner))?;
                i += close + 2;
            }
            _ => i += 1,
        }
    }
    None
}

/// Finds every class-bearing attribute in `code`.
#[must_use]
pub fn class_attributes(code: &str) -> Vec<ClassAttr<'_>> {
    let mut attrs = Vec::new();
    let mut pos = 0;

    while let Some(caps) = ATTRIBUTE_HEAD.captures_at(code, pos) {
        let (Some(head), Some(name), Some(quote)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            break;
        };

        let Some(end) = closing_quote(code, head.end(), quote.as_str().as_bytes()[0]) else {
            pos = head.start() + 1;
            continue;
        };

        let kind = match name.as_str().to_ascii_lowercase().as_str() {
            "class" => ClassAttrKind::Static,
            ":pt" => ClassAttrKind::PassThrough,
            _ => ClassAttrKind::Dynamic,
        };
        attrs.push(ClassAttr {
            kind,
            value: &code[head.end()..end],
        });
        pos = end + 1;
    }

    attrs
}

/// Collects the literal class names in `code`, first occurrence order.
#[must_use]
pub fn class_names(code: &str) -> Vec<String> {
    let mut names = IndexSet::new();

    for attr in class_attributes(code) {
        let value = attr.value.trim();
        match attr.kind {
            ClassAttrKind::Static => {
                names.extend(value.split_whitespace().map(str::to_string));
            }
            ClassAttrKind::PassThrough => pass_through_names(value, &mut names),
            ClassAttrKind::Dynamic => names.extend(dynamic_class_names(value)),
        }
    }

    names.into_iter().collect()
}

/// Raw class values: the attribute value, or for `:pt` each `className`
/// entry.
#[must_use]
pub fn class_contents(code: &str) -> Vec<String> {
    let mut contents = Vec::new();

    for attr in class_attributes(code) {
        if attr.kind == ClassAttrKind::PassThrough {
            contents.extend(
                PT_CLASS_NAME
                    .find_iter(attr.value)
                    .filter_map(|m| extract_complex_value(&attr.value[m.end()..])),
            );
        } else {
            contents.push(attr.value.to_string());
        }
    }

    contents
}

fn insert_clean(names: &mut IndexSet<String>, candidate: &str) {
    let name = candidate.trim();
    if !name.is_empty() && !name.contains(['\n', '\t']) {
        names.insert(name.to_string());
    }
}

fn insert_words(names: &mut IndexSet<String>, text: &str) {
    names.extend(text.split_whitespace().map(str::to_string));
}

/// Collects the class names in a dynamic binding expression.
///
/// # Examples
///
/// ```
/// use epsgen_tailwind::extract::dynamic_class_names;
///
/// assert_eq!(
///     dynamic_class_names("`text-red-900` text-red-1000"),
///     vec!["text-red-900", "text-red-1000"]
/// );
/// assert_eq!(
///     dynamic_class_names("dark ? 'bg-black' : 'bg-white'"),
///     vec!["bg-black", "bg-white"]
/// );
/// ```
#[must_use]
pub fn dynamic_class_names(value: &str) -> Vec<String> {
    let mut names = IndexSet::new();

    for call in FUNCTION_CALL.captures_iter(value) {
        for key in QUOTED_KEY.captures_iter(&call[1]) {
            insert_clean(&mut names, &key[1]);
        }
    }

    for key in OBJECT_KEY.captures_iter(value) {
        insert_clean(&mut names, &key[1]);
    }

    for element in ARRAY_STRING.captures_iter(value) {
        insert_clean(&mut names, &element[1]);
    }

    for branch in TERNARY_BRANCH.captures_iter(value) {
        insert_clean(&mut names, &branch[2]);
    }

    for template in TEMPLATE_LITERAL.captures_iter(value) {
        let content = &template[1];
        for part in TEMPLATE_EXPRESSION.split(content) {
            insert_words(&mut names, part);
        }
        for expression in TEMPLATE_EXPRESSION.captures_iter(content) {
            names.extend(dynamic_class_names(&expression[1]));
        }
    }

    for mixed in MIXED_TEMPLATE.captures_iter(value) {
        insert_words(&mut names, &mixed[1]);
    }

    for string in PLAIN_STRING.captures_iter(value) {
        insert_words(&mut names, &string[1]);
    }

    names.into_iter().collect()
}

fn pass_through_names(value: &str, names: &mut IndexSet<String>) {
    for m in PT_CLASS_NAME.find_iter(value) {
        let Some(class_value) = extract_complex_value(&value[m.end()..]) else {
            continue;
        };

        if class_value.starts_with('`') {
            names.extend(dynamic_class_names(&class_value));
        } else if class_value.starts_with(['"', '\'']) {
            if let Some(caps) = FIRST_STRING.captures(&class_value) {
                insert_words(names, &caps[1]);
            }
        } else {
            names.extend(dynamic_class_names(&class_value));
        }
    }
}

/// Reads one property value from the start of `text`.
///
/// Leading whitespace is skipped. The value ends at a top-level `,` or
/// `}`, at a newline once something has been read, or right after a
/// top-level string literal followed by `,` or `}`. Brackets, parentheses
/// and braces nest; quotes of all three kinds are honored.
///
/// # Examples
///
/// ```
/// use epsgen_tailwind::extract::extract_complex_value;
///
/// assert_eq!(
///     extract_complex_value(" parse({ 'a': x, 'b': y }), other: 1").as_deref(),
///     Some("parse({ 'a': x, 'b': y })")
/// );
/// assert_eq!(extract_complex_value("'p-2', next: 1").as_deref(), Some("'p-2'"));
/// assert_eq!(extract_complex_value("  }"), None);
/// ```
#[must_use]
pub fn extract_complex_value(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = chars.iter().take_while(|c| c.is_whitespace()).count();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut result = String::new();

    while pos < chars.len() {
        let ch = chars[pos];

        if let Some(open) = quote {
            result.push(ch);
            if ch == open && chars[pos - 1] != '\\' {
                quote = None;
                if depth == 0 {
                    let next = chars[pos + 1..].iter().find(|c| !c.is_whitespace());
                    if matches!(next, Some(',' | '}')) {
                        break;
                    }
                }
            }
        } else {
            match ch {
                '"' | '\'' | '`' => {
                    quote = Some(ch);
                    result.push(ch);
                }
                '{' | '(' | '[' => {
                    depth += 1;
                    result.push(ch);
                }
                '}' if depth == 0 => break,
                '}' | ')' | ']' => {
                    depth -= 1;
                    result.push(ch);
                }
                ',' if depth == 0 => break,
                '\n' if depth == 0 && !result.trim().is_empty() => break,
                _ => result.push(ch),
            }
        }
        pos += 1;
    }

    let value = result.trim();
    (!value.is_empty()).then(|| value.to_string())
}
