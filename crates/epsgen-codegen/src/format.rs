//! Output formatting.
//!
//! Synthesized text is assembled from templates and string fragments, so
//! indentation is uneven. A [`CodeFormatter`] normalizes it before the
//! declaration file is written; when formatting fails the write is
//! skipped and the previous file stays in place.

use epsgen_core::{Error, Result};
use std::fmt;

/// Formats generated TypeScript.
pub trait CodeFormatter: fmt::Debug + Send + Sync {
    /// Returns the formatted text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatError`] when the text cannot be formatted.
    fn format(&self, text: &str) -> Result<String>;
}

/// Re-indents by brace depth with tabs.
///
/// Lines are trimmed and indented one tab per open `{`; braces inside
/// string literals and comments do not count. Runs of blank lines collapse
/// to one, and blank lines right after an opening or before a closing
/// brace are dropped. Continuation lines of block comments get one extra
/// space so the `*` column lines up.
///
/// # Examples
///
/// ```
/// use epsgen_codegen::format::{CodeFormatter, TabFormatter};
///
/// let text = "interface A {\n\n   /** \"}\" */\n      a: string;\n\n\n}\n";
/// assert_eq!(
///     TabFormatter.format(text).unwrap(),
///     "interface A {\n\t/** \"}\" */\n\ta: string;\n}\n"
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TabFormatter;

#[derive(Debug, Default)]
struct ScanState {
    in_block_comment: bool,
}

/// Braces closed before any other code on the line, and the net depth
/// change of the line.
fn scan_line(line: &str, state: &mut ScanState) -> (usize, isize) {
    let bytes = line.as_bytes();
    let mut leading_closers = 0;
    let mut delta = 0isize;
    let mut seen_code = false;
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];
        let next = bytes.get(i + 1).copied();

        if state.in_block_comment {
            if byte == b'*' && next == Some(b'/') {
                state.in_block_comment = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == open {
                quote = None;
            }
            i += 1;
            continue;
        }

        match (byte, next) {
            (b'/', Some(b'/')) => break,
            (b'/', Some(b'*')) => {
                state.in_block_comment = true;
                i += 2;
                continue;
            }
            (b'"' | b'\'' | b'`', _) => {
                quote = Some(byte);
                seen_code = true;
            }
            (b'{', _) => {
                delta += 1;
                seen_code = true;
            }
            (b'}', _) => {
                delta -= 1;
                if !seen_code {
                    leading_closers += 1;
                }
            }
            (b' ' | b'\t', _) => {}
            _ => seen_code = true,
        }
        i += 1;
    }

    (leading_closers, delta)
}

impl CodeFormatter for TabFormatter {
    fn format(&self, text: &str) -> Result<String> {
        let mut state = ScanState::default();
        let mut out = String::with_capacity(text.len());
        let mut depth = 0isize;
        let mut blank_pending = false;
        let mut after_open = false;

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                blank_pending = !out.is_empty() && !after_open;
                continue;
            }

            let continues_comment = state.in_block_comment;
            let (leading_closers, delta) = scan_line(line, &mut state);
            let indent = depth - isize::try_from(leading_closers).unwrap_or(isize::MAX);
            let Ok(tabs) = usize::try_from(indent) else {
                return Err(Error::FormatError {
                    message: format!("unexpected '}}' on line {}", number + 1),
                });
            };

            if blank_pending && leading_closers == 0 {
                out.push('\n');
            }
            blank_pending = false;

            out.push_str(&"\t".repeat(tabs));
            if continues_comment && line.starts_with('*') {
                out.push(' ');
            }
            out.push_str(line);
            out.push('\n');

            depth += delta;
            if depth < 0 {
                return Err(Error::FormatError {
                    message: format!("unbalanced '}}' on line {}", number + 1),
                });
            }
            after_open = delta > 0;
        }

        if depth != 0 || state.in_block_comment {
            return Err(Error::FormatError {
                message: "unclosed block at end of input".to_string(),
            });
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reindents_nested_blocks() {
        let text = "declare namespace Eps {\ninterface A {\n    a: string;\n}\n}";
        assert_eq!(
            TabFormatter.format(text).unwrap(),
            "declare namespace Eps {\n\tinterface A {\n\t\ta: string;\n\t}\n}\n"
        );
    }

    #[test]
    fn test_jsdoc_alignment() {
        let text = "interface A {\n/**\n* Name\n*/\nname?: string;\n}";
        assert_eq!(
            TabFormatter.format(text).unwrap(),
            "interface A {\n\t/**\n\t * Name\n\t */\n\tname?: string;\n}\n"
        );
    }

    #[test]
    fn test_collapses_blank_lines() {
        let text = "\n\ntype a = any;\n\n\n\ntype b = any;\n\n";
        assert_eq!(
            TabFormatter.format(text).unwrap(),
            "type a = any;\n\ntype b = any;\n"
        );
    }

    #[test]
    fn test_single_line_blocks_stay_flat() {
        let text = "export type A = { a: B; }\nexport type Service = { a: A; }";
        assert_eq!(
            TabFormatter.format(text).unwrap(),
            "export type A = { a: B; }\nexport type Service = { a: A; }\n"
        );
    }

    #[test]
    fn test_braces_in_comments_and_strings_ignored() {
        let text = "interface A {\n// {\n/* { */\nk: \"{\";\n}";
        assert!(TabFormatter.format(text).is_ok());
    }

    #[test]
    fn test_unclosed_block_fails() {
        let err = TabFormatter.format("interface A {\n a: string;").unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_stray_closer_fails() {
        assert!(TabFormatter.format("}\n").unwrap_err().is_format_error());
        assert!(TabFormatter.format("a; }").unwrap_err().is_format_error());
    }

    #[test]
    fn test_unclosed_comment_fails() {
        assert!(TabFormatter.format("/** open").is_err());
    }
}
