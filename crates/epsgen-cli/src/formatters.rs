//! Output formatters for CLI commands.
//!
//! JSON for machines, compact JSON for scripts, and a colorized tree for
//! terminals.

use anyhow::Result;
use colored::Colorize;
use crate::OutputFormat;
use serde::Serialize;

/// Formats `data` in the requested output format.
///
/// # Errors
///
/// Returns an error if serialization fails.
///
/// # Examples
///
/// ```
/// use epsgen_cli::formatters::format_output;
/// use epsgen_cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Summary {
///     entities: usize,
/// }
///
/// let output = format_output(&Summary { entities: 3 }, OutputFormat::Json)?;
/// assert!(output.contains("\"entities\": 3"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Pretty-printed JSON.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Single-line JSON.
    pub fn format_compact<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string(data)?)
    }
}

/// Plain text output formatting.
pub mod text {
    use super::{Result, Serialize, json};

    /// Compact JSON, for piping into other tools.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        json::format_compact(data)
    }
}

/// Human-readable output formatting.
pub mod pretty {
    use super::{Colorize, Result, Serialize};
    use serde_json::Value;

    /// Colorized, indented key/value tree.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut out = String::new();
        write_value(&value, 0, &mut out);
        Ok(out)
    }

    fn write_value(value: &Value, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);

        match value {
            Value::Null => out.push_str(&"-".dimmed().to_string()),
            Value::Bool(b) => out.push_str(&b.to_string().yellow().to_string()),
            Value::Number(n) => out.push_str(&n.to_string().cyan().to_string()),
            Value::String(s) => out.push_str(&s.green().to_string()),
            Value::Array(items) if items.is_empty() => out.push_str(&"(none)".dimmed().to_string()),
            Value::Array(items) => {
                for item in items {
                    out.push('\n');
                    out.push_str(&pad);
                    out.push_str("- ");
                    write_value(item, indent + 1, out);
                }
            }
            Value::Object(map) if map.is_empty() => out.push_str(&"{}".dimmed().to_string()),
            Value::Object(map) => {
                for (i, (key, val)) in map.iter().enumerate() {
                    if i > 0 || indent > 0 {
                        out.push('\n');
                        out.push_str(&pad);
                    }
                    out.push_str(&key.blue().bold().to_string());
                    out.push_str(": ");
                    write_value(val, indent + 1, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Report {
        target: String,
        entity_count: usize,
        written: bool,
        collisions: Vec<String>,
    }

    fn report() -> Report {
        Report {
            target: "admin".to_string(),
            entity_count: 2,
            written: true,
            collisions: vec!["BaseSysUser".to_string()],
        }
    }

    #[test]
    fn test_json_format() {
        let output = format_output(&report(), OutputFormat::Json).unwrap();
        assert!(output.contains("\"target\": \"admin\""));
        assert!(output.contains("\"entity_count\": 2"));
    }

    #[test]
    fn test_text_format_is_single_line() {
        let output = format_output(&report(), OutputFormat::Text).unwrap();
        assert!(!output.contains('\n'));
        assert!(output.contains("\"written\":true"));
    }

    #[test]
    fn test_pretty_format() {
        colored::control::set_override(false);
        let output = format_output(&report(), OutputFormat::Pretty).unwrap();
        assert!(output.starts_with("target: admin"));
        assert!(output.contains("\nentity_count: 2"));
        assert!(output.contains("collisions: \n  - BaseSysUser"));
    }

    #[test]
    fn test_pretty_empty_collections() {
        colored::control::set_override(false);
        let output = pretty::format(&serde_json::json!({ "items": [] })).unwrap();
        assert_eq!(output, "items: (none)");
    }
}
