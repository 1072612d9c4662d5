//! Locale JSON sanitization.
//!
//! The cross-platform compiler turns JSON modules into generated code, so
//! object keys must survive as identifiers and large translation tables
//! must stay small enough to compile.

use crate::Transformed;
use crate::safe_class::to_safe_locale_key;
use epsgen_core::Result;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

const PAIR_SEPARATOR: &str = "<__=__>";
const ENTRY_SEPARATOR: &str = "<__&__>";

/// Rewrites a JSON module, or returns `None` for non-JSON ids.
///
/// Top-level object keys go through [`to_safe_locale_key`], keeping their
/// order. Files under a `/locale/` directory holding `[key, value]` pairs
/// are packed into one string, `[["key<__=__>value<__&__>..."]]`. Anything
/// else is re-emitted as compact JSON.
///
/// # Errors
///
/// Returns a serialization error when `code` is not valid JSON.
///
/// # Examples
///
/// ```
/// use epsgen_tailwind::locale::sanitize_locale;
///
/// let out = sanitize_locale(r#"{"a b": 1, "c": 2}"#, "/src/config.json").unwrap().unwrap();
/// assert_eq!(out.code, r#"{"a-dash-space-dash-b":1,"c":2}"#);
///
/// let out = sanitize_locale(r#"[["hi", "你好"]]"#, "/src/locale/zh-cn.json").unwrap().unwrap();
/// assert_eq!(out.code, r#"[["hi<__=__>你好"]]"#);
/// ```
pub fn sanitize_locale(code: &str, id: &str) -> Result<Option<Transformed>> {
    if !id.ends_with(".json") {
        return Ok(None);
    }

    let sanitized = if code.trim_start().starts_with('{') {
        let object: IndexMap<String, Value> = serde_json::from_str(code)?;
        let renamed: IndexMap<String, Value> = object
            .into_iter()
            .map(|(key, value)| (to_safe_locale_key(&key), value))
            .collect();
        serde_json::to_string(&renamed)?
    } else {
        let value: Value = serde_json::from_str(code)?;
        match value {
            Value::Array(pairs) if id.contains("/locale/") => {
                let packed = pack_pairs(&pairs);
                debug!(id, entries = pairs.len(), "packed locale table");
                serde_json::to_string(&[[packed]])?
            }
            other => serde_json::to_string(&other)?,
        }
    };

    Ok(Some(Transformed::new(sanitized)))
}

fn pack_pairs(pairs: &[Value]) -> String {
    pairs
        .iter()
        .filter_map(|pair| match pair.as_array().map(Vec::as_slice) {
            Some([key, value, ..]) => Some(format!(
                "{}{PAIR_SEPARATOR}{}",
                plain_text(key),
                plain_text(value)
            )),
            _ => {
                warn!(entry = %pair, "skipping malformed locale entry");
                None
            }
        })
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_json_ignored() {
        assert!(sanitize_locale("{}", "/src/a.ts").unwrap().is_none());
    }

    #[test]
    fn test_key_order_kept() {
        let out = sanitize_locale(r#"{"z": 1, "a.b": {"y": true, "x": 0}, "m": null}"#, "/a.json")
            .unwrap()
            .unwrap();
        assert_eq!(out.code, r#"{"z":1,"a-dash-dot-dash-b":{"y":true,"x":0},"m":null}"#);
    }

    #[test]
    fn test_locale_pairs_packed() {
        let code = r#"[["Save", "保存"], ["Count: {n}", "数量：{n}"]]"#;
        let out = sanitize_locale(code, "/src/locale/zh-cn.json").unwrap().unwrap();
        assert_eq!(
            out.code,
            r#"[["Save<__=__>保存<__&__>Count: {n}<__=__>数量：{n}"]]"#
        );
    }

    #[test]
    fn test_malformed_pairs_skipped() {
        let code = r#"[["a", "b"], "loose", [1, 2]]"#;
        let out = sanitize_locale(code, "/locale/en.json").unwrap().unwrap();
        assert_eq!(out.code, r#"[["a<__=__>b<__&__>1<__=__>2"]]"#);
    }

    #[test]
    fn test_arrays_outside_locale_dir_compacted() {
        let out = sanitize_locale("[1, 2,\n 3]", "/static/list.json").unwrap().unwrap();
        assert_eq!(out.code, "[1,2,3]");
    }

    #[test]
    fn test_invalid_json() {
        let err = sanitize_locale("{", "/locale/en.json").unwrap_err();
        assert!(err.is_serialization_error());
    }
}
