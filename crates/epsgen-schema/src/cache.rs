//! `eps.json` cache file.
//!
//! The cache holds the entity list from the last successful fetch. It is
//! read before every fetch so an unreachable backend degrades to the last
//! known schema, and rewritten only when its content changes.

use crate::fs::{read_optional, write_if_changed};
use crate::model::Entity;
use epsgen_core::{Result, Target};
use std::path::Path;
use tracing::debug;

/// File name of the cache inside the output directory.
pub const CACHE_FILE_NAME: &str = "eps.json";

/// Removes `//` and `/* */` comments that sit outside string literals.
///
/// Both `"` and `'` open a string; backslash escapes are honored inside
/// them. Line comments keep their terminating newline.
///
/// # Examples
///
/// ```
/// use epsgen_schema::cache::strip_json_comments;
///
/// let text = "[ // entities\n {\"url\": \"http://x\"} /* tail */ ]";
/// assert_eq!(strip_json_comments(text), "[ \n {\"url\": \"http://x\"}  ]");
/// ```
#[must_use]
pub fn strip_json_comments(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    let mut result = String::with_capacity(content.len());
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if let Some(open) = quote {
            result.push(ch);
            if ch == open && !escaped {
                quote = None;
            } else {
                escaped = ch == '\\' && !escaped;
            }
            i += 1;
            continue;
        }

        match (ch, chars.get(i + 1)) {
            ('"' | '\'', _) => {
                quote = Some(ch);
                escaped = false;
                result.push(ch);
                i += 1;
            }
            ('/', Some('/')) => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            ('/', Some('*')) => {
                i += 2;
                while i < chars.len() {
                    if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            _ => {
                result.push(ch);
                i += 1;
            }
        }
    }

    result
}

/// Loads the cached entity list.
///
/// A missing, unreadable or malformed file yields an empty list.
pub async fn read_cache(path: &Path) -> Vec<Entity> {
    let Some(content) = read_optional(path).await else {
        return Vec::new();
    };

    match serde_json::from_str(&strip_json_comments(&content)) {
        Ok(entities) => entities,
        Err(e) => {
            debug!("ignoring malformed cache {}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Serializes the cache body for `target`.
///
/// The cross-platform target keeps full entities; other targets store the
/// `{prefix, name, api, search}` summary.
///
/// # Errors
///
/// Returns [`epsgen_core::Error::SerializationError`] if serialization fails.
pub fn cache_content(entities: &[Entity], target: Target) -> Result<String> {
    let content = if target.is_cross_platform() {
        serde_json::to_string(entities)?
    } else {
        let summaries: Vec<_> = entities.iter().map(Entity::summary).collect();
        serde_json::to_string(&summaries)?
    };
    Ok(content)
}

/// Writes the cache when its content changed.
///
/// An empty list is never written, so a fetch that produced nothing cannot
/// replace a good cache. Returns `true` when the file was written.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub async fn write_cache(path: &Path, entities: &[Entity], target: Target) -> Result<bool> {
    if entities.is_empty() {
        debug!("entity list empty, cache left untouched");
        return Ok(false);
    }
    let content = cache_content(entities, target)?;
    write_if_changed(path, &content).await
}
