//! Async file helpers shared by the cache and the declaration writer.

use epsgen_core::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Reads a file, treating any failure as "absent".
pub async fn read_optional(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Some(content),
        Err(e) => {
            debug!("{} not readable: {}", path.display(), e);
            None
        }
    }
}

/// Writes `content` unless the file already holds exactly those bytes.
///
/// Parent directories are created as needed. Returns `true` when the file
/// was written.
///
/// # Errors
///
/// Returns [`Error::Io`] if the directory or file cannot be written.
///
/// # Examples
///
/// ```
/// use epsgen_schema::fs::write_if_changed;
///
/// # async fn example() -> epsgen_core::Result<()> {
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("out/eps.json");
///
/// assert!(write_if_changed(&path, "[]").await?);
/// assert!(!write_if_changed(&path, "[]").await?);
/// # Ok(())
/// # }
/// ```
pub async fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if read_optional(path).await.as_deref() == Some(content) {
        debug!("{} unchanged", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| Error::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    tokio::fs::write(path, content)
        .await
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_if_changed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/eps.d.ts");

        assert!(write_if_changed(&path, "a").await.unwrap());
        assert!(!write_if_changed(&path, "a").await.unwrap());
        assert!(write_if_changed(&path, "b").await.unwrap());
        assert_eq!(read_optional(&path).await.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_read_missing() {
        let temp = TempDir::new().unwrap();
        assert!(read_optional(&temp.path().join("nope")).await.is_none());
    }
}
