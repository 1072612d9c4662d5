//! Source rewriting commands: `transform`, `css` and `locale`.
//!
//! Each reads one file and runs it through the matching rewriter. Without
//! `--write` the rewritten text goes to stdout; with it the file is
//! updated in place and a summary is printed.

use anyhow::{Context, Result};
use epsgen_core::GeneratorConfig;
use crate::{ExitCode, OutputFormat};
use epsgen_tailwind::{CssRewriter, MarkupTransformer, Transformed, sanitize_locale};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, error, warn};

/// Which rewriter a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteKind {
    /// `.uvue` page markup.
    Markup,
    /// Generated stylesheet.
    Css,
    /// JSON modules and locale tables.
    Locale,
}

/// Summary printed after a rewrite.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RewriteResult {
    /// File that was processed.
    pub file: String,
    /// Whether the rewriter changed anything.
    pub changed: bool,
    /// Whether the file was updated.
    pub written: bool,
}

/// Runs the rewriter for `kind` over `code`.
///
/// `id` is the module path the build tool would report; markup and locale
/// rewriting only apply to matching ids. Returns `None` when nothing
/// changed or the rewriter does not apply.
pub fn rewrite_source(
    kind: RewriteKind,
    config: &GeneratorConfig,
    id: &str,
    code: &str,
) -> Result<Option<Transformed>> {
    match kind {
        RewriteKind::Markup => {
            if !config.tailwind.enable {
                debug!("tailwind rewriting disabled");
                return Ok(None);
            }
            if !MarkupTransformer::applies_to(id) {
                warn!(id, "not a uvue page, leaving unchanged");
                return Ok(None);
            }
            Ok(MarkupTransformer::new(&config.tailwind).transform(code))
        }
        RewriteKind::Css => {
            if !config.tailwind.enable {
                debug!("tailwind rewriting disabled");
                return Ok(None);
            }
            Ok(CssRewriter::new(&config.tailwind).rewrite(code))
        }
        RewriteKind::Locale => Ok(sanitize_locale(code, id)?),
    }
}

/// Runs a rewrite command on `file`.
pub async fn run(
    kind: RewriteKind,
    file: &Path,
    write: bool,
    config: &GeneratorConfig,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let code = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let id = file.to_string_lossy().replace('\\', "/");

    let rewritten = match rewrite_source(kind, config, &id, &code) {
        Ok(rewritten) => rewritten,
        Err(e) => {
            error!("{}: {e:#}", file.display());
            return Ok(ExitCode::InvalidInput);
        }
    };

    if !write {
        let text = rewritten.as_ref().map_or(code.as_str(), |t| t.code.as_str());
        print!("{text}");
        return Ok(ExitCode::Success);
    }

    let result = RewriteResult {
        file: file.display().to_string(),
        changed: rewritten.is_some(),
        written: rewritten.is_some(),
    };
    if let Some(transformed) = rewritten {
        tokio::fs::write(file, transformed.code)
            .await
            .with_context(|| format!("failed to write {}", file.display()))?;
    }

    println!("{}", crate::formatters::format_output(&result, output_format)?);
    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_requires_uvue_id() {
        let config = GeneratorConfig::default();
        let code = r#"<template><view class="w-1/2"></view></template>"#;

        assert!(rewrite_source(RewriteKind::Markup, &config, "/a.vue", code).unwrap().is_none());
        let out = rewrite_source(RewriteKind::Markup, &config, "/a.uvue", code)
            .unwrap()
            .unwrap();
        assert!(out.code.contains("w-1-slash-2"));
    }

    #[test]
    fn test_tailwind_disabled() {
        let mut config = GeneratorConfig::default();
        config.tailwind.enable = false;

        assert!(
            rewrite_source(RewriteKind::Css, &config, "/a.css", ".p-2 { padding: 0.5rem; }")
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_locale_errors_propagate() {
        let config = GeneratorConfig::default();
        assert!(rewrite_source(RewriteKind::Locale, &config, "/locale/en.json", "{").is_err());
    }
}
