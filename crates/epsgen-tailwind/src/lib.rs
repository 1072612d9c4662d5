//! Tailwind interoperability for the cross-platform UI target.
//!
//! The target's style engine rejects selector characters Tailwind relies
//! on (`w-1/2`, `dark:bg-black`, `bg-[#fff]`). This crate rewrites both
//! sides consistently:
//!
//! - [`MarkupTransformer`] finds class names in `.uvue` templates and
//!   replaces Tailwind utilities with selector-safe names, binding dark
//!   variants to `__isDark`
//! - [`CssRewriter`] applies the same renaming to the generated stylesheet
//!   and converts declarations the engine cannot handle
//! - [`locale::sanitize_locale`] makes JSON module keys safe and packs
//!   translation tables
//!
//! Every transform takes source text and returns `None` when it has
//! nothing to change.
//!
//! # Examples
//!
//! ```
//! use epsgen_core::TailwindConfig;
//! use epsgen_tailwind::MarkupTransformer;
//!
//! let transformer = MarkupTransformer::new(&TailwindConfig::default());
//! let out = transformer
//!     .transform(r#"<template><view class="w-1/2"></view></template>"#)
//!     .unwrap();
//! assert_eq!(out.code, r#"<template><view class="w-1-slash-2"></view></template>"#);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod classify;
pub mod css;
pub mod extract;
pub mod locale;
pub mod markup;
pub mod safe_class;
pub mod template;

pub use classify::is_tailwind_class;
pub use css::CssRewriter;
pub use extract::{class_contents, class_names};
pub use locale::sanitize_locale;
pub use markup::MarkupTransformer;
pub use safe_class::{restore_class, to_safe_class, to_safe_locale_key};

/// Rewritten source handed back to the build tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformed {
    /// New source text.
    pub code: String,
    /// Source map mappings. Always empty; positions are not tracked.
    pub mappings: String,
}

impl Transformed {
    /// Wraps rewritten code with an empty source map.
    #[must_use]
    pub const fn new(code: String) -> Self {
        Self {
            code,
            mappings: String::new(),
        }
    }
}
