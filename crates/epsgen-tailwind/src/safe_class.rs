//! Selector-safe class names.
//!
//! The cross-platform style engine rejects `[`, `]`, `(`, `)`, `{`, `}`,
//! `$`, `#`, `!`, `/` and `:` in class selectors. Each is replaced by a
//! fixed textual token so `w-1/2` becomes `w-1-slash-2` in both the markup
//! and the generated stylesheet.
//!
//! # Examples
//!
//! ```
//! use epsgen_tailwind::safe_class::{restore_class, to_safe_class};
//!
//! let safe = to_safe_class("dark:!bg-[#fff]");
//! assert_eq!(safe, "dark-colon--important-bg--bracket-start--hash-fff-bracket-end-");
//! assert_eq!(restore_class(&safe), "dark:!bg-[#fff]");
//! ```

/// Substitutions applied to class names, in order.
pub const SAFE_CHAR_MAP: [(&str, &str); 11] = [
    ("[", "-bracket-start-"),
    ("]", "-bracket-end-"),
    ("(", "-paren-start-"),
    (")", "-paren-end-"),
    ("{", "-brace-start-"),
    ("}", "-brace-end-"),
    ("$", "-dollar-"),
    ("#", "-hash-"),
    ("!", "-important-"),
    ("/", "-slash-"),
    (":", "-colon-"),
];

/// Substitutions applied to locale keys, in order. Extends
/// [`SAFE_CHAR_MAP`] with whitespace and punctuation.
pub const SAFE_CHAR_MAP_LOCALE: [(&str, &str); 29] = [
    ("[", "-bracket-start-"),
    ("]", "-bracket-end-"),
    ("(", "-paren-start-"),
    (")", "-paren-end-"),
    ("{", "-brace-start-"),
    ("}", "-brace-end-"),
    ("$", "-dollar-"),
    ("#", "-hash-"),
    ("!", "-important-"),
    ("/", "-slash-"),
    (":", "-colon-"),
    (" ", "-space-"),
    ("<", "-lt-"),
    (">", "-gt-"),
    ("&", "-amp-"),
    ("|", "-pipe-"),
    ("^", "-caret-"),
    ("~", "-tilde-"),
    ("`", "-backtick-"),
    ("'", "-single-quote-"),
    (".", "-dot-"),
    ("?", "-question-"),
    ("*", "-star-"),
    ("+", "-plus-"),
    ("-", "-dash-"),
    ("_", "-underscore-"),
    ("=", "-equal-"),
    ("%", "-percent-"),
    ("@", "-at-"),
];

/// Tokens of binding expressions that can surface as class candidates.
const EXPRESSION_TOKENS: [&str; 5] = ["!=", "!==", "?", ":", "="];

const DARK_VARIANT: &str = ":is(.dark *)";

/// Rewrites a class name or selector into its safe form.
///
/// `:host` selectors and bare expression tokens (`!=`, `!==`, `?`, `:`,
/// `=`) pass through unchanged. Backslash escapes and the
/// `:is(.dark *)` dark-mode variant are removed before substitution.
#[must_use]
pub fn to_safe_class(class_name: &str) -> String {
    if class_name.contains(":host") || EXPRESSION_TOKENS.contains(&class_name) {
        return class_name.to_string();
    }

    let mut safe = class_name.replace('\\', "").replace(DARK_VARIANT, "");
    for (ch, replacement) in SAFE_CHAR_MAP {
        if safe.contains(ch) {
            safe = safe.replace(ch, replacement);
        }
    }
    safe
}

/// Reverses [`to_safe_class`].
///
/// Exact for names that did not already contain one of the replacement
/// tokens before conversion.
#[must_use]
pub fn restore_class(safe: &str) -> String {
    SAFE_CHAR_MAP
        .iter()
        .rev()
        .fold(safe.to_string(), |name, (ch, replacement)| {
            name.replace(replacement, ch)
        })
}

/// Rewrites a locale key with [`SAFE_CHAR_MAP_LOCALE`].
///
/// Entries apply in table order, so tokens inserted by earlier entries are
/// themselves rewritten by later ones (`-` in particular). The runtime
/// resolves lookup keys through the same table in the same order.
///
/// # Examples
///
/// ```
/// use epsgen_tailwind::safe_class::to_safe_locale_key;
///
/// assert_eq!(to_safe_locale_key("hello"), "hello");
/// assert_eq!(to_safe_locale_key("a.b"), "a-dash-dot-dash-b");
/// ```
#[must_use]
pub fn to_safe_locale_key(key: &str) -> String {
    SAFE_CHAR_MAP_LOCALE
        .iter()
        .fold(key.to_string(), |key, (ch, replacement)| {
            key.replace(ch, replacement)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SAMPLES: [&str; 14] = [
        "w-1/2",
        "w-[100px]",
        "p-2",
        "!p-2",
        "dark:text-white",
        "hover:bg-primary-500",
        "md:w-1/3",
        "bg-[#ff0000]",
        "text-[length:var(--size)]",
        "dark:!bg-surface-800",
        "translate-x-1/2",
        "grid-cols-[repeat(3,1fr)]",
        "w-[calc(100%-2rem)]",
        "h-[${size}]",
    ];

    #[test]
    fn test_slash_removed() {
        let safe = to_safe_class("w-1/2");
        assert!(!safe.contains('/'));
        assert_eq!(safe, "w-1-slash-2");
    }

    #[test]
    fn test_samples_restore_and_stay_distinct() {
        let mut seen = HashSet::new();
        for sample in SAMPLES {
            let safe = to_safe_class(sample);
            assert!(
                !safe.contains(['[', ']', '(', ')', '{', '}', '$', '#', '!', '/', ':']),
                "{safe}"
            );
            assert_eq!(restore_class(&safe), sample);
            assert!(seen.insert(safe), "collision for {sample}");
        }
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(to_safe_class(":host"), ":host");
        assert_eq!(to_safe_class(":host(.a:b)"), ":host(.a:b)");
        for token in EXPRESSION_TOKENS {
            assert_eq!(to_safe_class(token), token);
        }
    }

    #[test]
    fn test_escapes_and_dark_variant_removed() {
        assert_eq!(to_safe_class(r".w-1\/2"), ".w-1-slash-2");
        assert_eq!(
            to_safe_class(r".dark\:text-white:is(.dark *)"),
            ".dark-colon-text-white"
        );
    }

    #[test]
    fn test_locale_cascade() {
        assert_eq!(to_safe_locale_key("a b"), "a-dash-space-dash-b");
        assert_eq!(to_safe_locale_key("x-y"), "x-dash-y");
        assert_eq!(to_safe_locale_key("plain"), "plain");
    }
}
