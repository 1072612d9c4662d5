//! Identifier helpers shared by the synthesizer, the flattener and the
//! runtime service code.
//!
//! # Examples
//!
//! ```
//! use epsgen_codegen::naming::{first_upper_case, format_name, is_lawful_name, to_camel};
//!
//! assert_eq!(to_camel("user-info"), "userInfo");
//! assert_eq!(first_upper_case("sys user"), "Sys User");
//! assert_eq!(format_name("base/sys-user:x"), "basesysuserx");
//! assert!(!is_lawful_name("a{b"));
//! ```

use regex::{Captures, Regex};
use std::sync::LazyLock;

static DASH_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^-])(?:-+([^-]))").expect("valid regex"));

const fn is_word(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Joins dash-separated words in camel case.
///
/// A run of dashes between two non-dash characters is dropped and the
/// following character upper-cased. Leading and trailing dashes stay.
#[must_use]
pub fn to_camel(value: &str) -> String {
    DASH_RUN
        .replace_all(value, |caps: &Captures<'_>| {
            format!("{}{}", &caps[1], caps[2].to_uppercase())
        })
        .into_owned()
}

/// Upper-cases the first character of every ASCII word.
#[must_use]
pub fn first_upper_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_is_word = false;

    for ch in value.chars() {
        let word = is_word(ch);
        if word && !previous_is_word {
            result.push(ch.to_ascii_uppercase());
        } else {
            result.push(ch);
        }
        previous_is_word = word;
    }

    result
}

/// Removes characters that cannot appear in a generated identifier
/// (`:`, `,`, whitespace, `/`, `-`).
#[must_use]
pub fn format_name(value: &str) -> String {
    value
        .chars()
        .filter(|ch| !matches!(ch, ':' | ',' | '/' | '-') && !ch.is_whitespace())
        .collect()
}

/// `true` for non-empty names free of `{`, `}` and `:`.
#[must_use]
pub fn is_lawful_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['{', '}', ':'])
}

/// Type name for an interior tree key in flattened output.
///
/// # Examples
///
/// ```
/// use epsgen_codegen::naming::interface_name;
///
/// assert_eq!(interface_name("user"), "UserInterface");
/// ```
#[must_use]
pub fn interface_name(key: &str) -> String {
    format!("{}Interface", first_upper_case(key))
}
