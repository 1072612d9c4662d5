//! Brace Matcher.
//!
//! Counts `{` and `}` with no awareness of string literals or comments. The
//! generator only scans text it produced itself, where braces inside
//! literals never occur.

use epsgen_core::{Error, Result};

/// Returns the byte index of the `}` closing the block whose `{` sits just
/// before `start`.
///
/// # Errors
///
/// Returns [`Error::UnbalancedBraces`] when the text ends before the block
/// closes.
///
/// # Examples
///
/// ```
/// use epsgen_codegen::brace::find_closing_brace;
///
/// let text = "a: { b: { c: C; }; }; d";
/// assert_eq!(find_closing_brace(text, 4).unwrap(), 19);
///
/// assert!(find_closing_brace("{ {", 1).unwrap_err().is_unbalanced_braces());
/// ```
pub fn find_closing_brace(text: &str, start: usize) -> Result<usize> {
    let mut depth = 1usize;

    for (offset, byte) in text.bytes().enumerate().skip(start) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(offset);
                }
            }
            _ => {}
        }
    }

    Err(Error::UnbalancedBraces { position: start })
}
