//! Tailwind class detection.
//!
//! A fixed prefix table, optionally behind one state prefix. Only names
//! that pass are rewritten, so plain component classes keep their
//! spelling.

const UTILITY_PREFIXES: &[&str] = &[
    // layout
    "container",
    "flex",
    "grid",
    "block",
    "inline",
    "hidden",
    "visible",
    // spacing
    "p-",
    "px-",
    "py-",
    "pt-",
    "pr-",
    "pb-",
    "pl-",
    "m-",
    "mx-",
    "my-",
    "mt-",
    "mr-",
    "mb-",
    "ml-",
    "space-",
    "gap-",
    // sizing
    "w-",
    "h-",
    "min-w-",
    "max-w-",
    "min-h-",
    "max-h-",
    // color
    "bg-",
    "text-",
    "border-",
    "ring-",
    "shadow-",
    // border
    "border",
    "rounded",
    "ring",
    // typography
    "font-",
    "leading-",
    "tracking-",
    "antialiased",
    // positioning
    "absolute",
    "relative",
    "fixed",
    "sticky",
    "static",
    "top-",
    "right-",
    "bottom-",
    "left-",
    "inset-",
    "z-",
    // transform
    "transform",
    "translate-",
    "rotate-",
    "scale-",
    "skew-",
    // transition
    "transition",
    "duration-",
    "ease-",
    "delay-",
    // interaction
    "cursor-",
    "select-",
    "pointer-events-",
    // overflow
    "overflow-",
    "truncate",
    "scroll-",
    // pseudo classes
    "hover:",
    "focus:",
    "active:",
    "disabled:",
    "group-hover:",
];

const STATE_PREFIXES: &[&str] = &[
    "dark:", "dark:!", "light:", "sm:", "md:", "lg:", "xl:", "2xl:",
];

/// `true` for names the rewriter treats as Tailwind utilities.
///
/// A leading `!` (important) always qualifies, unless the name is part of
/// a `!=` comparison.
///
/// # Examples
///
/// ```
/// use epsgen_tailwind::classify::is_tailwind_class;
///
/// assert!(is_tailwind_class("p-2"));
/// assert!(is_tailwind_class("dark:!bg-surface-800"));
/// assert!(is_tailwind_class("!mt-0"));
/// assert!(!is_tailwind_class("card-header"));
/// ```
#[must_use]
pub fn is_tailwind_class(class_name: &str) -> bool {
    if class_name.starts_with('!') && !class_name.contains("!=") {
        return true;
    }

    UTILITY_PREFIXES.iter().any(|prefix| {
        class_name.starts_with(prefix)
            || STATE_PREFIXES.iter().any(|state| {
                class_name
                    .strip_prefix(state)
                    .is_some_and(|rest| rest.starts_with(prefix))
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utilities() {
        for name in ["flex", "flex-1", "w-1/2", "text-red-900", "rounded-lg", "z-10", "truncate"] {
            assert!(is_tailwind_class(name), "{name}");
        }
    }

    #[test]
    fn test_state_prefixes() {
        assert!(is_tailwind_class("md:w-1/3"));
        assert!(is_tailwind_class("2xl:p-4"));
        assert!(is_tailwind_class("dark:text-white"));
        assert!(is_tailwind_class("hover:bg-primary-500"));
        assert!(!is_tailwind_class("md:card"));
    }

    #[test]
    fn test_important_marker() {
        assert!(is_tailwind_class("!p-0"));
        assert!(is_tailwind_class("!anything"));
        assert!(!is_tailwind_class("!="));
        assert!(!is_tailwind_class("!=="));
    }

    #[test]
    fn test_non_utilities() {
        for name in ["card", "is-active", "cl-button", "", "?", ":"] {
            assert!(!is_tailwind_class(name), "{name}");
        }
    }
}
