//! EPS generator CLI library.
//!
//! Command implementations and output formatting for the `epsgen` binary,
//! exposed as a library so they can be tested without spawning processes.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unnecessary_wraps)] // every command returns Result<ExitCode>

use clap::ValueEnum;
use epsgen_core::Target;

pub mod actions;
pub mod commands;
pub mod formatters;

pub use actions::ConfigAction;

/// Platform selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    /// Admin console.
    Admin,
    /// Client app.
    App,
    /// Cross-platform client (`uvue` pages).
    UniappX,
}

/// How command results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON.
    Json,
    /// Single-line JSON for scripts.
    Text,
    /// Colored `key: value` tree.
    #[default]
    Pretty,
}

/// Process exit status of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Finished, including runs skipped or served from cache.
    Success = 0,
    /// Unreadable input file or configuration.
    InvalidInput = 2,
    /// Generation hit an unbalanced brace or lost its `Service` block.
    GenerationFailed = 3,
}

impl ExitCode {
    /// Numeric status for [`std::process::exit`].
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl From<TargetArg> for Target {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Admin => Self::Admin,
            TargetArg::App => Self::App,
            TargetArg::UniappX => Self::UniappX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::InvalidInput.code(), 2);
        assert_eq!(ExitCode::GenerationFailed.code(), 3);
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!(OutputFormat::from_str("json", true), Ok(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("PRETTY", true), Ok(OutputFormat::Pretty));
        assert!(OutputFormat::from_str("yaml", true).is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Pretty);
    }
}
