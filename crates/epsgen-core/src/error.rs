//! Error types for the EPS type generator.
//!
//! Only internal invariant violations (unbalanced braces in synthesized text,
//! a missing `Service` block) are meant to escape a generation cycle. Schema
//! unavailability and malformed caches are recovered where they happen and
//! never reach callers as errors.
//!
//! # Examples
//!
//! ```
//! use epsgen_core::{Error, Result};
//!
//! fn check_url(url: &str) -> Result<()> {
//!     if url.is_empty() {
//!         return Err(Error::ConfigError {
//!             message: "request URL cannot be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = check_url("").unwrap_err();
//! assert!(err.is_config_error());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the generator.
///
/// All library crates in the workspace return this type.
#[derive(Error, Debug)]
pub enum Error {
    /// The schema or dictionary endpoint could not be reached or answered
    /// with a non-success code.
    #[error("schema endpoint unavailable ({url}): {message}")]
    SchemaUnavailable {
        /// Requested URL
        url: String,
        /// Transport or application-level failure description
        message: String,
    },

    /// File system operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path that was being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Brace matching ran off the end of the text.
    ///
    /// The synthesizer controls the shape of the text it scans, so this
    /// always indicates a generator bug rather than bad user input.
    #[error("Unmatched braces in the template (scan started at byte {position})")]
    UnbalancedBraces {
        /// Byte offset where the scan started
        position: usize,
    },

    /// The flattener input has no `export type Service = {` header.
    #[error("Service type declaration not found in generated text")]
    MissingServiceBlock,

    /// Template registration or rendering failed.
    #[error("Template error: {message}")]
    TemplateError {
        /// Description of the template failure
        message: String,
    },

    /// Output formatting failed.
    #[error("Format error: {message}")]
    FormatError {
        /// Description of the formatting failure
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Invalid argument error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Returns `true` if the schema endpoint was unavailable.
    ///
    /// # Examples
    ///
    /// ```
    /// use epsgen_core::Error;
    ///
    /// let err = Error::SchemaUnavailable {
    ///     url: "http://localhost/admin/base/open/eps".to_string(),
    ///     message: "connection refused".to_string(),
    /// };
    /// assert!(err.is_schema_unavailable());
    /// ```
    #[must_use]
    pub const fn is_schema_unavailable(&self) -> bool {
        matches!(self, Self::SchemaUnavailable { .. })
    }

    /// Returns `true` for brace-matching failures.
    ///
    /// # Examples
    ///
    /// ```
    /// use epsgen_core::Error;
    ///
    /// let err = Error::UnbalancedBraces { position: 3 };
    /// assert!(err.is_unbalanced_braces());
    /// ```
    #[must_use]
    pub const fn is_unbalanced_braces(&self) -> bool {
        matches!(self, Self::UnbalancedBraces { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a formatting error.
    #[must_use]
    pub const fn is_format_error(&self) -> bool {
        matches!(self, Self::FormatError { .. })
    }

    /// Returns `true` if this is a serialization error.
    #[must_use]
    pub const fn is_serialization_error(&self) -> bool {
        matches!(self, Self::SerializationError { .. })
    }

    /// Returns `true` if this is an I/O error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns `true` for errors that must abort a generation cycle.
    ///
    /// # Examples
    ///
    /// ```
    /// use epsgen_core::Error;
    ///
    /// assert!(Error::MissingServiceBlock.is_invariant_violation());
    /// assert!(!Error::InvalidArgument("x".into()).is_invariant_violation());
    /// ```
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::UnbalancedBraces { .. } | Self::MissingServiceBlock
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Result type alias for generator operations.
pub type Result<T> = std::result::Result<T, Error>;
