//! Application-level response envelope shared by the schema and dictionary
//! endpoints.

use serde::Deserialize;
use serde_json::Value;

/// Application code the backend uses for success.
pub const SUCCESS_CODE: i64 = 1000;

/// `{code, data, message}` response envelope.
///
/// # Examples
///
/// ```
/// use epsgen_schema::ApiResponse;
///
/// let response: ApiResponse = serde_json::from_str(r#"{"code":1000,"data":[]}"#).unwrap();
/// assert!(response.is_success());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiResponse<T = Value> {
    /// Application code; [`SUCCESS_CODE`] on success.
    #[serde(default)]
    pub code: i64,

    /// Payload.
    #[serde(default)]
    pub data: Option<T>,

    /// Failure description.
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// `true` when `code` equals [`SUCCESS_CODE`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Failure description, with a generic fallback.
    #[must_use]
    pub fn message_or_default(&self) -> &str {
        self.message
            .as_deref()
            .filter(|message| !message.is_empty())
            .unwrap_or("Failed to fetch data")
    }
}
