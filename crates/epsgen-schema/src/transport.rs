//! Schema transport.
//!
//! Generation only ever needs "GET this URL and give me JSON". The
//! [`SchemaTransport`] trait is that seam: [`HttpTransport`] implements it
//! with reqwest, and tests plug in in-memory stubs.

use async_trait::async_trait;
use epsgen_core::{Error, Result};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Fetches JSON documents from the backend.
#[async_trait]
pub trait SchemaTransport: Send + Sync {
    /// Issues a GET request and parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaUnavailable`] on connection failure, timeout,
    /// a non-2xx status, or an unparseable body.
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value>;
}

#[async_trait]
impl<T: SchemaTransport + ?Sized> SchemaTransport for Arc<T> {
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value> {
        (**self).get_json(url, timeout).await
    }
}

/// reqwest-backed transport.
///
/// # Examples
///
/// ```no_run
/// use epsgen_schema::{HttpTransport, SchemaTransport};
/// use std::time::Duration;
///
/// # async fn example() -> epsgen_core::Result<()> {
/// let transport = HttpTransport::new();
/// let body = transport
///     .get_json("http://127.0.0.1:8001/admin/base/open/eps", Duration::from_secs(5))
///     .await?;
/// println!("{body}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport around an existing client (proxies, headers).
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SchemaTransport for HttpTransport {
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value> {
        let unavailable = |message: String| Error::SchemaUnavailable {
            url: url.to_string(),
            message,
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| unavailable(e.to_string()))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| unavailable(format!("invalid JSON body: {e}")))
    }
}
