//! Dictionary-key fetch for the `DictKey` union type.

use crate::response::ApiResponse;
use crate::transport::SchemaTransport;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct DictType {
    #[serde(default)]
    key: Option<String>,
}

/// Fetches the dictionary type keys.
///
/// Returns `None` when the endpoint is unreachable or answers with a
/// non-success code, in which case no `DictKey` type is emitted at all.
/// `Some(vec![])` means the dictionary exists but is empty.
///
/// # Examples
///
/// ```no_run
/// use epsgen_schema::{HttpTransport, fetch_dict_keys};
/// use std::time::Duration;
///
/// # async fn example() {
/// let keys = fetch_dict_keys(
///     &HttpTransport::new(),
///     "http://127.0.0.1:8001/admin/dict/info/types",
///     Duration::from_secs(5),
/// )
/// .await;
/// println!("{keys:?}");
/// # }
/// ```
pub async fn fetch_dict_keys<T>(transport: &T, url: &str, timeout: Duration) -> Option<Vec<String>>
where
    T: SchemaTransport + ?Sized,
{
    let body = match transport.get_json(url, timeout).await {
        Ok(body) => body,
        Err(e) => {
            warn!("dictionary endpoint unavailable → {}", url);
            debug!("dictionary fetch failed: {}", e);
            return None;
        }
    };

    let response: ApiResponse<Vec<DictType>> = match serde_json::from_value(body) {
        Ok(response) => response,
        Err(e) => {
            warn!("unexpected dictionary response from {}: {}", url, e);
            return None;
        }
    };

    if !response.is_success() {
        debug!("dictionary endpoint answered code {}", response.code);
        return None;
    }

    Some(
        response
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| item.key)
            .collect(),
    )
}
