//! URL validation for realtime endpoints
//!
//! The configured base URL must be an absolute `ws://` or `wss://` URL with
//! a host and no query or fragment. Endpoint URLs are built by appending a
//! fixed sub-protocol path and optional query parameters to that base.

use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(#[from] url::ParseError),

    #[error("URL scheme must be ws or wss, got: {0}")]
    WebsocketSchemeRequired(String),

    #[error("URL must have a host")]
    MissingHost,

    #[error("Base URL must not carry a query or fragment")]
    UnexpectedQuery,
}

/// Validates a WebSocket base URL such as `wss://ws.coze.cn`.
///
/// Returns the parsed URL on success.
pub fn validate_ws_base_url(raw: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(raw.trim())?;

    match url.scheme() {
        "ws" | "wss" => {}
        other => return Err(UrlValidationError::WebsocketSchemeRequired(other.to_string())),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(UrlValidationError::UnexpectedQuery);
    }

    Ok(url)
}

/// Builds `<base><path>?<query>` from a validated base URL.
///
/// A trailing slash on the base and a leading slash on `path` are merged,
/// and any path prefix on the base (for proxies) is preserved.
pub fn build_endpoint_url(base: &Url, path: &str, query: &[(&str, &str)]) -> Url {
    let mut url = base.clone();
    let prefix = base.path().trim_end_matches('/');
    let suffix = path.trim_start_matches('/');
    url.set_path(&format!("{prefix}/{suffix}"));

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    url
}
