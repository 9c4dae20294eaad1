//! Client identification headers sent with every WebSocket handshake.
//!
//! Two headers are produced:
//!
//! - `User-Agent`: `cozers/<version> rust/<toolchain> <os>/<os-version>`
//! - `X-Coze-Client-User-Agent`: the same facts as a JSON object
//!
//! Building either header never fails the handshake. When a value cannot
//! be produced the header is left out and a warning is logged.

use http::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use once_cell::sync::Lazy;
use serde::Serialize;
use tracing::warn;

pub const CLIENT_USER_AGENT_HEADER: &str = "x-coze-client-user-agent";

const SDK_NAME: &str = "cozers";
const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");
const RUST_VERSION: &str = env!("CARGO_PKG_RUST_VERSION");

/// Facts reported in `X-Coze-Client-User-Agent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientUserAgent {
    pub version: String,
    pub lang: String,
    pub lang_version: String,
    pub os_name: String,
    pub os_version: String,
}

static CLIENT_USER_AGENT: Lazy<ClientUserAgent> = Lazy::new(|| ClientUserAgent {
    version: SDK_VERSION.to_string(),
    lang: "rust".to_string(),
    lang_version: lang_version(),
    os_name: std::env::consts::OS.to_string(),
    os_version: os_version(),
});

fn lang_version() -> String {
    if RUST_VERSION.is_empty() {
        "unknown".to_string()
    } else {
        RUST_VERSION.to_string()
    }
}

fn os_version() -> String {
    #[cfg(target_os = "linux")]
    {
        match std::fs::read_to_string("/proc/sys/kernel/osrelease") {
            Ok(release) => return release.trim().to_string(),
            Err(e) => warn!(error = %e, "Could not read kernel release for user agent"),
        }
    }
    "unknown".to_string()
}

/// Process-wide client description.
pub fn client_user_agent() -> &'static ClientUserAgent {
    &CLIENT_USER_AGENT
}

/// Plain `User-Agent` string, optionally extended with an application suffix.
pub fn user_agent(suffix: Option<&str>) -> String {
    let ua = client_user_agent();
    let base = format!(
        "{SDK_NAME}/{} rust/{} {}/{}",
        ua.version, ua.lang_version, ua.os_name, ua.os_version
    );
    match suffix {
        Some(suffix) if !suffix.trim().is_empty() => format!("{base} {}", suffix.trim()),
        _ => base,
    }
}

/// Insert both identification headers into `headers`.
///
/// A header whose value cannot be built is skipped with a warning.
pub fn apply_user_agent_headers(headers: &mut HeaderMap, suffix: Option<&str>) {
    match HeaderValue::from_str(&user_agent(suffix)) {
        Ok(value) => {
            headers.insert(USER_AGENT, value);
        }
        Err(e) => warn!(error = %e, "Omitting User-Agent header"),
    }

    let json = match serde_json::to_string(client_user_agent()) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Omitting {} header", CLIENT_USER_AGENT_HEADER);
            return;
        }
    };
    match HeaderValue::from_str(&json) {
        Ok(value) => {
            headers.insert(HeaderName::from_static(CLIENT_USER_AGENT_HEADER), value);
        }
        Err(e) => warn!(error = %e, "Omitting {} header", CLIENT_USER_AGENT_HEADER),
    }
}
