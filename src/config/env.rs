use std::env;

use super::{ClientConfig, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_WS_BASE_URL};
use crate::core::websocket::DISPATCH_QUEUE_CAPACITY;

pub(super) const ENV_WS_BASE_URL: &str = "COZE_WS_BASE_URL";
pub(super) const ENV_API_TOKEN: &str = "COZE_API_TOKEN";
pub(super) const ENV_CONNECT_TIMEOUT_MS: &str = "COZE_CONNECT_TIMEOUT_MS";
pub(super) const ENV_DISPATCH_QUEUE_CAPACITY: &str = "COZE_DISPATCH_QUEUE_CAPACITY";
pub(super) const ENV_USER_AGENT_SUFFIX: &str = "COZE_USER_AGENT_SUFFIX";

/// Build a configuration from environment variables, falling back to
/// defaults for anything unset. Nothing is validated here.
pub(super) fn load_from_env() -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let ws_base_url = env::var(ENV_WS_BASE_URL).unwrap_or_else(|_| DEFAULT_WS_BASE_URL.to_string());
    let api_token = env::var(ENV_API_TOKEN).unwrap_or_default();

    let connect_timeout_ms = match env::var(ENV_CONNECT_TIMEOUT_MS) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("Invalid {ENV_CONNECT_TIMEOUT_MS} value {raw:?}: {e}"))?,
        Err(_) => DEFAULT_CONNECT_TIMEOUT_MS,
    };

    let dispatch_queue_capacity = match env::var(ENV_DISPATCH_QUEUE_CAPACITY) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|e| format!("Invalid {ENV_DISPATCH_QUEUE_CAPACITY} value {raw:?}: {e}"))?,
        Err(_) => DISPATCH_QUEUE_CAPACITY,
    };

    let user_agent_suffix = env::var(ENV_USER_AGENT_SUFFIX)
        .ok()
        .filter(|s| !s.trim().is_empty());

    Ok(ClientConfig {
        ws_base_url,
        api_token,
        connect_timeout_ms,
        dispatch_queue_capacity,
        user_agent_suffix,
    })
}
