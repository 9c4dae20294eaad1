//! Client configuration
//!
//! Settings come from environment variables and an optional YAML file.
//! Priority: YAML > ENV vars > .env values > defaults. The `.env` file is
//! loaded by the binary at startup, so library callers only see real
//! environment variables.
//!
//! # Example
//! ```rust,no_run
//! use coze_ws::config::ClientConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ClientConfig::from_env()?;
//!
//! // Load from YAML file with environment variable fallbacks
//! let config = ClientConfig::from_file(&PathBuf::from("config.yaml"))?;
//! println!("Connecting to {}", config.ws_base_url);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::url_validation::validate_ws_base_url;

mod env;
mod yaml;

pub use yaml::{CozeYaml, YamlConfig};

/// Default realtime host
pub const DEFAULT_WS_BASE_URL: &str = "wss://ws.coze.cn";

/// Default handshake timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Connection settings shared by every session a client opens.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket base URL, `ws://` or `wss://`
    /// Default: wss://ws.coze.cn
    pub ws_base_url: String,
    /// Personal access token or OAuth access token, sent as a bearer token
    pub api_token: String,
    /// Handshake timeout
    /// Default: 10000
    pub connect_timeout_ms: u64,
    /// Capacity of each session's inbound dispatch queue
    /// Default: 256
    pub dispatch_queue_capacity: usize,
    /// Appended to the `User-Agent` header
    pub user_agent_suffix: Option<String>,
}

impl ClientConfig {
    /// Configuration with the given token and defaults for everything else.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            ws_base_url: DEFAULT_WS_BASE_URL.to_string(),
            api_token: api_token.into(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            dispatch_queue_capacity: crate::core::websocket::DISPATCH_QUEUE_CAPACITY,
            user_agent_suffix: None,
        }
    }

    /// Load configuration from environment variables and validate it.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = env::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to environment
    /// variables and then defaults for anything the file leaves out.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge_config(env::load_from_env()?, yaml_config);
        config.validate()?;
        Ok(config)
    }

    /// Check that the settings can be used to open sessions.
    pub fn validate(&self) -> Result<(), String> {
        validate_ws_base_url(&self.ws_base_url)
            .map_err(|e| format!("Invalid ws_base_url {:?}: {e}", self.ws_base_url))?;

        if self.api_token.trim().is_empty() {
            return Err("api_token is required (set COZE_API_TOKEN or coze.api_token)".to_string());
        }
        if self.connect_timeout_ms == 0 {
            return Err("connect_timeout_ms must be greater than zero".to_string());
        }
        if self.dispatch_queue_capacity == 0 {
            return Err("dispatch_queue_capacity must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Apply YAML values over an environment-derived base.
fn merge_config(mut base: ClientConfig, yaml: YamlConfig) -> ClientConfig {
    let Some(coze) = yaml.coze else {
        return base;
    };

    if let Some(url) = coze.ws_base_url {
        base.ws_base_url = url;
    }
    if let Some(token) = coze.api_token {
        base.api_token = token;
    }
    if let Some(timeout) = coze.connect_timeout_ms {
        base.connect_timeout_ms = timeout;
    }
    if let Some(capacity) = coze.dispatch_queue_capacity {
        base.dispatch_queue_capacity = capacity;
    }
    if let Some(suffix) = coze.user_agent_suffix {
        base.user_agent_suffix = Some(suffix);
    }
    base
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("ws_base_url", &self.ws_base_url)
            .field("api_token", &"[REDACTED]")
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("dispatch_queue_capacity", &self.dispatch_queue_capacity)
            .field("user_agent_suffix", &self.user_agent_suffix)
            .finish()
    }
}

/// Zeroize the token when the configuration is dropped.
impl Drop for ClientConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        self.api_token.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::env::*;
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn cleanup_env_vars() {
        unsafe {
            std::env::remove_var(ENV_WS_BASE_URL);
            std::env::remove_var(ENV_API_TOKEN);
            std::env::remove_var(ENV_CONNECT_TIMEOUT_MS);
            std::env::remove_var(ENV_DISPATCH_QUEUE_CAPACITY);
            std::env::remove_var(ENV_USER_AGENT_SUFFIX);
        }
    }

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new("pat_test");
        assert_eq!(config.ws_base_url, "wss://ws.coze.cn");
        assert_eq!(config.connect_timeout_ms, 10_000);
        assert_eq!(config.dispatch_queue_capacity, 256);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", ClientConfig::new("pat_super_secret"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("pat_super_secret"));
    }

    fn config_with(edit: impl FnOnce(&mut ClientConfig)) -> ClientConfig {
        let mut config = ClientConfig::new("pat");
        edit(&mut config);
        config
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = vec![
            (
                config_with(|c| c.ws_base_url = "https://api.coze.cn".to_string()),
                "ws_base_url",
            ),
            (
                config_with(|c| c.ws_base_url = "wss://ws.coze.cn?x=1".to_string()),
                "ws_base_url",
            ),
            (ClientConfig::new("  "), "api_token"),
            (config_with(|c| c.connect_timeout_ms = 0), "connect_timeout_ms"),
            (
                config_with(|c| c.dispatch_queue_capacity = 0),
                "dispatch_queue_capacity",
            ),
        ];

        for (config, field) in cases {
            match config.validate() {
                Err(msg) => assert!(msg.contains(field), "{msg} should mention {field}"),
                Ok(()) => panic!("Expected validation failure for {field}"),
            }
        }
    }

    #[test]
    #[serial]
    fn test_from_env() {
        cleanup_env_vars();
        unsafe {
            std::env::set_var(ENV_API_TOKEN, "env-token");
            std::env::set_var(ENV_WS_BASE_URL, "ws://127.0.0.1:9000");
            std::env::set_var(ENV_CONNECT_TIMEOUT_MS, "1500");
            std::env::set_var(ENV_USER_AGENT_SUFFIX, "tests/1.0");
        }

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.api_token, "env-token");
        assert_eq!(config.ws_base_url, "ws://127.0.0.1:9000");
        assert_eq!(config.connect_timeout_ms, 1500);
        assert_eq!(config.dispatch_queue_capacity, 256);
        assert_eq!(config.user_agent_suffix.as_deref(), Some("tests/1.0"));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_token() {
        cleanup_env_vars();

        let result = ClientConfig::from_env();
        assert!(result.unwrap_err().to_string().contains("api_token"));
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_number() {
        cleanup_env_vars();
        unsafe {
            std::env::set_var(ENV_API_TOKEN, "env-token");
            std::env::set_var(ENV_DISPATCH_QUEUE_CAPACITY, "lots");
        }

        let result = ClientConfig::from_env();
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains(ENV_DISPATCH_QUEUE_CAPACITY)
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        let yaml_content = r#"
coze:
  api_token: "yaml-token"
  connect_timeout_ms: 3000
"#;
        fs::write(&config_path, yaml_content).unwrap();

        unsafe {
            std::env::set_var(ENV_API_TOKEN, "env-token");
            std::env::set_var(ENV_WS_BASE_URL, "wss://ws.coze.com");
        }

        let config = ClientConfig::from_file(&config_path).unwrap();

        // YAML overrides ENV
        assert_eq!(config.api_token, "yaml-token");
        assert_eq!(config.connect_timeout_ms, 3000);
        // ENV fills what YAML leaves out
        assert_eq!(config.ws_base_url, "wss://ws.coze.com");

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_missing_file() {
        cleanup_env_vars();

        let result = ClientConfig::from_file(&PathBuf::from("/nonexistent/config.yaml"));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    #[serial]
    fn test_from_file_invalid_base_url() {
        cleanup_env_vars();

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(
            &config_path,
            "coze:\n  api_token: \"t\"\n  ws_base_url: \"http://ws.coze.cn\"\n",
        )
        .unwrap();

        let result = ClientConfig::from_file(&config_path);
        assert!(result.unwrap_err().to_string().contains("ws_base_url"));
    }
}
