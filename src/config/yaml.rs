use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present
/// here take precedence over environment variables.
///
/// # Example YAML structure
/// ```yaml
/// coze:
///   ws_base_url: "wss://ws.coze.cn"
///   api_token: "pat_xxx"
///   connect_timeout_ms: 10000
///   dispatch_queue_capacity: 256
///   user_agent_suffix: "my-app/1.0"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub coze: Option<CozeYaml>,
}

/// Connection settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CozeYaml {
    pub ws_base_url: Option<String>,
    pub api_token: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub dispatch_queue_capacity: Option<usize>,
    pub user_agent_suffix: Option<String>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
