//! Engine configuration.
//!
//! Loaded from YAML, then overridden by `KNURL_*` environment variables:
//!
//! ```yaml
//! http:
//!   timeout_secs: 30
//!   user_agent: "knurl/0.1"
//!   max_redirects: 10
//! websocket:
//!   response_time_ms: 10
//! ```

use serde::{Deserialize, Serialize};

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_REDIRECTS: u32 = 10;
pub const DEFAULT_WEBSOCKET_RESPONSE_TIME_MS: u64 = 10;

/// Flattened settings handed to engine constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub max_redirects: u32,
    pub websocket_response_time_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            user_agent: default_user_agent(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            websocket_response_time_ms: DEFAULT_WEBSOCKET_RESPONSE_TIME_MS,
        }
    }
}

fn default_user_agent() -> String {
    format!("knurl/{}", env!("CARGO_PKG_VERSION"))
}

/// On-disk shape of the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    http: HttpSection,
    #[serde(default)]
    websocket: WebSocketSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct HttpSection {
    #[serde(default)]
    timeout_secs: Option<u64>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    max_redirects: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct WebSocketSection {
    #[serde(default)]
    response_time_ms: Option<u64>,
}

impl EngineConfig {
    /// Parse a config from a YAML string. Missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        let file: ConfigFile = serde_yaml::from_str(yaml)
            .map_err(|e| format!("Failed to parse config YAML: {}", e))?;
        let defaults = Self::default();
        Ok(Self {
            http_timeout_secs: file.http.timeout_secs.unwrap_or(defaults.http_timeout_secs),
            user_agent: file.http.user_agent.unwrap_or(defaults.user_agent),
            max_redirects: file.http.max_redirects.unwrap_or(defaults.max_redirects),
            websocket_response_time_ms: file
                .websocket
                .response_time_ms
                .unwrap_or(defaults.websocket_response_time_ms),
        })
    }

    pub fn from_file(path: &str) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path, e))?;
        Self::from_yaml(&content)
    }

    /// Apply `KNURL_HTTP_TIMEOUT_SECS`, `KNURL_USER_AGENT` and
    /// `KNURL_MAX_REDIRECTS` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(timeout) = lookup("KNURL_HTTP_TIMEOUT_SECS") {
            match timeout.trim().parse() {
                Ok(secs) => self.http_timeout_secs = secs,
                Err(_) => tracing::warn!(
                    "[Config] Ignoring invalid KNURL_HTTP_TIMEOUT_SECS '{}'",
                    timeout
                ),
            }
        }
        if let Some(agent) = lookup("KNURL_USER_AGENT").filter(|a| !a.is_empty()) {
            self.user_agent = agent;
        }
        if let Some(redirects) = lookup("KNURL_MAX_REDIRECTS") {
            match redirects.trim().parse() {
                Ok(max) => self.max_redirects = max,
                Err(_) => tracing::warn!(
                    "[Config] Ignoring invalid KNURL_MAX_REDIRECTS '{}'",
                    redirects
                ),
            }
        }
        self
    }
}
