/// Configuration schema and defaults for chimera.
///
/// Sections: `[api]`, `[polling]`, `[logging]`. Every field has a built-in
/// default; a config file only needs the keys it wants to change.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_BASE_URL;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level chimera configuration, as stored in `~/.chimera/config.toml`
/// and `.chimera.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChimeraConfig {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Remote service connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Service base URL; endpoint paths are appended to it.
    pub base_url: String,
    /// Per-call timeout in milliseconds. Expiry is reported as a network failure.
    pub timeout_ms: u64,
    /// Extra attempts for a GET after a transport failure. `0` means a single
    /// attempt. POSTs are never retried.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    pub retry_backoff_ms: u64,
    /// Headers sent with every request. Override the JSON content type here.
    pub headers: BTreeMap<String, String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: 10_000,
            max_retries: 0,
            retry_backoff_ms: 250,
            headers: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// [polling]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between background refreshes of status and monitoring data.
    pub interval_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 10 }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append action outcomes to `~/.chimera/sync-log.jsonl`.
    pub journal: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { journal: true }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl ChimeraConfig {
    /// Annotated default config file written by `chimera config init`.
    pub fn default_toml() -> String {
        r#"# chimera configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (CHIMERA_*)
#   2. Project config (.chimera.toml in current directory)
#   3. User global config (~/.chimera/config.toml)
#   4. Built-in defaults

[api]
base_url = "http://localhost:5000/api"   # or CHIMERA_API_URL
timeout_ms = 10000
max_retries = 0                          # GETs only, on network failures
retry_backoff_ms = 250

[api.headers]
# Authorization = "Bearer ..."

[polling]
interval_secs = 10

[logging]
journal = true                           # ~/.chimera/sync-log.jsonl
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_conventions() {
        let config = ChimeraConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:5000/api");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.api.max_retries, 0);
        assert_eq!(config.polling.interval_secs, 10);
        assert!(config.logging.journal);
    }

    #[test]
    fn default_toml_parses_back_to_defaults() {
        let config: ChimeraConfig = toml::from_str(&ChimeraConfig::default_toml()).unwrap();
        assert_eq!(config, ChimeraConfig::default());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let config: ChimeraConfig = toml::from_str(
            r#"
[api]
base_url = "http://bot.internal:8080/api"

[api.headers]
Authorization = "Bearer token"
"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://bot.internal:8080/api");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.api.headers["Authorization"], "Bearer token");
        assert_eq!(config.polling.interval_secs, 10);
    }

    #[test]
    fn empty_toml_is_default() {
        let config: ChimeraConfig = toml::from_str("").unwrap();
        assert_eq!(config, ChimeraConfig::default());
    }
}
