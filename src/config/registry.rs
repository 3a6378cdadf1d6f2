use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// MCP registry (Smithery) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Registry API root.
    /// TOML: `registry.base_url`. Default: `https://registry.smithery.ai`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Bearer token. When set the client runs authenticated and stops restricting
    /// results to locally runnable servers.
    /// TOML: `registry.api_key`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Servers per page.
    /// TOML: `registry.page_size`. Default: `24`.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout in seconds.
    /// TOML: `registry.timeout_secs`. Default: `30`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transport errors and 5xx answers.
    /// TOML: `registry.retry_max_times`. Default: `2`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,
}

impl RegistryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            retry_max_times: default_retry_max_times(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("https://registry.smithery.ai").expect("invalid fixed registry URL")
}

fn default_page_size() -> u32 {
    tome_schema::DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_max_times() -> usize {
    2
}
