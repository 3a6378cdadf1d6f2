use backon::ExponentialBuilder;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::config::EngineProviderResolvedConfig;
use crate::error::TomeError;

use super::upstream_retry::retry_policy;

/// Connection options stored as JSON in an engine row.
///
/// Both fields may be empty; empty means "use the provider default" (URL) or "anonymous" (key).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

impl ClientOptions {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        Some(self.url.trim()).filter(|s| !s.is_empty())
    }

    pub fn api_key(&self) -> Option<&str> {
        Some(self.api_key.trim()).filter(|s| !s.is_empty())
    }
}

/// Shared HTTP client and settings for one engine kind.
#[derive(Debug, Clone)]
pub struct ProviderRuntime {
    pub cfg: EngineProviderResolvedConfig,
    pub(crate) http: reqwest::Client,
}

impl ProviderRuntime {
    pub fn new(cfg: EngineProviderResolvedConfig) -> Result<Self, TomeError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("tome/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(cfg.timeout);
        if let Some(proxy_url) = cfg.proxy.as_ref() {
            match reqwest::Proxy::all(proxy_url.as_str()) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => warn!(proxy = %proxy_url, error = %e, "Ignoring invalid provider proxy"),
            }
        }
        let http = builder.build()?;
        Ok(Self { cfg, http })
    }

    pub(crate) fn retry_policy(&self) -> ExponentialBuilder {
        retry_policy(self.cfg.retry_max_times)
    }
}
