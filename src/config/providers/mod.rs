use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::providers::{AllowList, EngineKind};

/// Global provider defaults (used when provider-level config is unset).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderDefaults {
    /// Optional upstream HTTP proxy. If set, used for reqwest clients.
    /// TOML: `providers.defaults.proxy`. Example: `http://127.0.0.1:1080`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Per-request timeout for model-list calls, in seconds.
    /// TOML: `providers.defaults.timeout_secs`. Default: `10`.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Max retry attempts for upstream calls.
    /// TOML: `providers.defaults.retry_max_times`. Default: `2`.
    #[serde(default = "default_retry_max_times")]
    pub retry_max_times: usize,
}

impl Default for ProviderDefaults {
    fn default() -> Self {
        Self {
            proxy: None,
            timeout_secs: default_timeout_secs(),
            retry_max_times: default_retry_max_times(),
        }
    }
}

/// Settings for one engine kind.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineProviderConfig {
    /// Which remotely reported models an engine of this kind exposes: `"all"` or a list.
    /// TOML: `providers.<kind>.model_list`.
    pub model_list: AllowList,

    /// Base URL used when an engine row carries no URL of its own.
    /// TOML: `providers.<kind>.default_url`.
    #[serde(default)]
    pub default_url: Option<Url>,

    /// Falls back to `providers.defaults.proxy`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// Falls back to `providers.defaults.timeout_secs`.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Falls back to `providers.defaults.retry_max_times`.
    #[serde(default)]
    pub retry_max_times: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct EngineProviderResolvedConfig {
    pub allow_list: AllowList,
    pub default_url: Option<Url>,
    pub proxy: Option<Url>,
    pub timeout: Duration,
    pub retry_max_times: usize,
}

impl EngineProviderConfig {
    fn new(model_list: AllowList, default_url: Option<&str>) -> Self {
        Self {
            model_list,
            default_url: default_url
                .map(|u| Url::parse(u).expect("invalid fixed provider URL")),
            proxy: None,
            timeout_secs: None,
            retry_max_times: None,
        }
    }

    pub fn resolve(&self, defaults: &ProviderDefaults) -> EngineProviderResolvedConfig {
        EngineProviderResolvedConfig {
            allow_list: self.model_list.clone(),
            default_url: self.default_url.clone(),
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(defaults.timeout_secs)),
            retry_max_times: self.retry_max_times.unwrap_or(defaults.retry_max_times),
        }
    }
}

/// All provider configurations.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub defaults: ProviderDefaults,

    #[serde(default = "default_ollama")]
    pub ollama: EngineProviderConfig,

    #[serde(default = "default_openai")]
    pub openai: EngineProviderConfig,

    #[serde(default = "default_gemini")]
    pub gemini: EngineProviderConfig,

    #[serde(default = "default_openai_compat")]
    pub openai_compat: EngineProviderConfig,
}

impl ProvidersConfig {
    pub fn resolve(&self, kind: EngineKind) -> EngineProviderResolvedConfig {
        let provider = match kind {
            EngineKind::Ollama => &self.ollama,
            EngineKind::OpenAi => &self.openai,
            EngineKind::Gemini => &self.gemini,
            EngineKind::OpenAiCompat => &self.openai_compat,
        };
        provider.resolve(&self.defaults)
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            defaults: ProviderDefaults::default(),
            ollama: default_ollama(),
            openai: default_openai(),
            gemini: default_gemini(),
            openai_compat: default_openai_compat(),
        }
    }
}

fn default_ollama() -> EngineProviderConfig {
    EngineProviderConfig::new(AllowList::All, Some("http://localhost:11434"))
}

fn default_openai() -> EngineProviderConfig {
    EngineProviderConfig::new(
        AllowList::only(["gpt-4o", "o4-mini", "gpt-4.5-preview", "gpt-4.1", "gpt-4.1-mini"]),
        Some("https://api.openai.com/v1"),
    )
}

fn default_gemini() -> EngineProviderConfig {
    EngineProviderConfig::new(
        AllowList::only([
            "gemini-2.5-pro",
            "gemini-2.5-flash",
            "gemini-2.0-flash-lite",
            "gemini-1.5-pro",
        ]),
        Some("https://generativelanguage.googleapis.com/v1beta"),
    )
}

fn default_openai_compat() -> EngineProviderConfig {
    EngineProviderConfig::new(AllowList::All, None)
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retry_max_times() -> usize {
    2
}
