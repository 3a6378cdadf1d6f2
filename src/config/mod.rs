mod basic;
mod providers;
mod registry;

pub use basic::BasicConfig;
pub use providers::{
    EngineProviderConfig, EngineProviderResolvedConfig, ProviderDefaults, ProvidersConfig,
};
pub use registry::RegistryConfig;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

use crate::providers::EngineKind;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core settings (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// MCP registry settings (see `registry` table in config.toml).
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Model provider settings (see `providers` table in config.toml).
    #[serde(default)]
    pub providers: ProvidersConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Builds a Figment that merges defaults and a config TOML file.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        }
    }

    /// Loads configuration by merging defaults and `config.toml` if present.
    pub fn from_optional_toml() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    /// Effective settings for one engine kind, with `providers.defaults` applied.
    pub fn engine_provider(&self, kind: EngineKind) -> EngineProviderResolvedConfig {
        self.providers.resolve(kind)
    }
}

/// Global, lazily-initialized configuration instance for the binary.
///
/// Library code takes `&Config` explicitly; only `main` reads this.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_optional_toml().unwrap_or_else(|err| {
        panic!("failed to extract configuration (defaults + optional config.toml): {err}")
    })
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::AllowList;

    #[test]
    fn default_allow_lists_per_kind() {
        let cfg = Config::default();
        assert_eq!(cfg.engine_provider(EngineKind::Ollama).allow_list, AllowList::All);
        assert_eq!(
            cfg.engine_provider(EngineKind::OpenAiCompat).allow_list,
            AllowList::All
        );
        match cfg.engine_provider(EngineKind::OpenAi).allow_list {
            AllowList::Only(names) => assert!(names.iter().any(|n| n == "gpt-4o")),
            AllowList::All => panic!("openai should default to an explicit allow-list"),
        }
        assert_eq!(cfg.registry.page_size, 24);
        assert_eq!(cfg.basic.toast_duration_ms, 3000);
    }

    #[test]
    fn toml_overrides_merge_over_defaults() {
        let toml = r#"
            [basic]
            loglevel = "debug"
            skipped_versions = ["0.9.0"]

            [registry]
            api_key = "secret"

            [providers.defaults]
            retry_max_times = 0
            timeout_secs = 4

            [providers.openai]
            model_list = "all"

            [providers.ollama]
            model_list = ["llama3"]
            timeout_secs = 1
        "#;

        let cfg: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap();

        assert_eq!(cfg.basic.loglevel, "debug");
        assert_eq!(cfg.basic.skipped_versions, vec!["0.9.0".to_string()]);
        assert_eq!(cfg.registry.api_key.as_deref(), Some("secret"));
        assert_eq!(cfg.registry.base_url.as_str(), "https://registry.smithery.ai/");

        let openai = cfg.engine_provider(EngineKind::OpenAi);
        assert_eq!(openai.allow_list, AllowList::All);
        assert_eq!(openai.retry_max_times, 0);
        assert_eq!(openai.timeout.as_secs(), 4);

        let ollama = cfg.engine_provider(EngineKind::Ollama);
        assert_eq!(ollama.allow_list, AllowList::Only(vec!["llama3".to_string()]));
        assert_eq!(ollama.timeout.as_secs(), 1);
    }
}
