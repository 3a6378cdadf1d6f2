use serde::{Deserialize, Serialize};
use url::Url;

/// Basic (core) configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BasicConfig {
    /// Database URL for SQLite.
    /// TOML: `basic.database_url`. Default: `sqlite://tome.db`.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Log level for tracing subscriber initialization (e.g., "error", "warn", "info", "debug", "trace").
    /// TOML: `basic.loglevel`. Default: `info`.
    #[serde(default = "default_loglevel")]
    pub loglevel: String,

    /// How long a toast stays visible when the caller gives no duration.
    /// TOML: `basic.toast_duration_ms`. Default: `3000`.
    #[serde(default = "default_toast_duration_ms")]
    pub toast_duration_ms: u64,

    /// Versions the user chose to skip; the update check reports them as up to date.
    /// TOML: `basic.skipped_versions`.
    #[serde(default)]
    pub skipped_versions: Vec<String>,

    /// Update manifest (`{"version": "...", "notes": "..."}`). No update check when unset.
    /// TOML: `basic.update_manifest_url`.
    #[serde(default)]
    pub update_manifest_url: Option<Url>,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            loglevel: default_loglevel(),
            toast_duration_ms: default_toast_duration_ms(),
            skipped_versions: Vec::new(),
            update_manifest_url: None,
        }
    }
}

fn default_database_url() -> String {
    "sqlite://tome.db".to_string()
}

fn default_loglevel() -> String {
    "info".to_string()
}

fn default_toast_duration_ms() -> u64 {
    3000
}
