use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::{DbActorHandle, RowStore};
use crate::error::TomeError;
use crate::models::{EngineContext, Engines, McpServer};
use crate::notify::{StartupWarning, Toasts};
use crate::persist::{Repository, SyncReport};
use crate::providers::EngineKind;
use crate::registry::RegistryClient;
use crate::updates::{self, ManifestUpdateSource, UpdateSource};

/// Everything the UI talks to, wired from one [`Config`].
#[derive(Clone)]
pub struct Tome {
    pub db: DbActorHandle,
    pub engines: Engines,
    pub mcp_servers: Repository<McpServer>,
    pub registry: Arc<RegistryClient>,
    pub toasts: Toasts,
    pub startup_warning: StartupWarning,
    update_source: Option<Arc<dyn UpdateSource>>,
    skipped_versions: Vec<String>,
}

impl Tome {
    pub async fn bootstrap(cfg: &Config) -> Result<Self, TomeError> {
        // Log resolved config here so `main` stays wiring-only.
        info!(
            database_url = %cfg.basic.database_url,
            loglevel = %cfg.basic.loglevel,
            toast_duration_ms = cfg.basic.toast_duration_ms,
            update_manifest_url = %cfg.basic.update_manifest_url.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
            "Basic config loaded"
        );
        info!(
            registry_base_url = %cfg.registry.base_url,
            registry_authenticated = cfg.registry.api_key.is_some(),
            registry_page_size = cfg.registry.page_size,
            registry_timeout_secs = cfg.registry.timeout_secs,
            "Registry config (effective)"
        );
        info!(
            providers_defaults_proxy = %cfg.providers.defaults.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
            providers_defaults_timeout_secs = cfg.providers.defaults.timeout_secs,
            providers_defaults_retry_max_times = cfg.providers.defaults.retry_max_times,
            "Provider defaults loaded"
        );
        for kind in EngineKind::ALL {
            let resolved = cfg.engine_provider(kind);
            info!(
                provider = %kind,
                default_url = %resolved.default_url.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
                model_list = ?resolved.allow_list,
                timeout = ?resolved.timeout,
                "Provider config (effective)"
            );
        }

        let db = crate::db::spawn(&cfg.basic.database_url).await?;
        let store: Arc<dyn RowStore> = Arc::new(db.clone());

        let startup_warning = StartupWarning::new();
        let engine_ctx = EngineContext::new(&cfg.providers, startup_warning.clone())?;

        let update_source = match cfg.basic.update_manifest_url.clone() {
            Some(url) => Some(Arc::new(ManifestUpdateSource::new(url)?) as Arc<dyn UpdateSource>),
            None => None,
        };

        Ok(Self {
            db,
            engines: Engines::new(store.clone(), engine_ctx),
            mcp_servers: Repository::new(store, ()),
            registry: Arc::new(RegistryClient::new(&cfg.registry)?),
            toasts: Toasts::new(Duration::from_millis(cfg.basic.toast_duration_ms)),
            startup_warning,
            update_source,
            skipped_versions: cfg.basic.skipped_versions.clone(),
        })
    }

    /// Loads every table; rows that fail to load are reported as error toasts.
    pub async fn sync_all(&self) -> Result<Vec<SyncReport>, TomeError> {
        let (engines, servers) = tokio::join!(self.engines.sync(), self.mcp_servers.sync());
        let reports = vec![engines?, servers?];

        for report in &reports {
            for failure in &report.failures {
                let id = failure
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "?".to_string());
                self.toasts.error(
                    format!("Could not load {} row {id}: {}", report.table, failure.error),
                    None,
                );
            }
        }
        Ok(reports)
    }

    pub async fn is_up_to_date(&self) -> bool {
        updates::is_up_to_date(self.update_source.as_deref(), &self.skipped_versions).await
    }

    pub fn shutdown(&self) {
        warn!("Stopping database actor");
        self.db.stop();
    }
}
