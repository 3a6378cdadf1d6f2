use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ProvidersConfig;
use crate::db::{Row, RowStore};
use crate::error::TomeError;
use crate::notify::StartupWarning;
use crate::persist::{Collection, Identified, Persistable, Repository, SyncReport};
use crate::providers::{ClientOptions, EngineClient, EngineKind, ProviderRuntime};

use super::Model;

pub const OLLAMA_UNREACHABLE: &str =
    "Ollama server not found. Please ensure it is running and accessible.";

/// A configured model provider ("engine") and the models it currently offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    pub id: Option<i64>,
    pub name: String,
    pub kind: EngineKind,
    pub options: ClientOptions,
    /// Filled on hydration and after save; not stored.
    pub models: Vec<Model>,
}

impl Engine {
    pub fn new(name: impl Into<String>, kind: EngineKind, options: ClientOptions) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind,
            options,
            models: Vec::new(),
        }
    }

    pub fn client(&self, ctx: &EngineContext) -> Result<EngineClient, TomeError> {
        let runtime = ctx.runtime(self.kind)?;
        EngineClient::new(self.kind, &self.options, self.id, runtime)
    }

    /// Re-reads the model list from the provider, applying the kind's allow-list.
    ///
    /// Never fails: an unusable engine simply offers no models. An Ollama engine whose
    /// server does not answer also raises the startup warning.
    pub async fn refresh_models(&mut self, ctx: &EngineContext) {
        let client = match self.client(ctx) {
            Ok(client) => client,
            Err(e) => {
                warn!(
                    engine.id = ?self.id,
                    engine.name = %self.name,
                    engine.kind = %self.kind,
                    error = %e,
                    "Engine is not usable; loaded without models"
                );
                self.models = Vec::new();
                return;
            }
        };

        self.models = match self.fetch_models(&client, ctx).await {
            Ok(models) => models,
            Err(e) => {
                warn!(
                    engine.id = ?self.id,
                    engine.name = %self.name,
                    engine.kind = %self.kind,
                    error = %e,
                    "Model list unavailable; engine loaded without models"
                );
                if self.kind == EngineKind::Ollama {
                    ctx.startup.set(OLLAMA_UNREACHABLE);
                }
                Vec::new()
            }
        };
    }

    async fn fetch_models(
        &self,
        client: &EngineClient,
        ctx: &EngineContext,
    ) -> Result<Vec<Model>, TomeError> {
        let remote = client.models().await?;

        let mut models = ctx.runtime(self.kind)?.cfg.allow_list.apply(remote);
        for model in &mut models {
            model.engine_id = self.id;
            model.engine_name = self.name.clone();
        }
        debug!(engine.id = ?self.id, engine.kind = %self.kind, count = models.len(), "Engine models refreshed");
        Ok(models)
    }
}

impl Identified for Engine {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

#[async_trait]
impl Persistable for Engine {
    const TABLE: &'static str = "engines";
    type Context = EngineContext;

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
        for model in &mut self.models {
            model.engine_id = Some(id);
        }
    }

    fn to_row(&self) -> Result<Row, TomeError> {
        Ok(Row::new()
            .with("name", self.name.as_str())
            .with("type", self.kind.as_str())
            .with("options", serde_json::to_string(&self.options)?))
    }

    async fn from_row(row: Row, ctx: &EngineContext) -> Result<Self, TomeError> {
        let table = Self::TABLE;
        let kind = row
            .text(table, "type")?
            .parse::<EngineKind>()
            .map_err(|e| TomeError::malformed(table, e.to_string()))?;

        let mut engine = Self {
            id: Some(row.require_id(table)?),
            name: row.text(table, "name")?.to_string(),
            kind,
            options: row.json(table, "options")?,
            models: Vec::new(),
        };
        engine.refresh_models(ctx).await;
        Ok(engine)
    }
}

/// Hydration context for engines: one HTTP runtime per kind plus the warning sink.
pub struct EngineContext {
    runtimes: HashMap<EngineKind, ProviderRuntime>,
    pub startup: StartupWarning,
}

impl EngineContext {
    pub fn new(providers: &ProvidersConfig, startup: StartupWarning) -> Result<Self, TomeError> {
        let runtimes = EngineKind::ALL
            .into_iter()
            .map(|kind| Ok((kind, ProviderRuntime::new(providers.resolve(kind))?)))
            .collect::<Result<HashMap<_, _>, TomeError>>()?;
        Ok(Self { runtimes, startup })
    }

    pub fn runtime(&self, kind: EngineKind) -> Result<&ProviderRuntime, TomeError> {
        self.runtimes
            .get(&kind)
            .ok_or_else(|| TomeError::UnexpectedError(format!("no runtime for {kind}")))
    }
}

/// Engines plus the flattened model list derived from them.
#[derive(Clone)]
pub struct Engines {
    repo: Repository<Engine>,
    models: Collection<Model>,
}

impl Engines {
    pub fn new(store: Arc<dyn RowStore>, ctx: EngineContext) -> Self {
        Self {
            repo: Repository::new(store, ctx),
            models: Collection::new(),
        }
    }

    pub fn repository(&self) -> &Repository<Engine> {
        &self.repo
    }

    pub fn collection(&self) -> &Collection<Engine> {
        self.repo.collection()
    }

    /// Every model of every loaded engine.
    pub fn models(&self) -> &Collection<Model> {
        &self.models
    }

    pub fn all(&self) -> Arc<Vec<Engine>> {
        self.repo.all()
    }

    pub fn get(&self, id: i64) -> Option<Engine> {
        self.repo.get(id)
    }

    pub fn find_model(&self, name: &str) -> Option<Model> {
        self.models.snapshot().iter().find(|m| m.name == name).cloned()
    }

    pub async fn sync(&self) -> Result<SyncReport, TomeError> {
        let report = self.repo.sync().await?;
        self.rebuild_models();
        Ok(report)
    }

    /// Saves the engine, then refreshes its models against the (possibly new) settings.
    pub async fn save(&self, engine: &mut Engine) -> Result<i64, TomeError> {
        let id = self.repo.save(engine).await?;
        engine.refresh_models(self.repo.context()).await;
        self.repo.collection().upsert(engine.clone());
        self.rebuild_models();
        info!(engine.id = id, engine.kind = %engine.kind, models = engine.models.len(), "Engine saved");
        Ok(id)
    }

    pub async fn delete(&self, id: i64) -> Result<(), TomeError> {
        self.repo.delete(id).await?;
        self.rebuild_models();
        Ok(())
    }

    fn rebuild_models(&self) {
        let models: Vec<Model> = self
            .repo
            .all()
            .iter()
            .flat_map(|engine| engine.models.iter().cloned())
            .collect();
        self.models.replace(models);
    }
}
