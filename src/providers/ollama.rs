use tome_schema::OllamaTagList;
use tracing::debug;

use crate::error::TomeError;
use crate::models::Model;

use super::client::ClientCore;

#[derive(Debug, Clone)]
pub struct OllamaClient {
    pub(crate) core: ClientCore,
}

impl OllamaClient {
    pub(crate) fn new(core: ClientCore) -> Self {
        Self { core }
    }

    /// `GET {url}/api/tags`.
    pub async fn models(&self) -> Result<Vec<Model>, TomeError> {
        let url = self.core.endpoint(&["api", "tags"])?;
        let tags: OllamaTagList = self.core.get_json(&url, None).await?;
        debug!(engine_id = ?self.core.engine_id, count = tags.models.len(), "[ollama] Tags fetched");

        Ok(tags
            .models
            .into_iter()
            .map(|m| self.core.model(m.name.clone(), m.name))
            .collect())
    }
}
