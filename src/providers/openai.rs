use tome_schema::OpenaiModelList;
use tracing::debug;

use crate::error::TomeError;
use crate::models::Model;

use super::client::ClientCore;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    pub(crate) core: ClientCore,
}

impl OpenAiClient {
    pub(crate) fn new(core: ClientCore) -> Self {
        Self { core }
    }

    /// `GET {url}/models`, with bearer auth when a key is configured.
    pub async fn models(&self) -> Result<Vec<Model>, TomeError> {
        let url = self.core.endpoint(&["models"])?;
        let list: OpenaiModelList = self
            .core
            .get_json(&url, self.core.api_key.as_deref())
            .await?;
        debug!(
            provider = self.core.provider,
            engine_id = ?self.core.engine_id,
            count = list.data.len(),
            "[openai] Models fetched"
        );

        Ok(list
            .data
            .into_iter()
            .map(|m| self.core.model(m.id.clone(), m.id))
            .collect())
    }
}
