use tome_schema::GeminiModelList;
use tracing::debug;

use crate::error::TomeError;
use crate::models::Model;

use super::client::ClientCore;

const GENERATE_CONTENT: &str = "generateContent";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    pub(crate) core: ClientCore,
    api_key: String,
}

impl GeminiClient {
    pub(crate) fn new(core: ClientCore) -> Result<Self, TomeError> {
        let api_key = core
            .api_key
            .clone()
            .ok_or(TomeError::MissingEngineOption("apiKey"))?;
        Ok(Self { core, api_key })
    }

    /// `GET {url}/models?key=..`. Models that cannot generate content are skipped.
    pub async fn models(&self) -> Result<Vec<Model>, TomeError> {
        let mut url = self.core.endpoint(&["models"])?;
        url.query_pairs_mut().append_pair("key", &self.api_key);

        let list: GeminiModelList = self.core.get_json(&url, None).await?;
        debug!(engine_id = ?self.core.engine_id, count = list.models.len(), "[gemini] Models fetched");

        Ok(list
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .as_ref()
                    .is_none_or(|methods| methods.iter().any(|s| s == GENERATE_CONTENT))
            })
            .map(|m| {
                let id = m.id().to_string();
                let display = if m.display_name.trim().is_empty() {
                    id.clone()
                } else {
                    m.display_name.clone()
                };
                self.core.model(id, display)
            })
            .collect())
    }
}
