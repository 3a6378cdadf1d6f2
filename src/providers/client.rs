use backon::ExponentialBuilder;
use serde::de::DeserializeOwned;
use tracing::warn;
use url::Url;

use crate::error::TomeError;
use crate::models::Model;
use crate::utils::logging::response_preview;

use super::gemini::GeminiClient;
use super::ollama::OllamaClient;
use super::openai::OpenAiClient;
use super::upstream_retry::get_with_retry;
use super::{ClientOptions, EngineKind, ProviderRuntime};

/// Model-list client for one engine, chosen by its kind.
#[derive(Debug, Clone)]
pub enum EngineClient {
    Ollama(OllamaClient),
    /// Serves both `openai` and `openai-compat` engines.
    OpenAi(OpenAiClient),
    Gemini(GeminiClient),
}

impl EngineClient {
    pub fn new(
        kind: EngineKind,
        options: &ClientOptions,
        engine_id: Option<i64>,
        runtime: &ProviderRuntime,
    ) -> Result<Self, TomeError> {
        let base_url = match options.url() {
            Some(raw) => Url::parse(raw)?,
            None => runtime
                .cfg
                .default_url
                .clone()
                .ok_or(TomeError::MissingEngineOption("url"))?,
        };
        let core = ClientCore {
            provider: kind.as_str(),
            http: runtime.http.clone(),
            base_url,
            api_key: options.api_key().map(str::to_string),
            engine_id,
            retry_policy: runtime.retry_policy(),
        };

        Ok(match kind {
            EngineKind::Ollama => EngineClient::Ollama(OllamaClient::new(core)),
            EngineKind::OpenAi | EngineKind::OpenAiCompat => {
                EngineClient::OpenAi(OpenAiClient::new(core))
            }
            EngineKind::Gemini => EngineClient::Gemini(GeminiClient::new(core)?),
        })
    }

    /// Models as reported by the provider, unfiltered. `engine_name` is left empty.
    pub async fn models(&self) -> Result<Vec<Model>, TomeError> {
        match self {
            EngineClient::Ollama(c) => c.models().await,
            EngineClient::OpenAi(c) => c.models().await,
            EngineClient::Gemini(c) => c.models().await,
        }
    }

    pub fn base_url(&self) -> &Url {
        match self {
            EngineClient::Ollama(c) => &c.core.base_url,
            EngineClient::OpenAi(c) => &c.core.base_url,
            EngineClient::Gemini(c) => &c.core.base_url,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ClientCore {
    pub(crate) provider: &'static str,
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) api_key: Option<String>,
    pub(crate) engine_id: Option<i64>,
    pub(crate) retry_policy: ExponentialBuilder,
}

impl ClientCore {
    /// Appends path segments to the base URL, keeping any base path such as `/v1`.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, TomeError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                TomeError::UnexpectedError(format!("cannot-be-a-base URL: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET `url` and decode a JSON body; a non-success status is `UpstreamStatus`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        bearer: Option<&str>,
    ) -> Result<T, TomeError> {
        let resp = get_with_retry(self.provider, &self.http, url, bearer, self.retry_policy).await?;

        let status = resp.status();
        if !status.is_success() {
            let body = response_preview(resp).await;
            warn!(
                provider = self.provider,
                engine_id = ?self.engine_id,
                %status,
                path = %url.path(),
                body = %body,
                "Model list request rejected"
            );
            return Err(TomeError::UpstreamStatus(status));
        }

        let bytes = resp.bytes().await.map_err(reqwest::Error::without_url)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub(crate) fn model(&self, name: impl Into<String>, display_name: impl Into<String>) -> Model {
        Model {
            name: name.into(),
            display_name: display_name.into(),
            engine_id: self.engine_id,
            engine_name: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProvidersConfig;

    fn runtime(kind: EngineKind) -> ProviderRuntime {
        ProviderRuntime::new(ProvidersConfig::default().resolve(kind)).unwrap()
    }

    #[test]
    fn falls_back_to_default_url() {
        let rt = runtime(EngineKind::OpenAi);
        let client =
            EngineClient::new(EngineKind::OpenAi, &ClientOptions::default(), Some(1), &rt)
                .unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.openai.com/v1");
    }

    #[test]
    fn openai_compat_requires_url() {
        let rt = runtime(EngineKind::OpenAiCompat);
        let err = EngineClient::new(EngineKind::OpenAiCompat, &ClientOptions::default(), None, &rt)
            .unwrap_err();
        assert!(matches!(err, TomeError::MissingEngineOption("url")));
    }

    #[test]
    fn gemini_requires_api_key() {
        let rt = runtime(EngineKind::Gemini);
        let err = EngineClient::new(EngineKind::Gemini, &ClientOptions::default(), None, &rt)
            .unwrap_err();
        assert!(matches!(err, TomeError::MissingEngineOption("apiKey")));

        let ok = EngineClient::new(EngineKind::Gemini, &ClientOptions::new("", "k"), None, &rt);
        assert!(matches!(ok, Ok(EngineClient::Gemini(_))));
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let rt = runtime(EngineKind::OpenAi);
        let opts = ClientOptions::new("http://127.0.0.1:9/v1/", "");
        let EngineClient::OpenAi(client) =
            EngineClient::new(EngineKind::OpenAi, &opts, None, &rt).unwrap()
        else {
            panic!("expected OpenAI client");
        };
        let url = client.core.endpoint(&["models"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/v1/models");
    }

    #[test]
    fn opaque_url_cannot_take_endpoints() {
        let rt = runtime(EngineKind::Ollama);
        let opts = ClientOptions::new("mailto:ops@example.com", "");
        let EngineClient::Ollama(client) =
            EngineClient::new(EngineKind::Ollama, &opts, None, &rt).unwrap()
        else {
            panic!("expected Ollama client");
        };
        let err = client.core.endpoint(&["api", "tags"]).unwrap_err();
        assert!(matches!(err, TomeError::UnexpectedError(m) if m.contains("mailto:ops@example.com")));
    }
}
