use serde::{Deserialize, Serialize};

/// `GET /api/tags` response: the models pulled into the local Ollama server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OllamaTagList {
    #[serde(default)]
    pub models: Vec<OllamaModel>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OllamaModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl OllamaTagList {
    pub fn from_model_names<I, S>(model_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: model_names
                .into_iter()
                .map(|name| OllamaModel {
                    name: name.into(),
                    ..Default::default()
                })
                .collect(),
        }
    }
}
