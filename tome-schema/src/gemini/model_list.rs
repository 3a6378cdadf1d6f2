use serde::{Deserialize, Serialize};

/// `GET v1beta/models` response.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiModelList {
    #[serde(default)]
    pub models: Vec<GeminiModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiModel {
    /// Resource name, e.g. `models/gemini-2.5-pro`.
    pub name: String,
    pub version: Option<String>,
    #[serde(default)]
    pub display_name: String,
    pub description: Option<String>,
    pub input_token_limit: Option<u64>,
    pub output_token_limit: Option<u64>,
    pub supported_generation_methods: Option<Vec<String>>,
}

impl GeminiModel {
    /// Model id without the `models/` resource prefix.
    pub fn id(&self) -> &str {
        self.name.strip_prefix("models/").unwrap_or(&self.name)
    }
}

impl GeminiModelList {
    pub fn from_model_names<I, S>(model_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let models = model_names
            .into_iter()
            .map(|model| {
                let id = model.into();
                GeminiModel {
                    name: format!("models/{id}"),
                    display_name: id,
                    ..Default::default()
                }
            })
            .collect();
        Self {
            models,
            next_page_token: None,
        }
    }
}
