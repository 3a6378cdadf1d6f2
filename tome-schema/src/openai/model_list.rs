use serde::{Deserialize, Serialize};

/// `GET /models` response shared by OpenAI and OpenAI-compatible servers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenaiModelList {
    #[serde(default = "default_list_object")]
    pub object: String,
    #[serde(default)]
    pub data: Vec<OpenaiModel>,
}

impl Default for OpenaiModelList {
    fn default() -> Self {
        Self {
            object: default_list_object(),
            data: Vec::new(),
        }
    }
}

// Compatible servers (llama.cpp, vLLM, LM Studio) are sloppy about everything but `id`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenaiModel {
    pub id: String,
    #[serde(default = "default_model_object")]
    pub object: String,
    #[serde(default)]
    pub owned_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
}

impl Default for OpenaiModel {
    fn default() -> Self {
        Self {
            id: String::new(),
            object: default_model_object(),
            owned_by: String::new(),
            created: None,
        }
    }
}

impl OpenaiModelList {
    pub fn from_model_names<I, S>(models_list: I, owned_by: String) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let data = models_list
            .into_iter()
            .map(|model| OpenaiModel {
                id: model.into(),
                owned_by: owned_by.clone(),
                ..Default::default()
            })
            .collect();

        Self {
            data,
            ..Default::default()
        }
    }
}

fn default_list_object() -> String {
    "list".to_string()
}

fn default_model_object() -> String {
    "model".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_compatible_payload() {
        let raw = r#"{"data":[{"id":"llama3"},{"id":"qwen2"}]}"#;
        let list: OpenaiModelList = serde_json::from_str(raw).unwrap();
        assert_eq!(list.object, "list");
        assert_eq!(
            list.data.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            ["llama3", "qwen2"]
        );
        assert_eq!(list.data[0].object, "model");
    }
}
