use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::TomeError;

/// Provider family of an engine, stored in the `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineKind {
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "openai-compat")]
    OpenAiCompat,
}

impl EngineKind {
    pub const ALL: [EngineKind; 4] = [
        EngineKind::Ollama,
        EngineKind::OpenAi,
        EngineKind::Gemini,
        EngineKind::OpenAiCompat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EngineKind::Ollama => "ollama",
            EngineKind::OpenAi => "openai",
            EngineKind::Gemini => "gemini",
            EngineKind::OpenAiCompat => "openai-compat",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = TomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EngineKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| TomeError::UnsupportedEngineKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stored_type_names() {
        for kind in EngineKind::ALL {
            assert_eq!(kind.as_str().parse::<EngineKind>().unwrap(), kind);
        }
        assert!(matches!(
            "anthropic".parse::<EngineKind>(),
            Err(TomeError::UnsupportedEngineKind(k)) if k == "anthropic"
        ));
    }

    #[test]
    fn serde_matches_display() {
        let json = serde_json::to_string(&EngineKind::OpenAiCompat).unwrap();
        assert_eq!(json, "\"openai-compat\"");
        assert_eq!(EngineKind::OpenAiCompat.to_string(), "openai-compat");
    }
}
