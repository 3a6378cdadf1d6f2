mod client;
mod gemini;
mod kind;
mod ollama;
mod openai;
mod policy;
mod runtime;
mod upstream_retry;

pub use client::EngineClient;
pub use gemini::GeminiClient;
pub use kind::EngineKind;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use policy::{AllowList, UPSTREAM_BODY_PREVIEW_CHARS};
pub use runtime::{ClientOptions, ProviderRuntime};

pub(crate) use upstream_retry::{get_with_retry, retry_policy};
