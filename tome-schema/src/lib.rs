//! Wire types for the HTTP services Tome talks to: model providers and the MCP registry.

pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod registry;

pub use gemini::{GeminiModel, GeminiModelList};
pub use ollama::{OllamaModel, OllamaTagList};
pub use openai::{OpenaiModel, OpenaiModelList};
pub use registry::{
    CompactServer, ConfigField, ConfigProperty, ConfigSchema, Connection, ConnectionType,
    DEFAULT_PAGE_SIZE, Pagination, Security, Server, ServerList, ToolDescriptor,
};
