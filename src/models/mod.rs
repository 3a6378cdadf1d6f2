mod engine;
mod mcp_server;
mod model;

pub use engine::{Engine, EngineContext, Engines, OLLAMA_UNREACHABLE};
pub use mcp_server::McpServer;
pub use model::Model;
