use serde::{Deserialize, Serialize};

/// A model offered by an engine. Derived from the engine's provider, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub display_name: String,
    pub engine_id: Option<i64>,
    pub engine_name: String,
}
