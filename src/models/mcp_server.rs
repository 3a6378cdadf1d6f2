use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::db::Row;
use crate::error::TomeError;
use crate::persist::{Identified, Persistable};

/// A locally launched MCP server: a command line plus environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServer {
    pub id: Option<i64>,
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl McpServer {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Shell-style rendering for display, e.g. `npx -y @scope/server`.
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Identified for McpServer {
    fn id(&self) -> Option<i64> {
        self.id
    }
}

#[async_trait]
impl Persistable for McpServer {
    const TABLE: &'static str = "mcp_servers";
    type Context = ();

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn to_row(&self) -> Result<Row, TomeError> {
        Ok(Row::new()
            .with("name", self.name.as_str())
            .with("command", self.command.as_str())
            .with("args", serde_json::to_string(&self.args)?)
            .with("env", serde_json::to_string(&self.env)?))
    }

    async fn from_row(row: Row, _ctx: &()) -> Result<Self, TomeError> {
        let table = Self::TABLE;
        Ok(Self {
            id: Some(row.require_id(table)?),
            name: row.text(table, "name")?.to_string(),
            command: row.text(table, "command")?.to_string(),
            args: row.json(table, "args")?,
            env: row.json(table, "env")?,
        })
    }
}
