//! SQL DDL for initializing the database schema.

/// SQLite schema includes:
/// - `engines` table (one configured model provider per row, options as JSON)
/// - `mcp_servers` table (one installed MCP server command line per row)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Engines: model provider connections
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS engines (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    type TEXT NOT NULL,
    options TEXT NOT NULL DEFAULT '{}' -- JSON {url, apiKey}
);

-- ---------------------------------------------------------------------------
-- MCP servers installed for local launch
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS mcp_servers (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    command TEXT NOT NULL,
    args TEXT NOT NULL DEFAULT '[]', -- JSON array of strings
    env TEXT NOT NULL DEFAULT '{}' -- JSON object of strings
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_mcp_servers_name ON mcp_servers(name)
"#;
