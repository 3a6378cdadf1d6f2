use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `GET /servers/{qualifiedName}` response: the full server descriptor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub qualified_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub deployment_url: Option<String>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Security>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDescriptor>>,
}

impl Server {
    /// First stdio connection, the only kind Tome can launch locally.
    pub fn stdio_connection(&self) -> Option<&Connection> {
        self.connections
            .iter()
            .find(|c| c.kind == ConnectionType::Stdio)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Stdio,
    Ws,
    Http,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(rename = "type")]
    pub kind: ConnectionType,
    #[serde(default)]
    pub config_schema: Option<ConfigSchema>,
    #[serde(default)]
    pub stdio_function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ConfigSchema {
    #[serde(rename = "type", default = "default_schema_type")]
    pub kind: String,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, ConfigProperty>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ConfigProperty {
    #[serde(rename = "type", default = "default_property_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A config value the user fills in before installing a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigField {
    pub name: String,
    pub required: bool,
    pub description: String,
    pub value: String,
    pub valid: bool,
}

impl ConfigSchema {
    /// Flattens the schema into form fields, pre-filled with string defaults.
    pub fn fields(&self) -> Vec<ConfigField> {
        self.properties
            .iter()
            .map(|(name, prop)| {
                let required = self.required.iter().any(|r| r == name);
                let value = match &prop.default {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                };
                ConfigField {
                    name: name.clone(),
                    required,
                    description: prop.description.clone().unwrap_or_default(),
                    valid: !required || !value.is_empty(),
                    value,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub scan_passed: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub input_schema: Value,
}

fn default_schema_type() -> String {
    "object".to_string()
}

fn default_property_type() -> String {
    "string".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTOR: &str = r#"{
        "qualifiedName": "@acme/files",
        "displayName": "Files",
        "description": "Filesystem access",
        "remote": false,
        "iconUrl": null,
        "deploymentUrl": null,
        "connections": [
            {"type": "http", "deploymentUrl": "https://files.example.test/mcp"},
            {
                "type": "stdio",
                "stdioFunction": "config => ({command: 'npx', args: ['-y', '@acme/files']})",
                "configSchema": {
                    "type": "object",
                    "required": ["root"],
                    "properties": {
                        "root": {"type": "string", "description": "Root directory"},
                        "readonly": {"type": "boolean", "default": true, "description": "Read only"}
                    }
                }
            }
        ],
        "security": {"scanPassed": true},
        "tools": [{"name": "read_file", "description": null, "inputSchema": {"type": "object"}}]
    }"#;

    #[test]
    fn parses_descriptor_and_finds_stdio_connection() {
        let server: Server = serde_json::from_str(DESCRIPTOR).unwrap();
        assert_eq!(server.connections.len(), 2);
        let stdio = server.stdio_connection().expect("stdio connection");
        assert_eq!(stdio.kind, ConnectionType::Stdio);
        assert_eq!(server.security, Some(Security { scan_passed: true }));
        assert_eq!(server.tools.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn config_fields_mark_missing_required_values_invalid() {
        let server: Server = serde_json::from_str(DESCRIPTOR).unwrap();
        let schema = server
            .stdio_connection()
            .and_then(|c| c.config_schema.as_ref())
            .expect("schema");

        let fields = schema.fields();
        let readonly = fields.iter().find(|f| f.name == "readonly").unwrap();
        assert!(!readonly.required);
        assert_eq!(readonly.value, "true");
        assert!(readonly.valid);

        let root = fields.iter().find(|f| f.name == "root").unwrap();
        assert!(root.required);
        assert!(root.value.is_empty());
        assert!(!root.valid);
    }
}
