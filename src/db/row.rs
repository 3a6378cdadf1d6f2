//! Store-native flat representation of a record.

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use crate::error::TomeError;

/// Primary key column every table carries.
pub const ID_COLUMN: &str = "id";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// A stored cell that could not be read; carries the decode error. Never written.
    Undecodable(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Column name to value. Column order is stable (sorted), which keeps generated SQL
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: BTreeMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: impl Into<Value>) {
        self.columns.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The row without its primary key; what gets written on insert/update.
    pub fn into_fields(mut self) -> Self {
        self.columns.remove(ID_COLUMN);
        self
    }

    pub fn id(&self) -> Option<i64> {
        match self.columns.get(ID_COLUMN) {
            Some(Value::Integer(id)) => Some(*id),
            _ => None,
        }
    }

    /// Fails on the first cell the store could not decode.
    pub fn check_decoded(&self, table: &str) -> Result<(), TomeError> {
        match self
            .columns
            .iter()
            .find(|(_, v)| matches!(v, Value::Undecodable(_)))
        {
            Some((column, Value::Undecodable(reason))) => Err(TomeError::malformed(
                table,
                format!("column `{column}` could not be decoded: {reason}"),
            )),
            _ => Ok(()),
        }
    }

    pub fn require_id(&self, table: &str) -> Result<i64, TomeError> {
        self.id()
            .ok_or_else(|| TomeError::malformed(table, "missing integer `id` column"))
    }

    pub fn text(&self, table: &str, column: &str) -> Result<&str, TomeError> {
        match self.columns.get(column) {
            Some(Value::Text(s)) => Ok(s.as_str()),
            Some(other) => Err(TomeError::malformed(
                table,
                format!("column `{column}` is not text: {other:?}"),
            )),
            None => Err(TomeError::malformed(table, format!("missing column `{column}`"))),
        }
    }

    /// Deserializes a JSON-encoded text column.
    pub fn json<T: DeserializeOwned>(&self, table: &str, column: &str) -> Result<T, TomeError> {
        let raw = self.text(table, column)?;
        serde_json::from_str(raw)
            .map_err(|e| TomeError::malformed(table, format!("column `{column}`: {e}")))
    }
}

/// Accepts `[A-Za-z_][A-Za-z0-9_]*`; table and column names are spliced into SQL.
pub fn validate_identifier(name: &str) -> Result<&str, TomeError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(TomeError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn typed_accessors_report_malformed_columns() {
        let row = Row::new()
            .with("id", 3)
            .with("name", "local")
            .with("options", "{\"url\":")
            .with("env", "{\"A\":\"1\"}");

        assert_eq!(row.require_id("engines").unwrap(), 3);
        assert_eq!(row.text("engines", "name").unwrap(), "local");
        assert!(matches!(
            row.text("engines", "id"),
            Err(TomeError::MalformedRow { .. })
        ));
        assert!(matches!(
            row.text("engines", "type"),
            Err(TomeError::MalformedRow { .. })
        ));
        assert!(row.json::<serde_json::Value>("engines", "options").is_err());

        let env: HashMap<String, String> = row.json("engines", "env").unwrap();
        assert_eq!(env.get("A").map(String::as_str), Some("1"));
    }

    #[test]
    fn undecodable_cell_fails_only_its_row() {
        let good = Row::new().with("id", 1).with("name", "ok");
        assert!(good.check_decoded("mcp_servers").is_ok());

        let mut bad = Row::new().with("id", 2);
        bad.insert("name", Value::Undecodable("invalid utf-8 sequence".to_string()));
        let err = bad.check_decoded("mcp_servers").unwrap_err();
        assert!(matches!(err, TomeError::MalformedRow { ref reason, .. } if reason.contains("`name`")));
        assert!(bad.text("mcp_servers", "name").is_err());
    }

    #[test]
    fn into_fields_drops_primary_key() {
        let row = Row::new().with("id", 1).with("name", "x").into_fields();
        assert_eq!(row.len(), 1);
        assert_eq!(row.id(), None);
    }

    #[test]
    fn identifiers_are_restricted() {
        assert!(validate_identifier("mcp_servers").is_ok());
        assert!(validate_identifier("_t1").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1abc").is_err());
        assert!(validate_identifier("engines; DROP TABLE engines").is_err());
        assert!(validate_identifier("name\"").is_err());
    }
}
