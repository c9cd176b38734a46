//! Raw view definition document
//!
//! The document is read one node at a time so that every error can name
//! the node it came from. Unknown keys are rejected at every level.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::error::{Result, ViewError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawView {
    pub name: Option<String>,
    pub desc: Option<String>,
    pub resource: Option<String>,
    #[serde(default)]
    pub constants: Vec<JsonValue>,
    #[serde(default)]
    pub select: Vec<JsonValue>,
    #[serde(default, rename = "where")]
    pub where_clauses: Vec<JsonValue>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawConstant {
    pub name: Option<String>,
    pub value: Option<JsonValue>,
    pub expr: Option<String>,
}

/// One `select` entry. Which keys are present decides the node kind.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawSelect {
    pub name: Option<String>,
    pub expr: Option<String>,
    pub desc: Option<String>,
    pub from: Option<String>,
    #[serde(rename = "forEach")]
    pub for_each: Option<String>,
    pub select: Option<Vec<JsonValue>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawWhere {
    pub expr: Option<String>,
    pub desc: Option<String>,
}

/// Deserialize the object at `path`.
pub(crate) fn read_node<T: DeserializeOwned>(value: &JsonValue, path: &str) -> Result<T> {
    if !value.is_object() {
        return Err(ViewError::structural(path, "expected a JSON object"));
    }
    serde_json::from_value(value.clone()).map_err(|e| ViewError::structural(path, e.to_string()))
}

/// A required string key that must not be blank.
pub(crate) fn required<'a>(value: &'a Option<String>, key: &str, path: &str) -> Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        Some(_) => Err(ViewError::structural(path, format!("'{}' must not be empty", key))),
        None => Err(ViewError::structural(path, format!("missing '{}'", key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = read_node::<RawSelect>(&json!({"name": "id", "expr": "id", "path": "id"}), "select[0]")
            .unwrap_err();
        match err {
            ViewError::Structural { path, message } => {
                assert_eq!(path, "select[0]");
                assert!(message.contains("path"), "{}", message);
            }
            other => panic!("expected structural error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_node() {
        assert!(matches!(
            read_node::<RawWhere>(&json!("gender = 'male'"), "where[0]"),
            Err(ViewError::Structural { .. })
        ));
    }

    #[test]
    fn test_required_key() {
        assert_eq!(required(&Some("Patient".into()), "resource", "resource").unwrap(), "Patient");
        assert!(required(&Some("  ".into()), "resource", "resource").is_err());
        assert!(required(&None, "resource", "resource").is_err());
    }
}
