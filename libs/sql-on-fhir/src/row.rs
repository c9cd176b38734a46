//! Output rows and the emitter contract

use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

use ferrum_fhirpath::{Collection, ToJson, Value};

/// One column value: empty results are `Null`, several items an `Array`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Scalar(Value),
    Array(Vec<Value>),
}

impl Cell {
    pub fn from_collection(collection: &Collection) -> Self {
        match collection.len() {
            0 => Cell::Null,
            1 => collection.first().cloned().map(Cell::Scalar).unwrap_or(Cell::Null),
            _ => Cell::Array(collection.iter().cloned().collect()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Cell::Scalar(value) => Some(value),
            _ => None,
        }
    }
}

impl ToJson for Cell {
    fn to_json(&self) -> JsonValue {
        match self {
            Cell::Null => JsonValue::Null,
            Cell::Scalar(value) => value.to_json(),
            Cell::Array(values) => JsonValue::Array(values.iter().map(ToJson::to_json).collect()),
        }
    }
}

/// Column name to cell, in the view's schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<(Arc<str>, Cell)>,
}

impl Row {
    pub(crate) fn new(cells: Vec<(Arc<str>, Cell)>) -> Self {
        Self { cells }
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(name, _)| name.as_ref() == column)
            .map(|(_, cell)| cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(name, cell)| (name.as_ref(), cell))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Insertion-ordered JSON object.
    pub fn to_json(&self) -> Map<String, JsonValue> {
        self.cells
            .iter()
            .map(|(name, cell)| (name.to_string(), cell.to_json()))
            .collect()
    }
}

/// Converts rows into records for a downstream store.
pub trait RowEmitter {
    type Record;

    fn emit(&self, row: &Row) -> Self::Record;

    fn emit_all(&self, rows: &[Row]) -> Vec<Self::Record> {
        rows.iter().map(|row| self.emit(row)).collect()
    }
}

/// Emits each row as a JSON object keyed by column name.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRowEmitter;

impl RowEmitter for JsonRowEmitter {
    type Record = Map<String, JsonValue>;

    fn emit(&self, row: &Row) -> Self::Record {
        row.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> Row {
        Row::new(vec![
            (Arc::from("id"), Cell::Scalar(Value::string("p1"))),
            (Arc::from("gender"), Cell::Null),
            (
                Arc::from("given"),
                Cell::Array(vec![Value::string("Jane"), Value::string("Q")]),
            ),
        ])
    }

    #[test]
    fn test_cell_from_collection() {
        assert_eq!(Cell::from_collection(&Collection::empty()), Cell::Null);
        assert_eq!(
            Cell::from_collection(&Collection::singleton(Value::integer(3))),
            Cell::Scalar(Value::integer(3))
        );
        let many: Collection = vec![Value::integer(1), Value::integer(2)].into_iter().collect();
        assert_eq!(
            Cell::from_collection(&many),
            Cell::Array(vec![Value::integer(1), Value::integer(2)])
        );
    }

    #[test]
    fn test_json_emitter_keeps_column_order() {
        let record = JsonRowEmitter.emit(&row());
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "gender", "given"]);
        assert_eq!(
            JsonValue::Object(record),
            json!({"id": "p1", "gender": null, "given": ["Jane", "Q"]})
        );
    }

    #[test]
    fn test_row_lookup() {
        let row = row();
        assert_eq!(row.len(), 3);
        assert!(row.get("gender").is_some_and(Cell::is_null));
        assert_eq!(
            row.get("id").and_then(Cell::as_scalar),
            Some(&Value::string("p1"))
        );
        assert!(row.get("missing").is_none());
    }
}
