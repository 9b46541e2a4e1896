//! Dataset rows.

use serde_json::Value;

use crate::cell::{CellContext, CellValue};
use crate::dataset::DatasetError;

/// Ordered mapping from column name to cell value.
///
/// Column order follows the source record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, column: impl Into<String>, value: CellValue) -> Self {
        self.insert(column, value);
        self
    }

    /// Insert a cell, replacing an existing column in place.
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        let column = column.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Decode a JSON object into a row.
    pub fn from_json(value: Value, ctx: CellContext<'_>) -> Result<Self, DatasetError> {
        let Value::Object(map) = value else {
            return Err(DatasetError::InvalidRow {
                message: format!("expected a JSON object, found {}", json_kind(&value)),
            });
        };

        let mut cells = Vec::with_capacity(map.len());
        for (column, raw) in map {
            let cell = CellValue::from_json(&column, raw, ctx)?;
            cells.push((column, cell));
        }
        Ok(Self { cells })
    }

    /// Decode a single JSONL line.
    pub fn parse_line(line: &str, ctx: CellContext<'_>) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_str(line)?;
        Self::from_json(value, ctx)
    }
}

impl FromIterator<(String, CellValue)> for Row {
    fn from_iter<T: IntoIterator<Item = (String, CellValue)>>(iter: T) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_root() -> std::path::PathBuf {
        std::env::temp_dir()
    }

    #[test]
    fn test_parse_line_preserves_column_order() {
        let root = ctx_root();
        let row = Row::parse_line(
            r#"{"timestamp": 0.5, "action": [0.1], "index": 3}"#,
            CellContext { root: &root },
        )
        .unwrap();
        let names: Vec<&str> = row.column_names().collect();
        assert_eq!(names, vec!["timestamp", "action", "index"]);
        assert_eq!(row.get("index"), Some(&CellValue::Int(3)));
    }

    #[test]
    fn test_non_object_line_is_rejected() {
        let root = ctx_root();
        let err = Row::parse_line("[1, 2]", CellContext { root: &root }).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidRow { .. }));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut row = Row::new()
            .with("a", CellValue::Int(1))
            .with("b", CellValue::Int(2));
        row.insert("a", CellValue::Int(9));
        let cells: Vec<_> = row.iter().collect();
        assert_eq!(cells[0], ("a", &CellValue::Int(9)));
        assert_eq!(row.len(), 2);
    }
}
