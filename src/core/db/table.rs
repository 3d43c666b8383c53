/// Tabular Result Module
///
/// In-memory tables filled from a result set, plus the text rendering used by
/// full-precision reads.

use rusqlite::types::{Value, ValueRef};
use serde_json::{json, Map};

/// A column of a filled table
#[derive(Debug, Clone, PartialEq)]
pub struct DataColumn {
    /// Column name as reported by the driver
    pub name: String,
    /// Declared type from the table definition, if the column has one
    pub decl_type: Option<String>,
}

/// One row of values, ordered like the table's columns
pub type DataRow = Vec<Value>;

/// A fully materialised result set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    pub columns: Vec<DataColumn>,
    pub rows: Vec<DataRow>,
}

impl DataTable {
    /// Creates an empty table with the given columns
    pub fn new(columns: Vec<DataColumn>) -> Self {
        DataTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends one result row.
    pub(crate) fn push_row(&mut self, row: &rusqlite::Row<'_>) -> rusqlite::Result<()> {
        let mut values = Vec::with_capacity(self.columns.len());
        for i in 0..self.columns.len() {
            values.push(row.get::<_, Value>(i)?);
        }
        self.rows.push(values);
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first column named `name` (ASCII case-insensitive)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Value at `row` in the column named `name`
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let col = self.column_index(name)?;
        self.rows.get(row)?.get(col)
    }

    /// First cell of the first row
    pub fn first_cell(&self) -> Option<&Value> {
        self.rows.first()?.first()
    }

    /// Renders the table as a JSON array of objects keyed by column name.
    pub fn to_json(&self) -> serde_json::Value {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut obj = Map::with_capacity(self.columns.len());
                for (col, value) in self.columns.iter().zip(row) {
                    obj.insert(col.name.clone(), value_to_json(value));
                }
                serde_json::Value::Object(obj)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => json!(i),
        Value::Real(f) => json!(f),
        Value::Text(s) => json!(s),
        Value::Blob(b) => json!(hex_upper(b)),
    }
}

/// Renders a driver value as text without numeric rounding.
///
/// NULL renders as the empty string and blobs as uppercase hex.
pub fn value_to_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => hex_upper(b),
    }
}

fn hex_upper(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(out, "{:02X}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataTable {
        let mut table = DataTable::new(vec![
            DataColumn {
                name: "id".to_string(),
                decl_type: Some("INTEGER".to_string()),
            },
            DataColumn {
                name: "Name".to_string(),
                decl_type: None,
            },
        ]);
        table.rows.push(vec![Value::Integer(1), Value::Text("Ann".to_string())]);
        table.rows.push(vec![Value::Integer(2), Value::Null]);
        table
    }

    #[test]
    fn test_lookup_by_name() {
        let table = sample();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_index("NAME"), Some(1));
        assert_eq!(table.get(0, "name"), Some(&Value::Text("Ann".to_string())));
        assert_eq!(table.get(5, "name"), None);
        assert_eq!(table.get(0, "missing"), None);
        assert_eq!(table.first_cell(), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_to_json() {
        let json = sample().to_json();
        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["Name"], "Ann");
        assert!(json[1]["Name"].is_null());
    }

    #[test]
    fn test_value_to_text() {
        assert_eq!(value_to_text(ValueRef::Null), "");
        assert_eq!(value_to_text(ValueRef::Integer(i64::MAX)), "9223372036854775807");
        assert_eq!(value_to_text(ValueRef::Real(0.1)), "0.1");
        assert_eq!(value_to_text(ValueRef::Real(1.0 / 3.0)), "0.3333333333333333");
        assert_eq!(value_to_text(ValueRef::Text(b"abc")), "abc");
        assert_eq!(value_to_text(ValueRef::Blob(&[0x0a, 0xff])), "0AFF");
    }
}
