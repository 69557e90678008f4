//! Tables for bronze and silver data
//!
//! Landed data is schemaless at the edges (Sleeper settings are unpacked
//! into as many columns as the API returns), so sources build rows as
//! [`Record`]s into a [`Table`], which widens its schema as rows arrive.
//! Everything downstream of the row builders works on polars frames:
//! - `value`: the cell type of a row
//! - `frame`: table/frame conversion and shared frame operations
//! - `parquet`: frame encoding to and from Parquet bytes

pub mod frame;
pub mod parquet;
pub mod value;

#[cfg(test)]
mod tests;

pub use frame::IntoFrame;
pub use value::Value;

use crate::error::{LakeError, Result};

static NULL: Value = Value::Null;

/// An ordered set of named values, used to build one row at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or overwrite a field, keeping the original position on overwrite.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Append every field of `other`, overwriting shared names.
    pub fn merge(mut self, other: Record) -> Self {
        for (name, value) in other.fields {
            self.set(&name, value);
        }
        self
    }

    pub fn get(&self, name: &str) -> &Value {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .unwrap_or(&NULL)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Unpack every key of a JSON object into this record, nested values as JSON text.
    pub fn extend_json(&mut self, object: &serde_json::Map<String, serde_json::Value>) {
        for (k, v) in object {
            self.set(k, Value::from(v));
        }
    }
}

/// Rows of nullable values under a growing column list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Empty table with a fixed schema.
    pub fn with_columns(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from records; columns appear in first-seen order.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut table = Self::default();
        for record in records {
            table.push_record(record);
        }
        table
    }

    /// Build a table from raw columns and rows. Every row must match the column count.
    pub(crate) fn from_parts(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.len() != columns.len()) {
            return Err(LakeError::InvalidValue {
                message: format!(
                    "row has {} values but table has {} columns",
                    bad.len(),
                    columns.len()
                ),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Stack tables built separately, widening to every column seen.
    pub fn concat(tables: Vec<Table>) -> Table {
        let mut out = Table::default();
        for table in tables {
            let mapping: Vec<usize> = table.columns.iter().map(|c| out.ensure_column(c)).collect();
            for values in table.rows {
                let mut row = vec![Value::Null; out.columns.len()];
                for (i, value) in mapping.iter().zip(values) {
                    row[*i] = value;
                }
                out.rows.push(row);
            }
        }
        out
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row`; a missing row or column reads as null.
    pub fn value(&self, row: usize, name: &str) -> &Value {
        match (self.column_index(name), self.rows.get(row)) {
            (Some(i), Some(r)) => &r[i],
            _ => &NULL,
        }
    }

    pub(crate) fn raw_rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(i) = self.column_index(name) {
            return i;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Value::Null);
        }
        self.columns.len() - 1
    }

    /// Append a record, widening the schema with any new columns.
    pub fn push_record(&mut self, record: Record) {
        let indices: Vec<usize> = record.iter().map(|(n, _)| self.ensure_column(n)).collect();
        let mut row = vec![Value::Null; self.columns.len()];
        for (i, (_, value)) in indices.into_iter().zip(record.fields) {
            row[i] = value;
        }
        self.rows.push(row);
    }
}
