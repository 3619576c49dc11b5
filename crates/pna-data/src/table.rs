//! Column-ordered tables of JSON cells
//!
//! Every façade and repository query returns a [`Table`]. Handlers either
//! feed its records into figure/table payloads or ship it to the browser in
//! split orientation (`{columns, index, data}`).

use crate::error::TableError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashSet;

/// A borrowed row with access by column name
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    cells: &'a [Value],
}

impl<'a> Row<'a> {
    /// Cell under `column`
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.cells.get(i))
    }

    /// Cell under `column` as a string
    #[must_use]
    pub fn get_str(&self, column: &str) -> Option<&'a str> {
        self.get(column).and_then(Value::as_str)
    }

    /// Cells in column order
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &'a [Value] {
        self.cells
    }
}

/// Split-orientation wire form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitTable {
    /// Column names
    pub columns: Vec<String>,
    /// Row labels
    pub index: Vec<usize>,
    /// Rows of cells
    pub data: Vec<Vec<Value>>,
}

/// Rectangular table; every row has exactly one cell per column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Empty table with the given columns
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row
    ///
    /// # Errors
    /// [`TableError::RowWidth`] if the row does not have one cell per column.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::RowWidth {
                expected: self.columns.len(),
                found: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Build from JSON objects
    ///
    /// Columns are the union of keys in first-seen order; missing keys become
    /// `null`.
    #[must_use]
    pub fn from_records(records: &[Map<String, Value>]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        let rows = records
            .iter()
            .map(|r| {
                columns
                    .iter()
                    .map(|c| r.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// Column names, in order
    #[inline]
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Whether `column` exists
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row {
            columns: &self.columns,
            cells: cells.as_slice(),
        })
    }

    /// Cells of one column, top to bottom
    pub fn column(&self, name: &str) -> impl Iterator<Item = &Value> {
        let index = self.columns.iter().position(|c| c == name);
        self.rows
            .iter()
            .filter_map(move |row| index.and_then(|i| row.get(i)))
    }

    /// Distinct values of one column, in first-seen order
    #[must_use]
    pub fn unique(&self, name: &str) -> Vec<&Value> {
        let mut seen = Vec::new();
        for value in self.column(name) {
            if !seen.contains(&value) {
                seen.push(value);
            }
        }
        seen
    }

    /// Rows matching `keep`
    #[must_use]
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&Row<'_>) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|cells| {
                keep(&Row {
                    columns: &self.columns,
                    cells: cells.as_slice(),
                })
            })
            .cloned()
            .collect();
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Rows whose `column` equals `value`
    #[must_use]
    pub fn filter_eq(&self, column: &str, value: &Value) -> Self {
        self.filter(|row| row.get(column) == Some(value))
    }

    /// Stable ascending sort on one column
    ///
    /// `null` sorts first, then numbers, then strings; an unknown column
    /// leaves the order unchanged.
    #[must_use]
    pub fn sort_by(mut self, column: &str) -> Self {
        if let Some(i) = self.columns.iter().position(|c| c == column) {
            self.rows.sort_by(|a, b| compare_cells(&a[i], &b[i]));
        }
        self
    }

    /// Rename columns; pairs naming absent columns are ignored
    #[must_use]
    pub fn rename(mut self, pairs: &[(&str, &str)]) -> Self {
        for (from, to) in pairs {
            if let Some(col) = self.columns.iter_mut().find(|c| c.as_str() == *from) {
                *col = (*to).to_string();
            }
        }
        self
    }

    /// Remove a column if present
    #[must_use]
    pub fn drop_column(mut self, column: &str) -> Self {
        if let Some(i) = self.columns.iter().position(|c| c == column) {
            self.columns.remove(i);
            for row in &mut self.rows {
                row.remove(i);
            }
        }
        self
    }

    /// Append a column computed from each row
    #[must_use]
    pub fn with_column<F>(mut self, name: impl Into<String>, mut derive: F) -> Self
    where
        F: FnMut(&Row<'_>) -> Value,
    {
        let values: Vec<Value> = self.rows().map(|r| derive(&r)).collect();
        self.columns.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        self
    }

    /// Rewrite every cell of one column
    #[must_use]
    pub fn map_column<F>(mut self, column: &str, mut f: F) -> Self
    where
        F: FnMut(&Value) -> Value,
    {
        if let Some(i) = self.columns.iter().position(|c| c == column) {
            for row in &mut self.rows {
                row[i] = f(&row[i]);
            }
        }
        self
    }

    /// Keep the first row for each distinct value of `column`
    #[must_use]
    pub fn dedup_by(mut self, column: &str) -> Self {
        let Some(i) = self.columns.iter().position(|c| c == column) else {
            return self;
        };
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(row[i].to_string()));
        self
    }

    /// Rows as JSON objects keyed by column
    #[must_use]
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Split-orientation form
    #[must_use]
    pub fn to_split(&self) -> SplitTable {
        SplitTable {
            columns: self.columns.clone(),
            index: (0..self.rows.len()).collect(),
            data: self.rows.clone(),
        }
    }

    /// Split-orientation form as a JSON value
    #[must_use]
    pub fn to_split_value(&self) -> Value {
        serde_json::to_value(self.to_split()).unwrap_or(Value::Null)
    }

    /// Rebuild from split orientation
    ///
    /// # Errors
    /// [`TableError::Split`] if `value` is not split-shaped, or
    /// [`TableError::RowWidth`] for ragged rows.
    pub fn from_split(value: &Value) -> Result<Self, TableError> {
        let split: SplitTable = serde_json::from_value(value.clone())?;
        Self::try_from(split)
    }
}

impl TryFrom<SplitTable> for Table {
    type Error = TableError;

    fn try_from(split: SplitTable) -> Result<Self, Self::Error> {
        let mut table = Self::new(split.columns);
        for row in split.data {
            table.push_row(row)?;
        }
        Ok(table)
    }
}

fn compare_cells(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) | Value::Object(_) => 4,
        }
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(f64::NAN), y.as_f64().unwrap_or(f64::NAN));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
