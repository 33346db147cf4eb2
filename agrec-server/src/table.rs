//! In-memory tabular model for the refresh pipeline
//!
//! Every pipeline stage consumes and produces a `Table`: a named column list
//! plus rows of loosely typed cells. Tables round-trip through serde_json,
//! which is also their on-disk artifact format.
//!
//! Join semantics follow the aggregation contract: inner joins only, and on a
//! column-name collision the left side keeps the base name while the right
//! side's column is dropped after the join.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use agrec_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single table cell
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            // Bitwise, so rows containing NaN still compare equal to themselves
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

/// A materialized table: column names plus rows of cells.
///
/// Column order is significant and stable; every row has exactly one cell per
/// column. An empty table still carries its column schema, so downstream
/// stages can project and clean zero-row input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given column schema
    pub fn new<S: Into<String>>(columns: Vec<S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a named column, if present
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Append a row. The cell count must match the column count.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::InvalidInput(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Inner join with `right` on `self[left_key] = right[right_key]`.
    ///
    /// Output columns are this table's columns followed by the right table's
    /// columns, minus any right column whose name collides with a left column
    /// (the left occurrence survives under the base name). Rows without a
    /// match on either side are dropped silently. Null keys never match.
    pub fn inner_join(&self, right: &Table, left_key: &str, right_key: &str) -> Result<Table> {
        let left_idx = self
            .column_index(left_key)
            .ok_or_else(|| Error::schema_mismatch("join", left_key))?;
        let right_idx = right
            .column_index(right_key)
            .ok_or_else(|| Error::schema_mismatch("join", right_key))?;

        // Right columns that survive the join
        let kept_right: Vec<usize> = right
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| self.column_index(name).is_none())
            .map(|(i, _)| i)
            .collect();

        let mut columns = self.columns.clone();
        columns.extend(kept_right.iter().map(|&i| right.columns[i].clone()));

        // Hash the right side by key; one key can match many rows
        let mut by_key: HashMap<&Value, Vec<usize>> = HashMap::new();
        for (row_idx, row) in right.rows.iter().enumerate() {
            let key = &row[right_idx];
            if !key.is_null() {
                by_key.entry(key).or_default().push(row_idx);
            }
        }

        let mut out = Table {
            columns,
            rows: Vec::new(),
        };
        for left_row in &self.rows {
            let key = &left_row[left_idx];
            if key.is_null() {
                continue;
            }
            let Some(matches) = by_key.get(key) else {
                continue;
            };
            for &right_row_idx in matches {
                let right_row = &right.rows[right_row_idx];
                let mut row = left_row.clone();
                row.extend(kept_right.iter().map(|&i| right_row[i].clone()));
                out.rows.push(row);
            }
        }
        Ok(out)
    }

    /// Remove the named columns from the table.
    ///
    /// Every listed column must exist; a missing column is a schema mismatch
    /// between this stage's expectations and its input, reported under
    /// `stage`.
    pub fn drop_columns(&self, names: &[&str], stage: &str) -> Result<Table> {
        for name in names {
            if self.column_index(name).is_none() {
                return Err(Error::schema_mismatch(stage, name));
            }
        }
        let kept: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !names.contains(&c.as_str()))
            .map(|(i, _)| i)
            .collect();

        Ok(Table {
            columns: kept.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| kept.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        })
    }

    /// Drop columns whose non-null count falls below `min_fraction` of the
    /// row count. A column sitting exactly at the threshold survives. On a
    /// zero-row table every column survives.
    pub fn drop_sparse_columns(&self, min_fraction: f64) -> Table {
        let threshold = self.rows.len() as f64 * min_fraction;
        let kept: Vec<usize> = (0..self.columns.len())
            .filter(|&i| {
                let non_null = self.rows.iter().filter(|row| !row[i].is_null()).count();
                non_null as f64 >= threshold
            })
            .collect();

        Table {
            columns: kept.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| kept.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }

    /// Drop every row containing at least one null cell. Idempotent.
    pub fn drop_null_rows(&self) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| !row.iter().any(Value::is_null))
                .cloned()
                .collect(),
        }
    }

    /// Drop exact duplicate rows, keeping the first occurrence
    pub fn dedup_rows(&self) -> Table {
        let mut seen: HashSet<&Vec<Value>> = HashSet::new();
        let mut kept: Vec<Vec<Value>> = Vec::new();
        for row in &self.rows {
            if seen.insert(row) {
                kept.push(row.clone());
            }
        }
        Table {
            columns: self.columns.clone(),
            rows: kept,
        }
    }
}
