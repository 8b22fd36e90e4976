//! Column-oriented table with table-level metadata.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{LcSiftError, Result};

use super::column::Column;
use super::value::Value;

/// Table-level metadata.
pub type Metadata = IndexMap<String, Value>;

/// An ordered set of equal-length named columns plus metadata.
///
/// Rows are implicit: row `i` is the `i`-th element of every column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: IndexMap<String, Column>,
    /// Table-level metadata (`z`, `t0`, `directory`, ...).
    #[serde(default)]
    pub meta: Metadata,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from named columns, checking that lengths agree.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Column)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, column) in columns {
            table.push_column(name, column)?;
        }
        Ok(table)
    }

    /// Attach a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Number of rows. A table without columns has zero rows.
    pub fn row_count(&self) -> usize {
        self.columns.values().next().map(Column::len).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Iterate over `(name, column)` pairs in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .get(name)
            .ok_or_else(|| LcSiftError::missing_column(name))
    }

    /// Numeric values of a column, integers widened to `f64`.
    pub fn float_values(&self, name: &str) -> Result<Vec<f64>> {
        self.column(name)?
            .to_f64()
            .ok_or_else(|| LcSiftError::ColumnType {
                column: name.to_string(),
                expected: "numeric".to_string(),
            })
    }

    /// String values of a column.
    pub fn str_values(&self, name: &str) -> Result<&[String]> {
        match self.column(name)? {
            Column::Str(values) => Ok(values),
            _ => Err(LcSiftError::ColumnType {
                column: name.to_string(),
                expected: "str".to_string(),
            }),
        }
    }

    /// Add a column, or replace an existing one in place.
    ///
    /// The first column of an empty table fixes the row count.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        let replacing_only = self.columns.len() == 1 && self.columns.contains_key(&name);
        if !self.columns.is_empty() && !replacing_only && column.len() != self.row_count() {
            return Err(LcSiftError::ColumnLength {
                column: name,
                expected: self.row_count(),
                actual: column.len(),
            });
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Remove a column, keeping the order of the others.
    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        self.columns.shift_remove(name)
    }

    /// Rows where `mask` is true, metadata carried over.
    pub fn filter(&self, mask: &[bool]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(name, col)| (name.clone(), col.filter(mask)))
                .collect(),
            meta: self.meta.clone(),
        }
    }

    /// Rows in the given order, metadata carried over.
    pub fn take(&self, indices: &[usize]) -> Table {
        Table {
            columns: self
                .columns
                .iter()
                .map(|(name, col)| (name.clone(), col.take(indices)))
                .collect(),
            meta: self.meta.clone(),
        }
    }

    /// Stable ascending order of the rows by a numeric column.
    pub fn argsort(&self, name: &str) -> Result<Vec<usize>> {
        let values = self.float_values(name)?;
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        Ok(order)
    }

    /// Copy of the table sorted ascending by a numeric column.
    pub fn sorted_by(&self, name: &str) -> Result<Table> {
        Ok(self.take(&self.argsort(name)?))
    }

    /// One row as a name -> value map.
    pub fn row(&self, index: usize) -> Option<IndexMap<String, Value>> {
        if index >= self.row_count() {
            return None;
        }
        Some(
            self.columns
                .iter()
                .filter_map(|(name, col)| col.get(index).map(|v| (name.clone(), v)))
                .collect(),
        )
    }

    /// Numeric metadata entry.
    pub fn meta_f64(&self, key: &str) -> Result<f64> {
        self.meta
            .get(key)
            .and_then(Value::as_f64)
            .ok_or_else(|| LcSiftError::missing_metadata(key))
    }

    /// String metadata entry.
    pub fn meta_str(&self, key: &str) -> Result<&str> {
        self.meta
            .get(key)
            .and_then(Value::as_str)
            .ok_or_else(|| LcSiftError::missing_metadata(key))
    }
}
