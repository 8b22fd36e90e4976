//! Typed, homogeneous column storage.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::value::{Value, ValueType};

/// A homogeneous sequence of scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum Column {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Str(Vec<String>),
    Bool(Vec<bool>),
}

impl Column {
    /// An empty column of the given type.
    pub fn empty(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Int => Column::Int(Vec::new()),
            ValueType::Float => Column::Float(Vec::new()),
            ValueType::Str => Column::Str(Vec::new()),
            ValueType::Bool => Column::Bool(Vec::new()),
        }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Str(v) => v.len(),
            Column::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type of the stored values.
    pub fn value_type(&self) -> ValueType {
        match self {
            Column::Int(_) => ValueType::Int,
            Column::Float(_) => ValueType::Float,
            Column::Str(_) => ValueType::Str,
            Column::Bool(_) => ValueType::Bool,
        }
    }

    /// Value at a row.
    pub fn get(&self, row: usize) -> Option<Value> {
        match self {
            Column::Int(v) => v.get(row).map(|x| Value::Int(*x)),
            Column::Float(v) => v.get(row).map(|x| Value::Float(*x)),
            Column::Str(v) => v.get(row).map(|x| Value::Str(x.clone())),
            Column::Bool(v) => v.get(row).map(|x| Value::Bool(*x)),
        }
    }

    /// Numeric view of the column. Integers are widened to `f64`.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Int(v) => Some(v.iter().map(|x| *x as f64).collect()),
            Column::Float(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Keep rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> Column {
        fn keep<T: Clone>(values: &[T], mask: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(mask)
                .filter(|(_, keep)| **keep)
                .map(|(v, _)| v.clone())
                .collect()
        }

        match self {
            Column::Int(v) => Column::Int(keep(v, mask)),
            Column::Float(v) => Column::Float(keep(v, mask)),
            Column::Str(v) => Column::Str(keep(v, mask)),
            Column::Bool(v) => Column::Bool(keep(v, mask)),
        }
    }

    /// Gather rows in the given order.
    pub fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Int(v) => Column::Int(indices.iter().map(|&i| v[i]).collect()),
            Column::Float(v) => Column::Float(indices.iter().map(|&i| v[i]).collect()),
            Column::Str(v) => Column::Str(indices.iter().map(|&i| v[i].clone()).collect()),
            Column::Bool(v) => Column::Bool(indices.iter().map(|&i| v[i]).collect()),
        }
    }

    /// Number of values selected by `mask`.
    pub fn count_selected(&self, mask: &[bool]) -> usize {
        mask.iter().take(self.len()).filter(|m| **m).count()
    }

    /// Number of distinct values selected by `mask`.
    ///
    /// Floats are compared by bit pattern after folding `-0.0` into `0.0`;
    /// all NaNs count as one value.
    pub fn unique_selected(&self, mask: &[bool]) -> usize {
        let selected = |i: &usize| mask.get(*i).copied().unwrap_or(false);

        match self {
            Column::Int(v) => (0..v.len())
                .filter(selected)
                .map(|i| v[i])
                .collect::<HashSet<_>>()
                .len(),
            Column::Float(v) => (0..v.len())
                .filter(selected)
                .map(|i| float_key(v[i]))
                .collect::<HashSet<_>>()
                .len(),
            Column::Str(v) => (0..v.len())
                .filter(selected)
                .map(|i| v[i].as_str())
                .collect::<HashSet<_>>()
                .len(),
            Column::Bool(v) => (0..v.len())
                .filter(selected)
                .map(|i| v[i])
                .collect::<HashSet<_>>()
                .len(),
        }
    }

    /// Cell rendered as text, for delimited output.
    pub fn render(&self, row: usize) -> String {
        self.get(row).map(|v| v.to_string()).unwrap_or_default()
    }
}

fn float_key(x: f64) -> u64 {
    if x.is_nan() {
        f64::NAN.to_bits()
    } else if x == 0.0 {
        0.0_f64.to_bits()
    } else {
        x.to_bits()
    }
}

impl From<Vec<i64>> for Column {
    fn from(v: Vec<i64>) -> Self {
        Column::Int(v)
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Column::Float(v)
    }
}

impl From<Vec<String>> for Column {
    fn from(v: Vec<String>) -> Self {
        Column::Str(v)
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Column::Str(v.into_iter().map(String::from).collect())
    }
}

impl From<Vec<bool>> for Column {
    fn from(v: Vec<bool>) -> Self {
        Column::Bool(v)
    }
}
