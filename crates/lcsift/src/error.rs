//! Error types for the lcsift library.

use std::path::PathBuf;
use thiserror::Error;

/// Problems with user-supplied configuration: rule tables, metric
/// definitions, bin specifications.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Operator symbol outside the closed set.
    #[error("unknown operator '{0}' (expected one of ==, !=, <, <=, >, >=)")]
    UnknownOperator(String),

    /// Value type outside the closed set.
    #[error("unknown value type '{0}' (expected one of int, float, str, bool)")]
    UnknownType(String),

    /// Threshold literal could not be coerced to its declared type.
    #[error("cannot coerce threshold '{literal}' to {target}")]
    Coercion { literal: String, target: String },

    /// Threshold type cannot be compared with the column type.
    #[error("column '{column}' holds {column_type} values but the threshold is {threshold_type}")]
    TypeMismatch {
        column: String,
        column_type: String,
        threshold_type: String,
    },

    /// A metric definition row is incomplete or inconsistent.
    #[error("malformed metric definition '{name}': {message}")]
    MetricDefinition { name: String, message: String },

    /// Invalid redshift binning.
    #[error("invalid bin specification: {0}")]
    BinSpec(String),
}

/// Main error type for lcsift operations.
#[derive(Debug, Error)]
pub enum LcSiftError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A light curve could not be retrieved from the store.
    #[error("Missing data: no table stored at '{path}'")]
    MissingData { path: String },

    /// A table lacks a column the operation needs.
    #[error("Missing column '{column}'")]
    MissingColumn { column: String },

    /// A table lacks a required metadata key.
    #[error("Missing metadata key '{key}'")]
    MissingMetadata { key: String },

    /// A column does not match the table's row count.
    #[error("Column '{column}' has {actual} rows, table has {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// A value of the wrong type was used where a specific type is required.
    #[error("Column '{column}' must be {expected}")]
    ColumnType { column: String, expected: String },

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LcSiftError {
    pub(crate) fn missing_column(column: impl Into<String>) -> Self {
        LcSiftError::MissingColumn {
            column: column.into(),
        }
    }

    pub(crate) fn missing_metadata(key: impl Into<String>) -> Self {
        LcSiftError::MissingMetadata { key: key.into() }
    }
}

/// Result type alias for lcsift operations.
pub type Result<T> = std::result::Result<T, LcSiftError>;
