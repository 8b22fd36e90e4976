//! In-memory store.

use indexmap::IndexMap;

use crate::error::{LcSiftError, Result};
use crate::table::Table;

use super::LightCurveStore;

/// Tables held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: IndexMap<String, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a table, replacing whatever was at `path`.
    pub fn insert(&mut self, path: impl Into<String>, table: Table) {
        self.tables.insert(path.into(), table);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_table(mut self, path: impl Into<String>, table: Table) -> Self {
        self.insert(path, table);
        self
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl LightCurveStore for MemoryStore {
    fn get_table(&self, path: &str) -> Result<Table> {
        self.tables
            .get(path)
            .cloned()
            .ok_or_else(|| LcSiftError::MissingData {
                path: path.to_string(),
            })
    }

    fn contains(&self, path: &str) -> bool {
        self.tables.contains_key(path)
    }
}
