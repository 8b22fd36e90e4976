//! Light-curve stores: where catalogs and light curves are looked up.
//!
//! The pipeline only needs `get_table(path)`. The catalog lives at
//! [`CATALOG_PATH`]; every other path names one light curve.

mod csv_dir;
mod memory;

pub use csv_dir::{file_hash, open_light_curve_store, CsvDirectoryStore};
pub use memory::MemoryStore;

use crate::error::Result;
use crate::table::Table;

/// Path of the metadata catalog inside a store.
pub const CATALOG_PATH: &str = "meta";

/// Catalog metadata key naming the directory of the light-curve store.
pub const DIRECTORY_KEY: &str = "directory";

/// Catalog metadata key naming the light-curve store inside that directory.
pub const FILE_NAME_KEY: &str = "file_name";

/// A key-value store of tables.
pub trait LightCurveStore {
    /// Retrieve the table stored at `path`.
    ///
    /// A path with nothing stored at it is [`LcSiftError::MissingData`].
    ///
    /// [`LcSiftError::MissingData`]: crate::LcSiftError::MissingData
    fn get_table(&self, path: &str) -> Result<Table>;

    /// Whether anything is stored at `path`.
    fn contains(&self, path: &str) -> bool;

    /// The metadata catalog.
    fn catalog(&self) -> Result<Table> {
        self.get_table(CATALOG_PATH)
    }
}

impl<S: LightCurveStore + ?Sized> LightCurveStore for &S {
    fn get_table(&self, path: &str) -> Result<Table> {
        (**self).get_table(path)
    }

    fn contains(&self, path: &str) -> bool {
        (**self).contains(path)
    }
}
