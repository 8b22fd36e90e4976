//! Catalog-wide operations: per-object metrics and selection flags.

mod aggregator;
mod selection;

pub use aggregator::{CatalogAggregator, DEFAULT_BAD_MARKER, PATH_COLUMN};
pub use selection::{add_ratio_column, RatioColumn, SelectionFlagger, SELECTION_FLAG};
