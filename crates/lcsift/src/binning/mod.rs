//! Redshift binning of a flagged catalog.
//!
//! Bins are left-closed and right-open. Each bin is selected with fresh
//! rules (`flag == 1`, `z >= low`, `z < high`, plus any extra rules), so no
//! bin depends on another.

mod bin_spec;
mod efficiency;
mod stats;

pub use bin_spec::{BinSpec, MAX_BINS};
pub use efficiency::{efficiency, EfficiencyBin};
pub use stats::{aggregate, BinStatistic, BinnedStatistics, Weighting, REDSHIFT_COLUMN};
