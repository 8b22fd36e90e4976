//! Redshift at which a binned statistic crosses a target value.
//!
//! The binned statistic is inverted: `value_mean` is the independent axis and
//! `z_center` the dependent one. This assumes the statistic is monotonic in
//! redshift over the region of interest. Nothing enforces that; enable
//! [`CompletenessEstimator::with_warn_non_monotonic`] to have it logged.

mod estimator;
mod interpolate;

pub use estimator::{estimate, Completeness, CompletenessEstimator, CompletenessResult};
pub use interpolate::{Interpolant, OUT_OF_DOMAIN};
