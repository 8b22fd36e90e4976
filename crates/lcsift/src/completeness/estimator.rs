//! Completeness redshift from binned statistics.

use serde::{Deserialize, Serialize};

use crate::binning::BinStatistic;

use super::interpolate::Interpolant;

/// Crossing redshifts of the statistic and of its one-sigma band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletenessResult {
    pub z_completeness: f64,
    /// Crossing of `value_mean + value_spread`.
    pub z_completeness_upper: f64,
    /// Crossing of `value_mean - value_spread`.
    pub z_completeness_lower: f64,
}

/// Outcome of a completeness estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Completeness {
    Estimated(CompletenessResult),
    /// Fewer than two finite bins remained for at least one interpolant.
    Undefined { valid_bins: usize },
}

impl Completeness {
    pub fn result(&self) -> Option<&CompletenessResult> {
        match self {
            Completeness::Estimated(result) => Some(result),
            Completeness::Undefined { .. } => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Completeness::Estimated(_))
    }
}

/// Inverts binned statistics at a target value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletenessEstimator {
    target: f64,
    warn_non_monotonic: bool,
}

impl CompletenessEstimator {
    pub fn new(target: f64) -> Self {
        Self {
            target,
            warn_non_monotonic: false,
        }
    }

    /// Log a warning when the statistic is not monotonic in redshift.
    /// The estimate itself is unchanged.
    pub fn with_warn_non_monotonic(mut self, warn: bool) -> Self {
        self.warn_non_monotonic = warn;
        self
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn estimate(&self, bins: &[BinStatistic]) -> Completeness {
        let build = |shift: f64| {
            Interpolant::new(
                bins.iter()
                    .map(|b| (b.value_mean + shift * b.value_spread, b.z_center)),
            )
        };
        let central = build(0.0);
        let upper = build(1.0);
        let lower = build(-1.0);

        let valid_bins = central.len().min(upper.len()).min(lower.len());
        if valid_bins < 2 {
            log::warn!(
                "Completeness undefined: {} usable bins of {}",
                valid_bins,
                bins.len()
            );
            return Completeness::Undefined { valid_bins };
        }

        if self.warn_non_monotonic && !central.is_monotonic() {
            log::warn!(
                "Binned statistic is not monotonic in redshift; the crossing at {} may be ambiguous",
                self.target
            );
        }

        let result = CompletenessResult {
            z_completeness: central.eval(self.target),
            z_completeness_upper: upper.eval(self.target),
            z_completeness_lower: lower.eval(self.target),
        };
        log::info!(
            "Completeness redshift {:.4} (+{:.4} / -{:.4})",
            result.z_completeness,
            result.z_completeness_upper,
            result.z_completeness_lower
        );
        Completeness::Estimated(result)
    }
}

/// Estimate completeness at `target` without the monotonicity warning.
pub fn estimate(bins: &[BinStatistic], target: f64) -> Completeness {
    CompletenessEstimator::new(target).estimate(bins)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bin(z_center: f64, value_mean: f64, value_spread: f64) -> BinStatistic {
        BinStatistic {
            z_low: z_center - 0.025,
            z_high: z_center + 0.025,
            z_center,
            z_spread: 0.0,
            value_mean,
            value_spread,
            count: 1,
        }
    }

    #[test]
    fn test_exact_grid_hit() {
        let bins = vec![bin(0.05, 0.02, 0.0), bin(0.10, 0.04, 0.0), bin(0.15, 0.06, 0.0)];
        let result = *estimate(&bins, 0.04).result().unwrap();
        assert_eq!(result.z_completeness, 0.10);
        assert_eq!(result.z_completeness_upper, 0.10);
        assert_eq!(result.z_completeness_lower, 0.10);
    }

    #[test]
    fn test_spread_brackets_crossing() {
        let bins = vec![bin(0.05, 0.02, 0.01), bin(0.10, 0.04, 0.01), bin(0.15, 0.06, 0.01)];
        let result = *estimate(&bins, 0.04).result().unwrap();
        // Shifting the statistic up crosses the target earlier.
        assert!((result.z_completeness_upper - 0.075).abs() < 1e-12);
        assert!((result.z_completeness_lower - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_target_is_zero_not_undefined() {
        let bins = vec![bin(0.05, 0.02, 0.0), bin(0.10, 0.04, 0.0)];
        let completeness = estimate(&bins, 0.5);
        assert_eq!(completeness.result().unwrap().z_completeness, 0.0);
    }

    #[test]
    fn test_nan_bins_excluded() {
        let nan = bin(f64::NAN, f64::NAN, f64::NAN);
        let bins = vec![bin(0.05, 0.02, 0.0), nan.clone(), bin(0.15, 0.06, 0.0)];
        let result = *estimate(&bins, 0.04).result().unwrap();
        assert!((result.z_completeness - 0.10).abs() < 1e-12);

        let sparse = vec![bin(0.05, 0.02, 0.0), nan.clone(), nan];
        assert_eq!(
            estimate(&sparse, 0.04),
            Completeness::Undefined { valid_bins: 1 }
        );
    }

    #[test]
    fn test_non_monotonic_warning_keeps_result() {
        let bins = vec![bin(0.05, 0.02, 0.0), bin(0.10, 0.05, 0.0), bin(0.15, 0.04, 0.0)];
        let plain = estimate(&bins, 0.03);
        let warned = CompletenessEstimator::new(0.03)
            .with_warn_non_monotonic(true)
            .estimate(&bins);
        assert_eq!(plain, warned);
        assert!(plain.is_defined());
    }
}
