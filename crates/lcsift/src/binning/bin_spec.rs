//! Bin edges.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Edges are rounded to this many decimals so adjacent bins share an
/// exact boundary.
const EDGE_DECIMALS: i32 = 10;

/// Most bins a spec may produce.
pub const MAX_BINS: usize = 100_000;

/// `(z_min, z_max, step)`: bins `[z_min, z_min + step)`, `[z_min + step,
/// z_min + 2 step)`, ... up to `z_max`. A final bin that would end past
/// `z_max` is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    pub z_min: f64,
    pub z_max: f64,
    pub step: f64,
}

impl BinSpec {
    pub fn new(z_min: f64, z_max: f64, step: f64) -> Result<Self, ConfigError> {
        let spec = Self { z_min, z_max, step };
        spec.validate()?;
        Ok(spec)
    }

    /// Bounds and step must be finite, with a positive step and at most
    /// [`MAX_BINS`] bins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.z_min.is_finite() && self.z_max.is_finite() && self.step.is_finite()) {
            return Err(ConfigError::BinSpec("bounds and step must be finite".into()));
        }
        if self.step <= 0.0 {
            return Err(ConfigError::BinSpec(format!("step {} is not positive", self.step)));
        }
        if self.z_max <= self.z_min {
            return Err(ConfigError::BinSpec(format!(
                "z_max {} is not above z_min {}",
                self.z_max, self.z_min
            )));
        }
        let count = self.bin_count();
        if count.is_nan() || count > MAX_BINS as f64 {
            return Err(ConfigError::BinSpec(format!(
                "step {} gives {} bins, more than {}",
                self.step, count, MAX_BINS
            )));
        }
        Ok(())
    }

    fn bin_count(&self) -> f64 {
        ((self.z_max - self.z_min) / self.step + 1e-9).floor()
    }

    /// Number of complete bins.
    pub fn len(&self) -> usize {
        if self.validate().is_err() {
            return 0;
        }
        self.bin_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(low, high)` of every bin, ascending.
    pub fn edges(&self) -> Vec<(f64, f64)> {
        let edge = |i: usize| round(self.z_min + i as f64 * self.step);
        (0..self.len()).map(|i| (edge(i), edge(i + 1))).collect()
    }
}

fn round(x: f64) -> f64 {
    let scale = 10f64.powi(EDGE_DECIMALS);
    (x * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_contiguous() {
        let spec = BinSpec::new(0.01, 0.2, 0.01).unwrap();
        let edges = spec.edges();
        assert_eq!(edges.len(), 19);
        assert_eq!(edges[0], (0.01, 0.02));
        assert_eq!(edges[18], (0.19, 0.2));
        for pair in edges.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn test_partial_final_bin_is_dropped() {
        let spec = BinSpec::new(0.0, 0.25, 0.1).unwrap();
        assert_eq!(spec.edges(), vec![(0.0, 0.1), (0.1, 0.2)]);
    }

    #[test]
    fn test_invalid_specs() {
        assert!(BinSpec::new(0.1, 0.1, 0.01).is_err());
        assert!(BinSpec::new(0.0, 0.1, 0.0).is_err());
        assert!(BinSpec::new(0.0, f64::INFINITY, 0.1).is_err());
        let bad = BinSpec { z_min: 0.2, z_max: 0.1, step: 0.01 };
        assert!(bad.is_empty());
    }

    #[test]
    fn test_too_many_bins_rejected() {
        assert!(matches!(
            BinSpec::new(0.0, 1.0, 1e-300),
            Err(ConfigError::BinSpec(_))
        ));
        assert!(BinSpec::new(0.0, 1.0, 1.0 / MAX_BINS as f64).is_ok());

        let unchecked = BinSpec { z_min: 0.0, z_max: 1.0, step: 1e-300 };
        assert!(unchecked.is_empty());
        assert!(unchecked.edges().is_empty());
    }
}
