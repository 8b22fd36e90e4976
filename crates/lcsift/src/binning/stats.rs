//! Per-bin mean and spread of a catalog quantity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::SELECTION_FLAG;
use crate::error::Result;
use crate::rules::{evaluate_conjunction, Operator, ResolvedRule, RuleSet};
use crate::table::Table;

use super::bin_spec::BinSpec;

/// Default redshift column of a catalog.
pub const REDSHIFT_COLUMN: &str = "z";

/// How the spread of a bin is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Population standard deviation of the values.
    #[default]
    Std,
    /// Values are per-row errors combined as `1 / sqrt(sum(1 / err^2))`.
    InverseVariance,
}

impl FromStr for Weighting {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "std" => Ok(Weighting::Std),
            "inverse_variance" | "ivar" => Ok(Weighting::InverseVariance),
            _ => Err(format!("Unknown weighting: {}. Use std or inverse-variance.", s)),
        }
    }
}

impl fmt::Display for Weighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weighting::Std => write!(f, "std"),
            Weighting::InverseVariance => write!(f, "inverse-variance"),
        }
    }
}

/// Statistics of one redshift bin. An empty bin has NaN statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinStatistic {
    pub z_low: f64,
    pub z_high: f64,
    /// Mean redshift of the selected rows.
    pub z_center: f64,
    /// Standard deviation of the selected redshifts.
    pub z_spread: f64,
    pub value_mean: f64,
    pub value_spread: f64,
    /// Number of selected rows.
    pub count: usize,
}

impl BinStatistic {
    fn empty(z_low: f64, z_high: f64) -> Self {
        Self {
            z_low,
            z_high,
            z_center: f64::NAN,
            z_spread: f64::NAN,
            value_mean: f64::NAN,
            value_spread: f64::NAN,
            count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Bins a flagged catalog by redshift and summarizes one quantity per bin.
#[derive(Debug, Clone)]
pub struct BinnedStatistics {
    quantity: String,
    redshift_column: String,
    flag_column: String,
    weighting: Weighting,
    extra_rules: RuleSet,
}

impl BinnedStatistics {
    pub fn new(quantity: impl Into<String>) -> Self {
        Self {
            quantity: quantity.into(),
            redshift_column: REDSHIFT_COLUMN.to_string(),
            flag_column: SELECTION_FLAG.to_string(),
            weighting: Weighting::Std,
            extra_rules: RuleSet::default(),
        }
    }

    pub fn with_weighting(mut self, weighting: Weighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn with_redshift_column(mut self, column: impl Into<String>) -> Self {
        self.redshift_column = column.into();
        self
    }

    pub fn with_flag_column(mut self, column: impl Into<String>) -> Self {
        self.flag_column = column.into();
        self
    }

    /// Rules applied in every bin on top of the flag and redshift bounds.
    pub fn with_extra_rules(mut self, rules: RuleSet) -> Self {
        self.extra_rules = rules;
        self
    }

    /// One statistic per bin, in ascending redshift order.
    pub fn aggregate(&self, catalog: &Table, bins: &BinSpec) -> Result<Vec<BinStatistic>> {
        bins.validate()?;
        let extra = self.extra_rules.resolve()?;
        let quantity = catalog.float_values(&self.quantity)?;
        let redshift = catalog.float_values(&self.redshift_column)?;

        bins.edges()
            .into_iter()
            .map(|(low, high)| -> Result<BinStatistic> {
                let mut rules = vec![
                    ResolvedRule::new(&self.flag_column, Operator::Eq, 1_i64),
                    ResolvedRule::new(&self.redshift_column, Operator::Ge, low),
                    ResolvedRule::new(&self.redshift_column, Operator::Lt, high),
                ];
                rules.extend(extra.iter().cloned());
                let mask = evaluate_conjunction(catalog, &rules)?;

                Ok(self.summarize(low, high, &mask, &redshift, &quantity))
            })
            .collect()
    }

    fn summarize(
        &self,
        low: f64,
        high: f64,
        mask: &[bool],
        redshift: &[f64],
        quantity: &[f64],
    ) -> BinStatistic {
        let z = sorted_selection(redshift, mask);
        let values = sorted_selection(quantity, mask);
        if values.is_empty() {
            return BinStatistic::empty(low, high);
        }

        let (z_center, z_spread) = mean_std(&z);
        let (value_mean, std) = mean_std(&values);
        let value_spread = match self.weighting {
            Weighting::Std => std,
            Weighting::InverseVariance => combined_error(&values),
        };

        BinStatistic {
            z_low: low,
            z_high: high,
            z_center,
            z_spread,
            value_mean,
            value_spread,
            count: values.len(),
        }
    }
}

/// Bin `quantity` over `bins` with the default `z` and `sel` columns.
pub fn aggregate(
    catalog: &Table,
    quantity: &str,
    bins: &BinSpec,
    weighting: Weighting,
) -> Result<Vec<BinStatistic>> {
    BinnedStatistics::new(quantity)
        .with_weighting(weighting)
        .aggregate(catalog, bins)
}

/// Selected values in ascending order, so sums do not depend on row order.
fn sorted_selection(values: &[f64], mask: &[bool]) -> Vec<f64> {
    let mut selected: Vec<f64> = values
        .iter()
        .zip(mask)
        .filter(|(_, keep)| **keep)
        .map(|(v, _)| *v)
        .collect();
    selected.sort_by(f64::total_cmp);
    selected
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn combined_error(errors: &[f64]) -> f64 {
    1.0 / errors.iter().map(|e| 1.0 / (e * e)).sum::<f64>().sqrt()
}
