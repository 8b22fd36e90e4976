//! Selection efficiency per redshift bin.

use serde::Serialize;

use crate::error::Result;
use crate::rules::{evaluate_conjunction, Operator, ResolvedRule, RuleSet};
use crate::table::Table;

use super::bin_spec::BinSpec;

/// Fraction of a bin's objects passing a rule set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EfficiencyBin {
    pub z_low: f64,
    pub z_high: f64,
    /// Objects inside the bin.
    pub total: usize,
    /// Objects inside the bin passing every rule.
    pub selected: usize,
    /// `selected / total`, NaN for an empty bin.
    pub efficiency: f64,
}

/// Efficiency of `rules` in every bin of `bins`.
///
/// Typical rule sets are `sel == 1`, or `sel == 1 AND n_i_band == 0` to
/// follow a band subset.
pub fn efficiency(
    catalog: &Table,
    bins: &BinSpec,
    redshift_column: &str,
    rules: &RuleSet,
) -> Result<Vec<EfficiencyBin>> {
    bins.validate()?;
    let passing = rules.evaluate(catalog)?;

    bins.edges()
        .into_iter()
        .map(|(low, high)| -> Result<EfficiencyBin> {
            let in_bin = evaluate_conjunction(
                catalog,
                &[
                    ResolvedRule::new(redshift_column, Operator::Ge, low),
                    ResolvedRule::new(redshift_column, Operator::Lt, high),
                ],
            )?;
            let total = in_bin.iter().filter(|b| **b).count();
            let selected = in_bin
                .iter()
                .zip(&passing)
                .filter(|(b, p)| **b && **p)
                .count();
            let efficiency = if total == 0 {
                f64::NAN
            } else {
                selected as f64 / total as f64
            };

            Ok(EfficiencyBin {
                z_low: low,
                z_high: high,
                total,
                selected,
                efficiency,
            })
        })
        .collect()
}
