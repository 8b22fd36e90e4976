//! Catalog-wide selection flags.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rules::{evaluate_conjunction, RuleSet};
use crate::table::{Column, Table};

/// Default name of the selection flag column.
pub const SELECTION_FLAG: &str = "sel";

/// Writes a 0/1 flag column from the conjunction of a rule set.
#[derive(Debug, Clone, Default)]
pub struct SelectionFlagger {
    rules: RuleSet,
    flag_column: String,
}

impl SelectionFlagger {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            flag_column: SELECTION_FLAG.to_string(),
        }
    }

    pub fn with_flag_column(mut self, column: impl Into<String>) -> Self {
        self.flag_column = column.into();
        self
    }

    pub fn flag_column(&self) -> &str {
        &self.flag_column
    }

    /// Set the flag column of `catalog` in place: 1 where every rule holds,
    /// 0 elsewhere. An existing flag column is overwritten.
    ///
    /// Returns the same catalog so calls can be chained.
    pub fn flag<'t>(&self, catalog: &'t mut Table) -> Result<&'t mut Table> {
        let mask = evaluate_conjunction(catalog, &self.rules.resolve()?)?;
        let selected = mask.iter().filter(|m| **m).count();
        let flags = mask.into_iter().map(i64::from).collect();
        catalog.push_column(self.flag_column.clone(), Column::Int(flags))?;

        log::info!(
            "Selected {} of {} catalog rows into '{}'",
            selected,
            catalog.row_count(),
            self.flag_column
        );
        Ok(catalog)
    }
}

/// A derived `numerator / denominator` column, such as
/// `chi2 = chisq / ndof`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioColumn {
    pub numerator: String,
    pub denominator: String,
    pub output: String,
}

impl Default for RatioColumn {
    fn default() -> Self {
        Self {
            numerator: "chisq".to_string(),
            denominator: "ndof".to_string(),
            output: "chi2".to_string(),
        }
    }
}

impl RatioColumn {
    /// Compute the ratio into `catalog` in place.
    ///
    /// A zero denominator yields NaN, which satisfies no rule, so such rows
    /// drop out of any selection on the ratio.
    pub fn apply<'t>(&self, catalog: &'t mut Table) -> Result<&'t mut Table> {
        let numerator = catalog.float_values(&self.numerator)?;
        let denominator = catalog.float_values(&self.denominator)?;
        let ratio = numerator
            .iter()
            .zip(&denominator)
            .map(|(n, d)| if *d == 0.0 { f64::NAN } else { n / d })
            .collect();
        catalog.push_column(self.output.clone(), Column::Float(ratio))?;
        Ok(catalog)
    }
}

/// Shorthand for [`RatioColumn::apply`].
pub fn add_ratio_column<'t>(
    catalog: &'t mut Table,
    numerator: &str,
    denominator: &str,
    output: &str,
) -> Result<&'t mut Table> {
    RatioColumn {
        numerator: numerator.to_string(),
        denominator: denominator.to_string(),
        output: output.to_string(),
    }
    .apply(catalog)
}
