//! Light-curve fitting wrapper.
//!
//! The fitter itself is an external collaborator behind
//! [`LightCurveFitter`]. This module turns each fit attempt into a
//! fixed-shape summary row, whatever the attempt's outcome.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{PATH_COLUMN, SELECTION_FLAG};
use crate::error::Result;
use crate::metrics::REDSHIFT_KEY;
use crate::store::LightCurveStore;
use crate::table::{Column, Table};

/// Summary column holding the fit status.
pub const FIT_STATUS: &str = "fitstatus";

/// Value of a summary column the fit did not produce.
pub const NOT_FITTED: f64 = -1.0;

/// Parameter values keyed by name.
pub type FitParameters = IndexMap<String, f64>;

/// Inclusive `(low, high)` bounds keyed by parameter name.
pub type FitBounds = IndexMap<String, (f64, f64)>;

/// A fit attempt that failed for any reason.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("fit failed: {message}")]
pub struct FitFailure {
    pub message: String,
}

impl FitFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fits a model to one light curve.
///
/// On success, returns the flattened result: parameter values, their errors
/// and covariances, `chisq` and `ndof`, keyed the way the summary columns
/// are named.
pub trait LightCurveFitter {
    fn fit(
        &self,
        light_curve: &Table,
        free_parameters: &[String],
        bounds: &FitBounds,
    ) -> std::result::Result<FitParameters, FitFailure>;
}

impl<F: LightCurveFitter + ?Sized> LightCurveFitter for &F {
    fn fit(
        &self,
        light_curve: &Table,
        free_parameters: &[String],
        bounds: &FitBounds,
    ) -> std::result::Result<FitParameters, FitFailure> {
        (**self).fit(light_curve, free_parameters, bounds)
    }
}

/// Free parameters and summary columns of a fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub free_parameters: Vec<String>,
    pub summary_columns: Vec<String>,
    /// Half-width of the redshift bound around the curve's true redshift.
    pub z_bound_err: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        let strings = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            free_parameters: strings(&["z", "t0", "x0", "x1", "c"]),
            summary_columns: strings(&[
                "z", "z_err", "t0", "t0_err", "x0", "x0_err", "x1", "x1_err", "c", "c_err",
                "chisq", "ndof", "z_t0_cov", "z_x0_cov", "z_x1_cov", "z_c_cov", "x0_t0_cov",
                "x0_x1_cov", "x0_c_cov", "t0_x1_cov", "t0_c_cov", "x1_c_cov",
            ]),
            z_bound_err: 1e-4,
        }
    }
}

impl FitConfig {
    pub fn with_free_parameters(mut self, parameters: Vec<String>) -> Self {
        self.free_parameters = parameters;
        self
    }

    pub fn with_summary_columns(mut self, columns: Vec<String>) -> Self {
        self.summary_columns = columns;
        self
    }

    pub fn with_z_bound_err(mut self, z_bound_err: f64) -> Self {
        self.z_bound_err = z_bound_err;
        self
    }

    /// Output name of a summary column. Free parameters gain a `_fit`
    /// suffix so they do not collide with the catalog's true values.
    pub fn output_name(&self, column: &str) -> String {
        if self.free_parameters.iter().any(|p| p == column) {
            format!("{}_fit", column)
        } else {
            column.to_string()
        }
    }

    /// Output names of every summary column, in declaration order.
    pub fn output_names(&self) -> Vec<String> {
        self.summary_columns
            .iter()
            .map(|c| self.output_name(c))
            .collect()
    }

    /// Redshift bound around the curve's `z` metadata.
    pub fn bounds(&self, light_curve: &Table) -> Result<FitBounds> {
        let z = light_curve.meta_f64(REDSHIFT_KEY)?;
        let mut bounds = FitBounds::new();
        bounds.insert(
            REDSHIFT_KEY.to_string(),
            (z - self.z_bound_err, z + self.z_bound_err),
        );
        Ok(bounds)
    }
}

/// Outcome of one fit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitStatus {
    /// The light curve had no rows; no fit was attempted.
    NoData,
    /// The fitter returned an error.
    FitCrash,
    FitOk,
}

impl fmt::Display for FitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitStatus::NoData => write!(f, "nodata"),
            FitStatus::FitCrash => write!(f, "fitcrash"),
            FitStatus::FitOk => write!(f, "fitok"),
        }
    }
}

/// Fixed-shape summary of one fit: every configured column, by output name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitSummary {
    pub status: FitStatus,
    pub values: IndexMap<String, f64>,
}

impl FitSummary {
    /// Fit `light_curve` and summarize the outcome.
    ///
    /// Only missing redshift metadata on a non-empty curve is an error; a
    /// failing fitter yields a `fitcrash` summary.
    pub fn from_light_curve(
        fitter: &impl LightCurveFitter,
        light_curve: &Table,
        config: &FitConfig,
    ) -> Result<Self> {
        if light_curve.row_count() == 0 {
            return Ok(Self::unfitted(FitStatus::NoData, config));
        }

        let bounds = config.bounds(light_curve)?;
        match fitter.fit(light_curve, &config.free_parameters, &bounds) {
            Ok(parameters) => {
                let values = config
                    .summary_columns
                    .iter()
                    .map(|c| {
                        let value = parameters.get(c).copied().unwrap_or(NOT_FITTED);
                        (config.output_name(c), value)
                    })
                    .collect();
                Ok(Self {
                    status: FitStatus::FitOk,
                    values,
                })
            }
            Err(failure) => {
                log::debug!("{}", failure);
                Ok(Self::unfitted(FitStatus::FitCrash, config))
            }
        }
    }

    fn unfitted(status: FitStatus, config: &FitConfig) -> Self {
        Self {
            status,
            values: config
                .output_names()
                .into_iter()
                .map(|name| (name, NOT_FITTED))
                .collect(),
        }
    }
}

/// Fit every selected catalog row and append the summaries as columns.
///
/// Rows with `sel == 1` are fetched from `store`; every other row is
/// summarized as `nodata` without a store lookup.
pub fn fit_catalog(
    catalog: &Table,
    store: &impl LightCurveStore,
    fitter: &impl LightCurveFitter,
    config: &FitConfig,
) -> Result<Table> {
    let names = config.output_names();
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(catalog.row_count()); names.len()];
    let mut statuses = Vec::with_capacity(catalog.row_count());

    if catalog.row_count() > 0 {
        let paths = catalog.str_values(PATH_COLUMN)?;
        let flags = catalog.float_values(SELECTION_FLAG)?;

        for (path, flag) in paths.iter().zip(&flags) {
            let light_curve = if *flag == 1.0 {
                store.get_table(path)?
            } else {
                Table::new()
            };
            let summary = FitSummary::from_light_curve(fitter, &light_curve, config)?;
            log::debug!("Fit '{}': {}", path, summary.status);

            for (values, name) in columns.iter_mut().zip(&names) {
                values.push(summary.values.get(name).copied().unwrap_or(NOT_FITTED));
            }
            statuses.push(summary.status.to_string());
        }

        let fitted = statuses.iter().filter(|s| *s == "fitok").count();
        log::info!("Fitted {} of {} catalog rows", fitted, catalog.row_count());
    }

    let mut output = catalog.clone();
    for (name, values) in names.into_iter().zip(columns) {
        output.push_column(name, Column::Float(values))?;
    }
    output.push_column(FIT_STATUS, Column::Str(statuses))?;
    Ok(output)
}
