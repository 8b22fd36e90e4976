//! lcsift: quality metrics, selection and completeness for simulated
//! light-curve catalogs.
//!
//! A catalog holds one row per simulated transient, each pointing at a light
//! curve in a [`LightCurveStore`]. The pipeline:
//!
//! 1. [`CatalogAggregator`] counts per-object quality metrics (epochs,
//!    bands, points before and after peak) from each light curve.
//! 2. [`SelectionFlagger`] combines a rule table into a `sel` flag.
//! 3. [`BinnedStatistics`] summarizes a quantity per redshift bin.
//! 4. [`CompletenessEstimator`] finds the redshift where that quantity
//!    crosses a target value.
//!
//! Every selection is expressed as [`Rule`] rows (`column op threshold
//! type`), so adding a criterion means adding a row.
//!
//! # Example
//!
//! ```no_run
//! use lcsift::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::load("pipeline.json").unwrap();
//! let (output, report) = Pipeline::new(config).run_path("data/meta").unwrap();
//!
//! println!("Selected: {} of {}", report.selected, output.catalog.row_count());
//! ```

pub mod binning;
pub mod catalog;
pub mod completeness;
pub mod error;
pub mod fit;
pub mod metrics;
pub mod pipeline;
pub mod rules;
pub mod store;
pub mod table;

pub use binning::{BinSpec, BinStatistic, BinnedStatistics, EfficiencyBin, Weighting};
pub use catalog::{CatalogAggregator, RatioColumn, SelectionFlagger};
pub use completeness::{Completeness, CompletenessEstimator, CompletenessResult};
pub use error::{ConfigError, LcSiftError, Result};
pub use fit::{FitConfig, FitFailure, FitStatus, FitSummary, LightCurveFitter};
pub use metrics::{MetricDefinition, MetricDefinitions, MetricOutcome};
pub use pipeline::{Pipeline, PipelineConfig, PipelineOutput, PipelineReport, RunProvenance};
pub use rules::{Operator, Rule, RuleSet};
pub use store::{CsvDirectoryStore, LightCurveStore, MemoryStore};
pub use table::{Column, Table, Value, ValueType};
