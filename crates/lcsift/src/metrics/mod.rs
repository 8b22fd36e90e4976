//! Per-light-curve quality metrics.
//!
//! A light curve is first prepared (SNR cut, derived `phase` and `night`),
//! then every [`MetricDefinition`] is evaluated into a single count.

mod definition;
mod extractor;

pub use definition::{MetricDefinition, MetricDefinitions};
pub use extractor::{
    extract, measure, prepare, MetricOutcome, BAND, FLUX, FLUX_ERR, NIGHT, PHASE, REDSHIFT_KEY,
    SNR, T0_KEY, TIME,
};
