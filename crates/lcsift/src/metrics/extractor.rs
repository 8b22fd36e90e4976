//! Per-light-curve metric extraction.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rules::{count_where, evaluate_conjunction};
use crate::table::{Column, Table};

use super::definition::MetricDefinitions;

/// Column names a light curve must provide.
pub const TIME: &str = "time";
pub const FLUX: &str = "flux";
pub const FLUX_ERR: &str = "fluxerr";
pub const BAND: &str = "band";

/// Derived per-point columns.
pub const SNR: &str = "SNR";
pub const PHASE: &str = "phase";
pub const NIGHT: &str = "night";

/// Metadata keys a light curve must provide.
pub const REDSHIFT_KEY: &str = "z";
pub const T0_KEY: &str = "t0";

/// Outcome of measuring one light curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "values", rename_all = "snake_case")]
pub enum MetricOutcome {
    /// Metrics computed from the curve; counts may be zero.
    Computed(IndexMap<String, i64>),
    /// No usable light curve existed; nothing was computed.
    NoData,
}

impl MetricOutcome {
    /// Table value for metrics that were not computed.
    pub const NOT_COMPUTED: i64 = -1;

    pub fn is_no_data(&self) -> bool {
        matches!(self, MetricOutcome::NoData)
    }

    /// Value of one metric as written to a table.
    pub fn value(&self, name: &str) -> i64 {
        match self {
            MetricOutcome::Computed(values) => {
                values.get(name).copied().unwrap_or(Self::NOT_COMPUTED)
            }
            MetricOutcome::NoData => Self::NOT_COMPUTED,
        }
    }

    /// Fixed-shape row: one value per definition, `-1` for `NoData`.
    pub fn to_values(&self, defs: &MetricDefinitions) -> IndexMap<String, i64> {
        defs.names()
            .map(|name| (name.to_string(), self.value(name)))
            .collect()
    }
}

/// Add `SNR` and `phase`, keep points with `SNR >= snr_threshold`, sort by
/// time and number the nights.
///
/// `night` is 1-based and counted from the earliest point that survives the
/// cut. Derived columns already present on the input are recomputed.
pub fn prepare(light_curve: &Table, snr_threshold: f64) -> Result<Table> {
    if light_curve.is_empty() {
        return Ok(light_curve.clone());
    }

    let z = light_curve.meta_f64(REDSHIFT_KEY)?;
    let t0 = light_curve.meta_f64(T0_KEY)?;
    let time = light_curve.float_values(TIME)?;
    let flux = light_curve.float_values(FLUX)?;
    let flux_err = light_curve.float_values(FLUX_ERR)?;
    light_curve.column(BAND)?;

    let snr: Vec<f64> = flux.iter().zip(&flux_err).map(|(f, e)| f / e).collect();
    let phase: Vec<f64> = time.iter().map(|t| (t - t0) / (1.0 + z)).collect();
    let keep: Vec<bool> = snr.iter().map(|s| *s >= snr_threshold).collect();

    let mut augmented = light_curve.clone();
    augmented.push_column(SNR, Column::Float(snr))?;
    augmented.push_column(PHASE, Column::Float(phase))?;

    let mut prepared = augmented.filter(&keep).sorted_by(TIME)?;
    let kept_time = prepared.float_values(TIME)?;
    let first = kept_time.first().copied().unwrap_or(0.0);
    let night = kept_time
        .iter()
        .map(|t| (t - first).floor() as i64 + 1)
        .collect();
    prepared.push_column(NIGHT, Column::Int(night))?;

    Ok(prepared)
}

/// Evaluate every metric against a prepared light curve.
///
/// An empty prepared curve yields zero for every metric; the definitions are
/// still validated.
pub fn extract(prepared: &Table, defs: &MetricDefinitions) -> Result<IndexMap<String, i64>> {
    let resolved = defs.resolve()?;
    let mut values = IndexMap::with_capacity(resolved.len());

    for (def, rules) in resolved {
        let count = if prepared.is_empty() {
            0
        } else {
            let mask = evaluate_conjunction(prepared, &rules)?;
            count_where(prepared, &def.col, &mask, def.counts_unique())?
        };
        values.insert(def.name.clone(), count as i64);
    }

    Ok(values)
}

/// Prepare and extract in one step.
///
/// A light curve without rows is the "no usable data" sentinel and
/// short-circuits to [`MetricOutcome::NoData`].
pub fn measure(
    light_curve: &Table,
    defs: &MetricDefinitions,
    snr_threshold: f64,
) -> Result<MetricOutcome> {
    if light_curve.is_empty() {
        return Ok(MetricOutcome::NoData);
    }
    let prepared = prepare(light_curve, snr_threshold)?;
    Ok(MetricOutcome::Computed(extract(&prepared, defs)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricDefinition;

    fn light_curve(flux: Vec<f64>) -> Table {
        let n = flux.len();
        Table::from_columns([
            ("time", Column::from(vec![59002.6, 59000.2, 59000.4, 59001.9, 59010.1][..n].to_vec())),
            ("flux", Column::from(flux)),
            ("fluxerr", Column::from(vec![1.0; n])),
            ("band", Column::from(vec!["ztfg", "ztfr", "ztfg", "ztfr", "ztfi"][..n].to_vec())),
        ])
        .unwrap()
        .with_meta("z", 0.1)
        .with_meta("t0", 59001.0)
    }

    fn definitions() -> MetricDefinitions {
        MetricDefinitions::new(vec![
            MetricDefinition::new("n_bef", "night", "phase", "float", "<", "0"),
            MetricDefinition::new("n_epochs_bef", "night", "phase", "float", "<", "0"),
            MetricDefinition::new("n_aft", "night", "phase", "float", ">=", "0"),
            MetricDefinition::new("n_bands", "band", "phase", "float", ">=", "-100"),
            MetricDefinition::new("n_g", "band", "band", "str", "==", "ztfg"),
        ])
    }

    #[test]
    fn test_prepare_derives_sorted_nights() {
        let prepared = prepare(&light_curve(vec![10.0, 10.0, 0.5, 10.0, 10.0]), 1.0).unwrap();

        assert_eq!(prepared.row_count(), 4);
        assert_eq!(
            prepared.float_values("time").unwrap(),
            vec![59000.2, 59001.9, 59002.6, 59010.1]
        );
        assert_eq!(
            prepared.column("night").unwrap(),
            &Column::Int(vec![1, 2, 3, 10])
        );
        let phase = prepared.float_values("phase").unwrap();
        assert!((phase[0] - (59000.2 - 59001.0) / 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_prepare_is_deterministic() {
        let lc = light_curve(vec![3.0, 4.0, 5.0, 6.0, 7.0]);
        let first = prepare(&lc, 1.0).unwrap();
        let second = prepare(&first, 1.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extract_counts() {
        let prepared = prepare(&light_curve(vec![10.0; 5]), 1.0).unwrap();
        let values = extract(&prepared, &definitions()).unwrap();

        assert_eq!(values["n_bef"], 2);
        assert_eq!(values["n_epochs_bef"], 1);
        assert_eq!(values["n_aft"], 3);
        assert_eq!(values["n_bands"], 3);
        assert_eq!(values["n_g"], 2);
    }

    #[test]
    fn test_all_points_below_snr_give_zero_counts() {
        let lc = light_curve(vec![0.1; 5]);
        let prepared = prepare(&lc, 5.0).unwrap();
        assert_eq!(prepared.row_count(), 0);

        let outcome = measure(&lc, &definitions(), 5.0).unwrap();
        let values = outcome.to_values(&definitions());
        assert!(values.values().all(|v| *v == 0));
        assert!(!outcome.is_no_data());
    }

    #[test]
    fn test_empty_light_curve_is_no_data() {
        let outcome = measure(&Table::new(), &definitions(), 1.0).unwrap();
        assert_eq!(outcome, MetricOutcome::NoData);
        assert!(outcome.to_values(&definitions()).values().all(|v| *v == -1));
    }

    #[test]
    fn test_missing_redshift_is_an_error() {
        let mut lc = light_curve(vec![10.0; 5]);
        lc.meta.shift_remove("z");
        assert!(prepare(&lc, 1.0).is_err());
    }
}
