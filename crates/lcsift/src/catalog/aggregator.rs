//! Per-object metric aggregation over a metadata catalog.

use crate::error::Result;
use crate::metrics::{measure, MetricDefinitions, MetricOutcome};
use crate::store::LightCurveStore;
use crate::table::{Column, Table};

/// Catalog column holding each object's light-curve path.
pub const PATH_COLUMN: &str = "path";

/// Substring marking catalog rows without a usable light curve.
pub const DEFAULT_BAD_MARKER: &str = "bad";

/// Runs the metric extractor over every row of a catalog.
#[derive(Debug, Clone)]
pub struct CatalogAggregator {
    definitions: MetricDefinitions,
    snr_threshold: f64,
    bad_marker: String,
    path_column: String,
}

impl CatalogAggregator {
    /// Aggregator with an SNR cut of 1 and the `"bad"` marker.
    pub fn new(definitions: MetricDefinitions) -> Self {
        Self {
            definitions,
            snr_threshold: 1.0,
            bad_marker: DEFAULT_BAD_MARKER.to_string(),
            path_column: PATH_COLUMN.to_string(),
        }
    }

    pub fn with_snr_threshold(mut self, snr_threshold: f64) -> Self {
        self.snr_threshold = snr_threshold;
        self
    }

    /// Rows whose path contains `marker` skip the store. An empty marker
    /// marks nothing.
    pub fn with_bad_marker(mut self, marker: impl Into<String>) -> Self {
        self.bad_marker = marker.into();
        self
    }

    pub fn with_path_column(mut self, column: impl Into<String>) -> Self {
        self.path_column = column.into();
        self
    }

    pub fn definitions(&self) -> &MetricDefinitions {
        &self.definitions
    }

    /// Whether a path carries the bad marker.
    pub fn is_bad(&self, path: &str) -> bool {
        !self.bad_marker.is_empty() && path.contains(&self.bad_marker)
    }

    /// Metrics for the object at `path`.
    ///
    /// Bad-marked paths never touch the store. Any other path must exist in
    /// the store.
    pub fn measure_path(&self, path: &str, store: &impl LightCurveStore) -> Result<MetricOutcome> {
        if self.is_bad(path) {
            return Ok(MetricOutcome::NoData);
        }
        let light_curve = store.get_table(path)?;
        measure(&light_curve, &self.definitions, self.snr_threshold)
    }

    /// Copy of `catalog` with one integer column per metric appended.
    ///
    /// Row order and table metadata are preserved. The first failing row
    /// aborts the run.
    pub fn run(&self, catalog: &Table, store: &impl LightCurveStore) -> Result<Table> {
        // Surface configuration errors before touching any row.
        self.definitions.resolve()?;

        let rows = catalog.row_count();
        let mut columns: Vec<Vec<i64>> = vec![Vec::with_capacity(rows); self.definitions.len()];

        if rows > 0 {
            let paths = catalog.str_values(&self.path_column)?;
            let mut no_data = 0usize;

            for (index, path) in paths.iter().enumerate() {
                let outcome = self.measure_path(path, store)?;
                if outcome.is_no_data() {
                    no_data += 1;
                }
                log::debug!("Row {} ('{}'): {:?}", index, path, outcome);

                for (values, name) in columns.iter_mut().zip(self.definitions.names()) {
                    values.push(outcome.value(name));
                }
            }

            log::info!(
                "Measured {} catalog rows ({} without data)",
                rows,
                no_data
            );
        }

        let mut output = catalog.clone();
        for (name, values) in self.definitions.names().zip(columns) {
            if output.has_column(name) {
                log::warn!("Replacing existing catalog column '{}'", name);
            }
            output.push_column(name, Column::Int(values))?;
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LcSiftError;
    use crate::metrics::MetricDefinition;
    use crate::store::MemoryStore;

    fn light_curve() -> Table {
        Table::from_columns([
            ("time", Column::from(vec![100.0, 101.5, 102.5])),
            ("flux", Column::from(vec![50.0, 60.0, 2.0])),
            ("fluxerr", Column::from(vec![5.0, 5.0, 5.0])),
            ("band", Column::from(vec!["ztfg", "ztfr", "ztfg"])),
        ])
        .unwrap()
        .with_meta("z", 0.05)
        .with_meta("t0", 101.0)
    }

    fn definitions() -> MetricDefinitions {
        MetricDefinitions::new(vec![
            MetricDefinition::new("n_epochs", "night", "phase", "float", ">=", "-50"),
            MetricDefinition::new("n_bands", "band", "phase", "float", ">=", "-50"),
        ])
    }

    fn catalog(paths: Vec<&str>) -> Table {
        let n = paths.len();
        Table::from_columns([
            ("path", Column::from(paths)),
            ("z", Column::from(vec![0.05; n])),
        ])
        .unwrap()
        .with_meta("directory", "data")
        .with_meta("file_name", "lc")
    }

    #[test]
    fn test_run_appends_metric_columns() {
        let store = MemoryStore::new().with_table("lc_0", light_curve());
        let aggregator = CatalogAggregator::new(definitions()).with_snr_threshold(5.0);

        let output = aggregator
            .run(&catalog(vec!["lc_0", "bad_lc_1"]), &store)
            .unwrap();

        assert_eq!(
            output.column_names().collect::<Vec<_>>(),
            vec!["path", "z", "n_epochs", "n_bands"]
        );
        assert_eq!(output.column("n_epochs").unwrap(), &Column::Int(vec![2, -1]));
        assert_eq!(output.column("n_bands").unwrap(), &Column::Int(vec![2, -1]));
        assert_eq!(output.meta_str("directory").unwrap(), "data");
    }

    #[test]
    fn test_bad_rows_never_touch_the_store() {
        let aggregator = CatalogAggregator::new(definitions());
        let output = aggregator
            .run(&catalog(vec!["bad_0", "lc_bad"]), &MemoryStore::new())
            .unwrap();
        assert_eq!(output.column("n_epochs").unwrap(), &Column::Int(vec![-1, -1]));
    }

    #[test]
    fn test_missing_light_curve_aborts() {
        let aggregator = CatalogAggregator::new(definitions());
        let err = aggregator
            .run(&catalog(vec!["lc_0"]), &MemoryStore::new())
            .unwrap_err();
        assert!(matches!(err, LcSiftError::MissingData { ref path } if path == "lc_0"));
    }

    #[test]
    fn test_custom_marker() {
        let aggregator = CatalogAggregator::new(definitions()).with_bad_marker("skip");
        assert!(aggregator.is_bad("lc_skip_3"));
        assert!(!aggregator.is_bad("bad_3"));
        assert!(!CatalogAggregator::new(definitions()).with_bad_marker("").is_bad("x"));
    }
}
