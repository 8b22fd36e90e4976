//! End-to-end pipeline: metrics, selection, redshift bins, completeness.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::binning::{efficiency, BinSpec, BinStatistic, BinnedStatistics, EfficiencyBin, Weighting, REDSHIFT_COLUMN};
use crate::catalog::{CatalogAggregator, RatioColumn, SelectionFlagger, DEFAULT_BAD_MARKER, SELECTION_FLAG};
use crate::completeness::{Completeness, CompletenessEstimator};
use crate::error::{LcSiftError, Result};
use crate::fit::{fit_catalog, FitConfig, LightCurveFitter};
use crate::metrics::MetricDefinitions;
use crate::rules::{Rule, RuleSet};
use crate::store::{file_hash, open_light_curve_store, CsvDirectoryStore, LightCurveStore, CATALOG_PATH};
use crate::table::Table;

/// Redshift binning of the flagged catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningConfig {
    pub z_min: f64,
    pub z_max: f64,
    pub step: f64,
    /// Column summarized in each bin.
    pub quantity: String,
    pub redshift_column: String,
    pub weighting: Weighting,
    /// Rules applied in every bin on top of `sel == 1` and the bin bounds.
    pub extra_rules: RuleSet,
}

impl Default for BinningConfig {
    fn default() -> Self {
        Self {
            z_min: 0.01,
            z_max: 0.2,
            step: 0.01,
            quantity: "c_err".to_string(),
            redshift_column: REDSHIFT_COLUMN.to_string(),
            weighting: Weighting::Std,
            extra_rules: RuleSet::new(vec![
                Rule::new("c_err", "!=", "-1", "float"),
                Rule::new("chi2", "<=", "2", "float"),
            ]),
        }
    }
}

impl BinningConfig {
    pub fn bin_spec(&self) -> Result<BinSpec> {
        Ok(BinSpec::new(self.z_min, self.z_max, self.step)?)
    }

    pub fn statistics(&self) -> BinnedStatistics {
        BinnedStatistics::new(&self.quantity)
            .with_redshift_column(&self.redshift_column)
            .with_weighting(self.weighting)
            .with_extra_rules(self.extra_rules.clone())
    }
}

/// Target of the completeness estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletenessConfig {
    pub target: f64,
    pub warn_non_monotonic: bool,
}

impl Default for CompletenessConfig {
    fn default() -> Self {
        Self {
            target: 0.04,
            warn_non_monotonic: false,
        }
    }
}

impl CompletenessConfig {
    pub fn estimator(&self) -> CompletenessEstimator {
        CompletenessEstimator::new(self.target).with_warn_non_monotonic(self.warn_non_monotonic)
    }
}

/// Configuration of a full pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum SNR of a light-curve point.
    pub snr_threshold: f64,
    /// Path substring marking rows without a light curve.
    pub bad_marker: String,
    pub metrics: MetricDefinitions,
    /// Rules combined into the `sel` flag.
    pub selection: RuleSet,
    /// Ratio column computed before selection. Defaults to `chi2 =
    /// chisq / ndof`, which the default binning rules read.
    pub chi2: Option<RatioColumn>,
    pub binning: BinningConfig,
    pub completeness: CompletenessConfig,
    pub fit: FitConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            snr_threshold: 1.0,
            bad_marker: DEFAULT_BAD_MARKER.to_string(),
            metrics: MetricDefinitions::default(),
            selection: RuleSet::default(),
            chi2: Some(RatioColumn::default()),
            binning: BinningConfig::default(),
            completeness: CompletenessConfig::default(),
            fit: FitConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| LcSiftError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let file = File::create(path).map_err(|e| LcSiftError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a configuration from JSON. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LcSiftError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}

/// Where a run's catalog came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunProvenance {
    pub catalog_path: PathBuf,
    /// SHA-256 of the catalog file (`sha256:<hex>`).
    pub catalog_hash: String,
    pub rows: usize,
    pub generated_at: DateTime<Utc>,
}

impl RunProvenance {
    pub fn new(catalog_path: impl Into<PathBuf>, catalog_hash: String, rows: usize) -> Self {
        Self {
            catalog_path: catalog_path.into(),
            catalog_hash,
            rows,
            generated_at: Utc::now(),
        }
    }
}

/// Results of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// Catalog with metric columns, derived ratio and `sel` flag.
    pub catalog: Table,
    pub bins: Vec<BinStatistic>,
    pub completeness: Completeness,
}

impl PipelineOutput {
    /// Rows flagged `sel == 1`.
    pub fn selected(&self) -> usize {
        self.catalog
            .float_values(SELECTION_FLAG)
            .map(|flags| flags.iter().filter(|f| **f == 1.0).count())
            .unwrap_or(0)
    }
}

/// Summary of a run over a catalog on disk.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub provenance: RunProvenance,
    pub config: PipelineConfig,
    pub selected: usize,
    pub bins: Vec<BinStatistic>,
    pub completeness: Completeness,
}

/// Runs the configured components in order.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn aggregator(&self) -> CatalogAggregator {
        CatalogAggregator::new(self.config.metrics.clone())
            .with_snr_threshold(self.config.snr_threshold)
            .with_bad_marker(&self.config.bad_marker)
    }

    /// Append one column per configured metric.
    pub fn measure(&self, catalog: &Table, store: &impl LightCurveStore) -> Result<Table> {
        self.aggregator().run(catalog, store)
    }

    /// Add the ratio column, if configured, then set the `sel` flag.
    pub fn select<'t>(&self, catalog: &'t mut Table) -> Result<&'t mut Table> {
        if let Some(ratio) = &self.config.chi2 {
            ratio.apply(catalog)?;
        }
        SelectionFlagger::new(self.config.selection.clone()).flag(catalog)
    }

    /// Statistics of the configured quantity per redshift bin.
    pub fn bins(&self, catalog: &Table) -> Result<Vec<BinStatistic>> {
        let spec = self.config.binning.bin_spec()?;
        self.config.binning.statistics().aggregate(catalog, &spec)
    }

    pub fn completeness(&self, bins: &[BinStatistic]) -> Completeness {
        self.config.completeness.estimator().estimate(bins)
    }

    /// Selection efficiency of `rules` over the configured bins.
    pub fn efficiency(&self, catalog: &Table, rules: &RuleSet) -> Result<Vec<EfficiencyBin>> {
        let spec = self.config.binning.bin_spec()?;
        efficiency(catalog, &spec, &self.config.binning.redshift_column, rules)
    }

    /// Fit the selected rows of a flagged catalog.
    pub fn fit(
        &self,
        catalog: &Table,
        store: &impl LightCurveStore,
        fitter: &impl LightCurveFitter,
    ) -> Result<Table> {
        fit_catalog(catalog, store, fitter, &self.config.fit)
    }

    /// Measure, select, bin and estimate completeness.
    pub fn run(&self, catalog: &Table, store: &impl LightCurveStore) -> Result<PipelineOutput> {
        // Check bins before the expensive per-row pass.
        self.config.binning.bin_spec()?;

        let mut catalog = self.measure(catalog, store)?;
        self.select(&mut catalog)?;
        let bins = self.bins(&catalog)?;
        let completeness = self.completeness(&bins);

        Ok(PipelineOutput {
            catalog,
            bins,
            completeness,
        })
    }

    /// Run over the catalog stored in `meta_dir`.
    ///
    /// The catalog is `meta_dir/meta.csv`; its `directory` and `file_name`
    /// metadata locate the light curves, relative to `meta_dir` unless
    /// absolute.
    pub fn run_path(&self, meta_dir: impl AsRef<Path>) -> Result<(PipelineOutput, PipelineReport)> {
        let meta_dir = meta_dir.as_ref();
        let meta_store = CsvDirectoryStore::new(meta_dir);
        let catalog = meta_store.catalog()?;
        let catalog_path = meta_store.table_file(CATALOG_PATH);
        let hash = file_hash(&catalog_path)?;

        let store = resolve_light_curve_store(meta_dir, &catalog)?;
        log::info!(
            "Running over {} catalog rows, light curves in {}",
            catalog.row_count(),
            store.root().display()
        );

        let output = self.run(&catalog, &store)?;
        let report = PipelineReport {
            provenance: RunProvenance::new(catalog_path, hash, catalog.row_count()),
            config: self.config.clone(),
            selected: output.selected(),
            bins: output.bins.clone(),
            completeness: output.completeness,
        };
        Ok((output, report))
    }
}

/// Light-curve store named by a catalog, with relative roots resolved
/// against `meta_dir`.
pub fn resolve_light_curve_store(meta_dir: &Path, catalog: &Table) -> Result<CsvDirectoryStore> {
    let store = open_light_curve_store(catalog)?;
    if store.root().is_relative() {
        Ok(CsvDirectoryStore::new(meta_dir.join(store.root())))
    } else {
        Ok(store)
    }
}
