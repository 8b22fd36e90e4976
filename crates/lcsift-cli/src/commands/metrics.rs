//! Metrics command - count per-object light-curve metrics.

use std::path::PathBuf;

use colored::Colorize;
use lcsift::pipeline::resolve_light_curve_store;
use lcsift::{CsvDirectoryStore, LightCurveStore, Pipeline};

use super::{load_config, save_catalog};

pub fn run(
    meta_dir: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(load_config(config)?);
    if pipeline.config().metrics.is_empty() {
        return Err("No metrics configured. Add a \"metrics\" table to the configuration.".into());
    }

    let catalog = CsvDirectoryStore::new(&meta_dir).catalog()?;
    let store = resolve_light_curve_store(&meta_dir, &catalog)?;

    println!(
        "{} {} ({} rows)",
        "Measuring".cyan().bold(),
        meta_dir.display().to_string().white(),
        catalog.row_count()
    );
    if verbose {
        println!("  Light curves: {}", store.root().display());
        println!("  SNR threshold: {}", pipeline.config().snr_threshold);
    }

    let measured = pipeline.measure(&catalog, &store)?;

    let output = output.unwrap_or_else(|| meta_dir.join("meta_metrics.csv"));
    save_catalog(&measured, &output)?;

    let names: Vec<&str> = pipeline.config().metrics.names().collect();
    println!("  Metrics: {}", names.join(", ").green());
    println!(
        "{} {}",
        "Wrote".green().bold(),
        output.display().to_string().white()
    );
    Ok(())
}
