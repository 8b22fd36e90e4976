//! Run command - the whole pipeline over a catalog directory.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use colored::Colorize;
use lcsift::Pipeline;

use super::bins::print_bins;
use super::completeness::print_completeness;
use super::{load_config, save_catalog};

pub fn run(
    meta_dir: PathBuf,
    output: Option<PathBuf>,
    json_output: bool,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(load_config(config)?);
    let (result, report) = pipeline.run_path(&meta_dir)?;

    let output = output.unwrap_or_else(|| meta_dir.join("lcsift"));
    std::fs::create_dir_all(&output)?;
    save_catalog(&result.catalog, &output.join("catalog.csv"))?;

    let report_path = output.join("report.json");
    let file = File::create(&report_path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &report)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Catalog:".cyan().bold(),
        report.provenance.catalog_path.display().to_string().white()
    );
    println!("  Hash:     {}", report.provenance.catalog_hash);
    println!(
        "  Selected: {} of {}",
        report.selected.to_string().green().bold(),
        report.provenance.rows
    );
    println!();
    print_bins(&report.bins);
    println!();
    print_completeness(&report.completeness, pipeline.config().completeness.target);
    println!();
    println!(
        "{} {}",
        "Wrote".green().bold(),
        output.display().to_string().white()
    );
    Ok(())
}
