//! Completeness command - redshift where the binned statistic hits its target.

use std::path::PathBuf;

use colored::Colorize;
use lcsift::{Completeness, Pipeline};

use super::{load_catalog, load_config};

pub fn run(
    catalog_path: PathBuf,
    json_output: bool,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(load_config(config)?);
    let catalog = load_catalog(&catalog_path)?;
    let bins = pipeline.bins(&catalog)?;
    let completeness = pipeline.completeness(&bins);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&completeness)?);
    } else {
        print_completeness(&completeness, pipeline.config().completeness.target);
    }
    Ok(())
}

pub(crate) fn print_completeness(completeness: &Completeness, target: f64) {
    match completeness {
        Completeness::Estimated(result) => {
            println!(
                "{} {} (target {})",
                "Completeness redshift:".cyan().bold(),
                format!("{:.4}", result.z_completeness).green().bold(),
                target
            );
            println!("  upper: {:.4}", result.z_completeness_upper);
            println!("  lower: {:.4}", result.z_completeness_lower);
        }
        Completeness::Undefined { valid_bins } => {
            println!(
                "{} only {} usable bin(s); at least 2 are needed",
                "Completeness undefined:".red().bold(),
                valid_bins
            );
        }
    }
}
