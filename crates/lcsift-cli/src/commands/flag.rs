//! Flag command - derive chi2 and set the selection flag.

use std::path::PathBuf;

use colored::Colorize;
use lcsift::Pipeline;

use super::{load_catalog, load_config, save_catalog};

pub fn run(
    catalog_path: PathBuf,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(load_config(config)?);
    let mut catalog = load_catalog(&catalog_path)?;

    if verbose {
        for rule in pipeline.config().selection.rules.iter() {
            println!("  Rule: {} {} {} ({})", rule.column, rule.op, rule.threshold, rule.value_type);
        }
    }

    pipeline.select(&mut catalog)?;
    let selected = catalog
        .float_values("sel")?
        .iter()
        .filter(|f| **f == 1.0)
        .count();

    let output = output.unwrap_or_else(|| {
        let stem = catalog_path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        catalog_path.with_file_name(format!("{}_sel.csv", stem))
    });
    save_catalog(&catalog, &output)?;

    println!(
        "{} {} of {} rows",
        "Selected".green().bold(),
        selected.to_string().white().bold(),
        catalog.row_count()
    );
    println!(
        "{} {}",
        "Wrote".green().bold(),
        output.display().to_string().white()
    );
    Ok(())
}
