//! Efficiency command - selected fraction per redshift bin.

use std::path::PathBuf;

use colored::Colorize;
use lcsift::{Pipeline, Rule, RuleSet};

use super::{fmt_value, load_catalog, load_config};

pub fn run(
    catalog_path: PathBuf,
    rules: Option<PathBuf>,
    json_output: bool,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(load_config(config)?);
    let catalog = load_catalog(&catalog_path)?;
    let rules = match rules {
        Some(path) => RuleSet::from_csv_path(&path)?,
        None => RuleSet::new(vec![Rule::new("sel", "==", "1", "int")]),
    };

    let bins = pipeline.efficiency(&catalog, &rules)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&bins)?);
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "{:>9} {:>9} {:>8} {:>8} {:>9}",
            "z_low", "z_high", "total", "selected", "eff"
        )
        .yellow()
        .bold()
    );
    for bin in &bins {
        println!(
            "{} {} {:>8} {:>8} {}",
            fmt_value(bin.z_low),
            fmt_value(bin.z_high),
            bin.total,
            bin.selected,
            fmt_value(bin.efficiency)
        );
    }
    Ok(())
}
