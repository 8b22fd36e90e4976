//! Bins command - per-redshift-bin statistics of a flagged catalog.

use std::path::PathBuf;

use colored::Colorize;
use lcsift::{BinStatistic, Pipeline};

use super::{fmt_value, load_catalog, load_config};

pub fn run(
    catalog_path: PathBuf,
    json_output: bool,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(load_config(config)?);
    let catalog = load_catalog(&catalog_path)?;
    let bins = pipeline.bins(&catalog)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&bins)?);
        return Ok(());
    }

    let binning = &pipeline.config().binning;
    println!(
        "{} {} per {} bin ({})",
        binning.quantity.cyan().bold(),
        "statistics".cyan().bold(),
        binning.redshift_column,
        binning.weighting
    );
    println!();
    print_bins(&bins);
    Ok(())
}

pub(crate) fn print_bins(bins: &[BinStatistic]) {
    println!(
        "{}",
        format!(
            "{:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>6}",
            "z_low", "z_high", "z", "z_std", "mean", "spread", "n"
        )
        .yellow()
        .bold()
    );
    for bin in bins {
        let line = format!(
            "{} {} {} {} {} {} {:>6}",
            fmt_value(bin.z_low),
            fmt_value(bin.z_high),
            fmt_value(bin.z_center),
            fmt_value(bin.z_spread),
            fmt_value(bin.value_mean),
            fmt_value(bin.value_spread),
            bin.count
        );
        if bin.is_empty() {
            println!("{}", line.dimmed());
        } else {
            println!("{}", line);
        }
    }
}
