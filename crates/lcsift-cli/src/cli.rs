//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lcsift: light-curve catalog quality metrics, selection and completeness
#[derive(Parser)]
#[command(name = "lcsift")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Pipeline configuration (JSON). Defaults apply when omitted.
    #[arg(short, long, global = true, value_name = "CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count per-object light-curve metrics over a catalog
    Metrics {
        /// Directory holding the catalog (meta.csv + meta.meta.json)
        #[arg(value_name = "META_DIR")]
        meta_dir: PathBuf,

        /// Output catalog CSV (default: <META_DIR>/meta_metrics.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compute chi2 and the selection flag of a catalog
    Flag {
        /// Catalog CSV
        #[arg(value_name = "CATALOG")]
        catalog: PathBuf,

        /// Output catalog CSV (default: <CATALOG stem>_sel.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize the configured quantity per redshift bin
    Bins {
        /// Flagged catalog CSV
        #[arg(value_name = "CATALOG")]
        catalog: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate the completeness redshift of a flagged catalog
    Completeness {
        /// Flagged catalog CSV
        #[arg(value_name = "CATALOG")]
        catalog: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Selection efficiency per redshift bin
    Efficiency {
        /// Flagged catalog CSV
        #[arg(value_name = "CATALOG")]
        catalog: PathBuf,

        /// Rule table CSV (name,op,thresh,type); default is sel == 1
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run metrics, selection, binning and completeness in one pass
    Run {
        /// Directory holding the catalog (meta.csv + meta.meta.json)
        #[arg(value_name = "META_DIR")]
        meta_dir: PathBuf,

        /// Output directory for the catalog and report (default: <META_DIR>/lcsift)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}
