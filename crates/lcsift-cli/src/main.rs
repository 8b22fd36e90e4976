//! lcsift CLI - light-curve catalog selection and completeness.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = cli.config;
    let result = match cli.command {
        Commands::Metrics { meta_dir, output } => {
            commands::metrics::run(meta_dir, output, config, cli.verbose)
        }

        Commands::Flag { catalog, output } => {
            commands::flag::run(catalog, output, config, cli.verbose)
        }

        Commands::Bins { catalog, json } => commands::bins::run(catalog, json, config),

        Commands::Completeness { catalog, json } => {
            commands::completeness::run(catalog, json, config)
        }

        Commands::Efficiency {
            catalog,
            rules,
            json,
        } => commands::efficiency::run(catalog, rules, json, config),

        Commands::Run {
            meta_dir,
            output,
            json,
        } => commands::run::run(meta_dir, output, json, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
