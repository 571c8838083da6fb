mod cli_args;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use log;
use std::process;

use cli_args::Cli;
use output::{ConsoleLogger, print_summary};
use packcode_core::{Config, RunLogger, export_project};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.verbose);
    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args) {
        Ok(()) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            1
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(verbose: u8) {
    let log_level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn load_config(cli: &Cli) -> Result<(std::path::PathBuf, Config)> {
    let project_root = Config::determine_project_root(cli.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::debug!("Project root: {}", project_root.display());

    let config_path =
        Config::resolve_config_path(&project_root, cli.config.as_ref(), cli.no_config)
            .context("Failed to resolve config file path")?;

    let mut config = match config_path {
        Some(path) => Config::load_from_path(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            log::debug!("Using default configuration.");
            Config::default()
        }
    };
    apply_cli_overrides(&mut config, cli);
    log::debug!("Effective config: {:?}", config);
    Ok((project_root, config))
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) {
    if let Some(output) = &cli.output {
        config.output.filename = output.clone();
    }
    if cli.silent {
        config.general.silent = true;
    }
    if cli.include_hidden {
        config.filters.include_hidden = true;
    }
    if let Some(ignore_file) = &cli.ignore_file {
        config.filters.ignore_file = ignore_file.clone();
    }
    if cli.ignore_case {
        config.filters.case_insensitive = Some(true);
    }
}

fn run_app(cli: Cli) -> Result<()> {
    let (project_root, config) = load_config(&cli)?;
    let logger = ConsoleLogger::new(config.general.silent);

    let report = export_project(&project_root, &config, &logger).with_context(|| {
        format!(
            "Failed to create {}",
            config.output_path(&project_root).display()
        )
    })?;

    print_summary(&report, &logger as &dyn RunLogger);
    Ok(())
}
