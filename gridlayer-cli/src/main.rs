//! gridlayer CLI - Command-line interface
//!
//! Builds one MBTiles archive with an MGRS grid overlay per region file.

mod error;
mod runner;

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};
use tracing::info;

use error::CliError;
use runner::CliRunner;

/// Settings file used when `--settings` is not given.
const DEFAULT_SETTINGS_FILE: &str = "gridlayer.ini";

#[derive(Parser)]
#[command(name = "gridlayer")]
#[command(version = gridlayer::VERSION)]
#[command(about = "Generate MBTiles archives with an MGRS grid overlay", long_about = None)]
struct Args {
    /// Region configuration files (JSON)
    config_files: Vec<PathBuf>,

    /// Write example region configuration files to the current directory
    #[arg(long)]
    create_examples: bool,

    /// Number of concurrent tile workers (overrides the settings file)
    #[arg(long, value_name = "N")]
    max_workers: Option<usize>,

    /// Settings file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    if args.create_examples {
        if let Err(e) = create_examples(Path::new(".")) {
            e.exit();
        }
        return;
    }

    if args.config_files.is_empty() {
        let _ = Args::command().print_help();
        println!();
        CliError::NoConfigs.exit();
    }

    if let Err(e) = run(&args) {
        e.exit();
    }
}

fn create_examples(dir: &Path) -> Result<(), CliError> {
    let written = gridlayer::region::write_example_configs(dir)?;
    for path in &written {
        println!("Created example configuration: {}", path.display());
    }
    Ok(())
}

fn run(args: &Args) -> Result<(), CliError> {
    let runner = CliRunner::new(&args.settings, args.debug)?;

    let regions = runner::load_regions(&args.config_files);
    if regions.is_empty() {
        return Err(CliError::NoRegions {
            attempted: args.config_files.len(),
        });
    }

    let orchestrator = runner.create_orchestrator(args.max_workers)?;
    info!(
        workers = orchestrator.config().workers,
        timeout_secs = runner.settings().download.timeout,
        "Starting MBTiles generation"
    );

    let completed = runner::run_regions(&orchestrator, &regions);

    info!(
        "Completed! Successfully created {}/{} MBTiles files.",
        completed,
        regions.len()
    );
    Ok(())
}
