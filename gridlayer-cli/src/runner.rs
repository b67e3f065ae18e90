//! CLI runner for common setup and operations.
//!
//! Encapsulates settings loading, logging initialization and orchestrator
//! construction so `main` only decides what to run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use gridlayer::composite::{LabelRenderer, TileCompositor};
use gridlayer::fetch::{ReqwestClient, TileFetcher};
use gridlayer::logging::{init_logging, LoggingGuard};
use gridlayer::orchestrator::{Orchestrator, OrchestratorConfig};
use gridlayer::region::Region;
use gridlayer::settings::{Settings, MAX_WORKERS};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    settings: Settings,
}

impl CliRunner {
    /// Loads settings from `settings_path` and initializes logging.
    pub fn new(settings_path: &Path, debug_mode: bool) -> Result<Self, CliError> {
        let settings = Settings::load_from(settings_path)?;

        let logging_guard = init_logging(
            &settings.logging.directory,
            &settings.logging.file,
            debug_mode,
        )
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        info!("gridlayer v{}", gridlayer::VERSION);
        info!(log = %logging_guard.log_path().display(), "Logging initialized");

        Ok(Self {
            logging_guard,
            settings,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Builds the orchestrator from settings, with `--max-workers` taking
    /// precedence over the settings file.
    pub fn create_orchestrator(&self, max_workers: Option<usize>) -> Result<Orchestrator, CliError> {
        let download = &self.settings.download;
        let client = ReqwestClient::with_config(download.timeout, &download.user_agent)?;
        let source = Arc::new(TileFetcher::new(client));

        let render = &self.settings.render;
        let labels = LabelRenderer::resolve(render.font.as_deref(), render.font_size);
        match labels.source() {
            Some(path) => info!(font = %path.display(), "Using font for zone labels"),
            None => warn!("No usable font found, zone labels use the built-in bitmap font"),
        }
        let compositor = Arc::new(TileCompositor::new(labels));

        let workers = effective_workers(max_workers, download.workers);
        let config = OrchestratorConfig::default().with_workers(workers);

        Orchestrator::new(source, compositor, config)
            .map_err(|e| CliError::WorkerPool(e.to_string()))
    }
}

/// Worker count after applying the command-line override and limits.
pub fn effective_workers(cli: Option<usize>, configured: usize) -> usize {
    cli.unwrap_or(configured).clamp(1, MAX_WORKERS)
}

/// Loads every region file, logging and skipping the ones that fail.
pub fn load_regions(paths: &[PathBuf]) -> Vec<Region> {
    paths
        .iter()
        .filter_map(|path| match Region::load(path) {
            Ok(region) => {
                info!(config = %path.display(), region = %region.name, "Loaded configuration");
                Some(region)
            }
            Err(e) => {
                error!(config = %path.display(), error = %e, "Failed to load configuration");
                None
            }
        })
        .collect()
}

/// Runs each region in turn and returns how many archives were completed.
///
/// A region whose archive fails is logged and the remaining regions still run.
pub fn run_regions(orchestrator: &Orchestrator, regions: &[Region]) -> usize {
    let mut completed = 0;

    for (i, region) in regions.iter().enumerate() {
        info!(
            "Processing configuration {}/{}: {}",
            i + 1,
            regions.len(),
            region.name
        );

        match orchestrator.run(region) {
            Ok(summary) => {
                info!(
                    region = %summary.name,
                    output = %summary.output_path.display(),
                    succeeded = summary.succeeded,
                    failed = summary.failed,
                    total = summary.total,
                    elapsed_secs = summary.elapsed.as_secs_f64(),
                    "Region complete"
                );
                completed += 1;
            }
            Err(e) => {
                error!(region = %region.name, error = %e, "Failed to create MBTiles archive");
            }
        }
    }

    completed
}
