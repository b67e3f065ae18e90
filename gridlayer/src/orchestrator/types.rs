//! Orchestrator types

use std::path::PathBuf;
use std::time::Duration;

use crate::composite::CompositedTile;
use crate::coord::TileCoord;
use crate::settings::DEFAULT_WORKERS;

/// Default number of attempted tiles between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

/// Tunables for a region run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Worker threads fetching and compositing tiles
    pub workers: usize,
    /// Attempted tiles between progress log lines
    pub progress_interval: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl OrchestratorConfig {
    /// Sets the worker count (at least one).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }
}

/// Result of one tile job, sent from a worker to the orchestrator thread.
#[derive(Debug)]
pub enum TileOutcome {
    /// Fetched and composited; ready to store
    Rendered(CompositedTile),
    /// The tile service had nothing usable for this address
    Unavailable(TileCoord),
    /// Fetched but could not be composited
    Failed(TileCoord),
    /// Skipped because the run was cancelled
    Cancelled(TileCoord),
}

/// Totals for a completed region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    pub name: String,
    pub output_path: PathBuf,
    /// Tiles covering the region across all zoom levels
    pub total: u64,
    /// Tiles stored in the archive
    pub succeeded: u64,
    /// Tiles that could not be fetched or composited
    pub failed: u64,
    pub elapsed: Duration,
}

impl RegionSummary {
    /// Tiles attempted.
    pub fn processed(&self) -> u64 {
        self.succeeded + self.failed
    }
}
