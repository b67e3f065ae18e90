//! Region orchestration
//!
//! Fans tile jobs out to a bounded worker pool, collects their outcomes on
//! the calling thread and writes them into the region's archive one zoom
//! level at a time.

mod progress;
mod runner;
mod types;

pub use progress::{ProgressSnapshot, ProgressTracker};
pub use runner::Orchestrator;
pub use types::{OrchestratorConfig, RegionSummary, TileOutcome, DEFAULT_PROGRESS_INTERVAL};
