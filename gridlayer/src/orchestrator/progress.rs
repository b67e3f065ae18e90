//! Region progress tracking.
//!
//! Counts attempted tiles across all zoom levels of a region and produces a
//! snapshot every `interval` tiles for periodic logging.

use std::time::{Duration, Instant};

/// Progress information at a point in the run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    /// Tiles attempted so far (stored or failed)
    pub processed: u64,
    pub total: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Tiles attempted per second since the region started
    pub tiles_per_sec: f64,
    /// Estimated time to finish the remaining tiles at the current rate
    pub eta: Duration,
}

impl ProgressSnapshot {
    /// Percentage of tiles attempted.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.processed as f64 / self.total as f64 * 100.0
        }
    }

    /// ETA in minutes.
    pub fn eta_minutes(&self) -> f64 {
        self.eta.as_secs_f64() / 60.0
    }
}

/// Accumulates tile outcomes for a region.
///
/// Owned by the orchestrator thread; workers never touch it.
#[derive(Debug)]
pub struct ProgressTracker {
    total: u64,
    succeeded: u64,
    failed: u64,
    interval: u64,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(total: u64, interval: u64) -> Self {
        Self {
            total,
            succeeded: 0,
            failed: 0,
            interval: interval.max(1),
            started: Instant::now(),
        }
    }

    /// Records one attempted tile. Returns a snapshot when the attempt count
    /// reaches a multiple of the reporting interval.
    pub fn record(&mut self, success: bool) -> Option<ProgressSnapshot> {
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }

        if self.processed() % self.interval == 0 {
            Some(self.snapshot_at(self.started.elapsed()))
        } else {
            None
        }
    }

    pub fn processed(&self) -> u64 {
        self.succeeded + self.failed
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Snapshot as if `elapsed` time had passed since the start.
    pub fn snapshot_at(&self, elapsed: Duration) -> ProgressSnapshot {
        let processed = self.processed();
        let secs = elapsed.as_secs_f64();
        let tiles_per_sec = if secs > 0.0 {
            processed as f64 / secs
        } else {
            0.0
        };

        let remaining = self.total.saturating_sub(processed);
        let eta = if tiles_per_sec > 0.0 {
            Duration::from_secs_f64(remaining as f64 / tiles_per_sec)
        } else {
            Duration::ZERO
        };

        ProgressSnapshot {
            processed,
            total: self.total,
            succeeded: self.succeeded,
            failed: self.failed,
            tiles_per_sec,
            eta,
        }
    }
}
