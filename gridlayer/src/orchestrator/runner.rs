//! Region run implementation

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use tracing::{debug, error, info, warn};

use super::progress::ProgressTracker;
use super::types::{OrchestratorConfig, RegionSummary, TileOutcome};
use crate::archive::{ArchiveError, ArchiveMetadata, ArchiveWriter};
use crate::composite::TileCompositor;
use crate::coord::{count_tiles, tiles_in_bounds, TileCoord};
use crate::fetch::TileSource;
use crate::region::Region;

/// Jobs queued per worker before the orchestrator waits for completions.
const QUEUE_DEPTH_PER_WORKER: usize = 4;

/// Drives a region from tile enumeration to a finished archive.
///
/// Tiles are fetched and composited on a fixed-size worker pool. The
/// orchestrator thread is the only writer to the archive: it receives
/// outcomes in completion order, stores successful tiles and commits once
/// per zoom level after every tile of that level has reported back.
///
/// # Example
///
/// ```ignore
/// use gridlayer::composite::{LabelRenderer, TileCompositor};
/// use gridlayer::fetch::{ReqwestClient, TileFetcher, TileSource};
/// use gridlayer::orchestrator::{Orchestrator, OrchestratorConfig};
/// use std::sync::Arc;
///
/// let source: Arc<dyn TileSource> = Arc::new(TileFetcher::new(ReqwestClient::new()?));
/// let compositor = Arc::new(TileCompositor::new(LabelRenderer::resolve(None, 14.0)));
/// let orchestrator = Orchestrator::new(source, compositor, OrchestratorConfig::default())?;
/// let summary = orchestrator.run(&region)?;
/// ```
pub struct Orchestrator {
    source: Arc<dyn TileSource>,
    compositor: Arc<TileCompositor>,
    config: OrchestratorConfig,
    pool: ThreadPool,
}

impl Orchestrator {
    /// Creates an orchestrator with a worker pool of `config.workers` threads.
    pub fn new(
        source: Arc<dyn TileSource>,
        compositor: Arc<TileCompositor>,
        config: OrchestratorConfig,
    ) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.workers.max(1))
            .thread_name(|i| format!("gridlayer-worker-{}", i))
            .build()?;

        Ok(Self {
            source,
            compositor,
            config,
            pool,
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Renders every tile of `region` into its archive.
    ///
    /// Tiles that cannot be fetched or composited are counted as failed and
    /// left out of the archive. Archive errors abort the region.
    pub fn run(&self, region: &Region) -> Result<RegionSummary, ArchiveError> {
        let b = &region.bounds;
        let total: u64 = region
            .zoom_levels()
            .map(|zoom| count_tiles(b.west, b.south, b.east, b.north, zoom))
            .sum();

        info!(
            region = %region.name,
            output = %region.output_path.display(),
            "Creating MBTiles archive"
        );
        info!(url = %region.service_url, "Map URL");
        info!(
            west = b.west,
            south = b.south,
            east = b.east,
            north = b.north,
            "Bounds"
        );
        info!(
            zoom_min = region.zoom_min,
            zoom_max = region.zoom_max,
            total_tiles = total,
            workers = self.config.workers,
            "Zoom levels"
        );

        let metadata =
            ArchiveMetadata::new(&region.name, region.bounds, region.zoom_min, region.zoom_max);
        let archive = ArchiveWriter::create(&region.output_path, &metadata)?;

        let mut progress = ProgressTracker::new(total, self.config.progress_interval);

        for zoom in region.zoom_levels() {
            info!(zoom, "Processing zoom level");
            self.run_zoom_level(region, zoom, &archive, &mut progress)?;
            archive.commit()?;
        }

        archive.finish()?;

        let summary = RegionSummary {
            name: region.name.clone(),
            output_path: region.output_path.clone(),
            total,
            succeeded: progress.succeeded(),
            failed: progress.failed(),
            elapsed: progress.elapsed(),
        };

        info!(
            region = %summary.name,
            tiles = summary.processed(),
            stored = summary.succeeded,
            failed = summary.failed,
            minutes = %format!("{:.1}", summary.elapsed.as_secs_f64() / 60.0),
            "Completed region"
        );

        Ok(summary)
    }

    /// Processes one zoom level. Returns once every submitted job has
    /// reported back, or on the first archive error.
    fn run_zoom_level(
        &self,
        region: &Region,
        zoom: u8,
        archive: &ArchiveWriter,
        progress: &mut ProgressTracker,
    ) -> Result<(), ArchiveError> {
        let b = &region.bounds;
        let mut tiles = tiles_in_bounds(b.west, b.south, b.east, b.north, zoom);

        let (tx, rx) = mpsc::channel::<TileOutcome>();
        let cancel = Arc::new(AtomicBool::new(false));
        let service_url: Arc<str> = Arc::from(region.service_url.as_str());
        let window = self.config.workers.max(1) * QUEUE_DEPTH_PER_WORKER;
        let mut in_flight = 0usize;

        loop {
            while in_flight < window {
                let Some(coord) = tiles.next() else {
                    break;
                };
                self.submit(coord, &service_url, &cancel, tx.clone());
                in_flight += 1;
            }

            if in_flight == 0 {
                break;
            }

            // The orchestrator holds a sender, so recv only fails if the
            // channel is broken.
            let Ok(outcome) = rx.recv() else {
                break;
            };
            in_flight -= 1;

            let stored = match outcome {
                TileOutcome::Rendered(tile) => {
                    if let Err(e) = archive.put_tile(&tile.coord, &tile.data) {
                        cancel.store(true, Ordering::Relaxed);
                        error!(tile = %tile.coord, error = %e, "Archive write failed, cancelling region");
                        return Err(e);
                    }
                    true
                }
                TileOutcome::Unavailable(coord) | TileOutcome::Failed(coord) => {
                    debug!(tile = %coord, "Tile not stored");
                    false
                }
                TileOutcome::Cancelled(_) => continue,
            };

            if let Some(snapshot) = progress.record(stored) {
                info!(
                    "Progress: {}/{} tiles ({:.1}%) Rate: {:.1} tiles/sec ETA: {:.1} minutes",
                    snapshot.processed,
                    snapshot.total,
                    snapshot.percent(),
                    snapshot.tiles_per_sec,
                    snapshot.eta_minutes()
                );
            }
        }

        Ok(())
    }

    fn submit(
        &self,
        coord: TileCoord,
        service_url: &Arc<str>,
        cancel: &Arc<AtomicBool>,
        tx: mpsc::Sender<TileOutcome>,
    ) {
        let source = Arc::clone(&self.source);
        let compositor = Arc::clone(&self.compositor);
        let service_url = Arc::clone(service_url);
        let cancel = Arc::clone(cancel);

        self.pool.spawn(move || {
            let outcome = if cancel.load(Ordering::Relaxed) {
                TileOutcome::Cancelled(coord)
            } else {
                panic::catch_unwind(AssertUnwindSafe(|| {
                    process_tile(source.as_ref(), &compositor, &service_url, coord)
                }))
                .unwrap_or_else(|_| {
                    error!(tile = %coord, "Tile job panicked");
                    TileOutcome::Failed(coord)
                })
            };

            // The receiver is gone only if the region was aborted.
            let _ = tx.send(outcome);
        });
    }
}

/// Fetches and composites a single tile. Never fails: every problem is
/// logged and reported as an outcome.
fn process_tile(
    source: &dyn TileSource,
    compositor: &TileCompositor,
    service_url: &str,
    coord: TileCoord,
) -> TileOutcome {
    let Some(bytes) = source.fetch(service_url, &coord) else {
        return TileOutcome::Unavailable(coord);
    };

    match compositor.composite(&bytes, &coord) {
        Ok(tile) => TileOutcome::Rendered(tile),
        Err(e) => {
            warn!(tile = %coord, error = %e, "Failed to process tile");
            TileOutcome::Failed(coord)
        }
    }
}
