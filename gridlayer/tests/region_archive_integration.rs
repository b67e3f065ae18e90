//! Integration tests for region runs end to end.
//!
//! A region file is loaded from disk, rendered through the orchestrator with
//! an in-memory tile source and the resulting archive is inspected directly
//! with SQLite.

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use gridlayer::composite::{LabelRenderer, TileCompositor};
use gridlayer::coord::{count_tiles, tiles_in_bounds, TileCoord};
use gridlayer::fetch::TileSource;
use gridlayer::orchestrator::{Orchestrator, OrchestratorConfig};
use gridlayer::region::Region;
use gridlayer::settings::Settings;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rusqlite::{params, Connection};
use tempfile::TempDir;

const SERVICE_URL: &str = "https://maps.example.com/arcgis/rest/services/Topo/MapServer";

/// Serves a flat grey PNG, except for one tile the service "lost".
struct StaticSource {
    png: Vec<u8>,
    lost: Option<TileCoord>,
    requests: AtomicUsize,
}

impl StaticSource {
    fn new(lost: Option<TileCoord>) -> Self {
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(256, 256, Rgb([200, 200, 200])))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        Self {
            png,
            lost,
            requests: AtomicUsize::new(0),
        }
    }
}

impl TileSource for StaticSource {
    fn fetch(&self, service_url: &str, coord: &TileCoord) -> Option<Vec<u8>> {
        assert_eq!(service_url, SERVICE_URL);
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.lost.as_ref() == Some(coord) {
            None
        } else {
            Some(self.png.clone())
        }
    }
}

fn write_region(dir: &Path, output: &Path) -> std::path::PathBuf {
    let json = serde_json::json!({
        "MAP_URL": format!("{}/", SERVICE_URL),
        "name": "Attica",
        "lat_min": 37.8,
        "long_min": 23.5,
        "lat_max": 38.2,
        "long_max": 24.0,
        "zoom_min": 8,
        "zoom_max": 10,
        "output_file": output.to_string_lossy(),
    });
    let path = dir.join("attica.json");
    std::fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();
    path
}

fn orchestrator(source: Arc<StaticSource>) -> Orchestrator {
    let compositor = Arc::new(TileCompositor::new(LabelRenderer::bitmap(14.0)));
    let config = OrchestratorConfig::default().with_workers(3);
    Orchestrator::new(source, compositor, config).unwrap()
}

fn expected_total(region: &Region) -> u64 {
    let b = &region.bounds;
    region
        .zoom_levels()
        .map(|z| count_tiles(b.west, b.south, b.east, b.north, z))
        .sum()
}

#[test]
fn test_region_file_to_archive() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("out").join("attica.mbtiles");
    let region = Region::load(&write_region(temp.path(), &output)).unwrap();
    assert_eq!(region.service_url, SERVICE_URL);

    let source = Arc::new(StaticSource::new(None));
    let summary = orchestrator(Arc::clone(&source)).run(&region).unwrap();

    let total = expected_total(&region);
    assert_eq!(summary.total, total);
    assert_eq!(summary.succeeded, total);
    assert_eq!(summary.failed, 0);
    assert_eq!(source.requests.load(Ordering::SeqCst) as u64, total);

    let conn = Connection::open(&output).unwrap();
    let stored: i64 = conn
        .query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored as u64, total);

    let format: String = conn
        .query_row("SELECT value FROM metadata WHERE name = 'format'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(format, "png");
    let bounds: String = conn
        .query_row("SELECT value FROM metadata WHERE name = 'bounds'", [], |r| r.get(0))
        .unwrap();
    assert_eq!(bounds, "23.5,37.8,24,38.2");
}

#[test]
fn test_rows_are_stored_flipped() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("attica.mbtiles");
    let region = Region::load(&write_region(temp.path(), &output)).unwrap();

    orchestrator(Arc::new(StaticSource::new(None)))
        .run(&region)
        .unwrap();

    let conn = Connection::open(&output).unwrap();
    let b = &region.bounds;
    for coord in tiles_in_bounds(b.west, b.south, b.east, b.north, 9) {
        let flipped = (1u32 << 9) - 1 - coord.row;
        let found: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM tiles
                 WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
                params![coord.zoom, coord.col, flipped],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(found, 1, "missing flipped row for {:?}", coord);
    }
}

#[test]
fn test_lost_tile_leaves_gap_only() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("attica.mbtiles");
    let region = Region::load(&write_region(temp.path(), &output)).unwrap();

    let b = region.bounds;
    let lost = tiles_in_bounds(b.west, b.south, b.east, b.north, 10)
        .next()
        .unwrap();
    let summary = orchestrator(Arc::new(StaticSource::new(Some(lost))))
        .run(&region)
        .unwrap();

    let total = expected_total(&region);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded, total - 1);

    let conn = Connection::open(&output).unwrap();
    let stored: i64 = conn
        .query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored as u64, total - 1);

    let gap: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM tiles
             WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
            params![lost.zoom, lost.col, lost.archive_row()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(gap, 0);
}

#[test]
fn test_rerun_keeps_metadata_single_valued() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("attica.mbtiles");
    let region = Region::load(&write_region(temp.path(), &output)).unwrap();

    for _ in 0..2 {
        orchestrator(Arc::new(StaticSource::new(None)))
            .run(&region)
            .unwrap();
    }

    let conn = Connection::open(&output).unwrap();
    let duplicated: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM (
                 SELECT name FROM metadata GROUP BY name HAVING COUNT(*) > 1
             )",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(duplicated, 0);

    let mut stmt = conn
        .prepare("SELECT zoom_level, COUNT(*) FROM tiles GROUP BY zoom_level ORDER BY zoom_level")
        .unwrap();
    let per_zoom: Vec<(u8, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let b = &region.bounds;
    let expected: Vec<(u8, i64)> = region
        .zoom_levels()
        .map(|z| (z, count_tiles(b.west, b.south, b.east, b.north, z) as i64))
        .collect();
    assert_eq!(per_zoom, expected);
}

#[test]
fn test_settings_file_feeds_orchestrator_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("gridlayer.ini");
    std::fs::write(&path, "[download]\nworkers = 6\n\n[render]\nfont_size = 21\n").unwrap();

    let settings = Settings::load_from(&path).unwrap();
    let config = OrchestratorConfig::default().with_workers(settings.download.workers);
    assert_eq!(config.workers, 6);

    let labels = LabelRenderer::bitmap(settings.render.font_size);
    assert!(labels.is_bitmap());
}
