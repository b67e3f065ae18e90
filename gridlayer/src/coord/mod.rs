//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator slippy-map tiles, plus enumeration of the tiles that
//! cover a bounding box.

mod types;


pub use types::{
    CoordError, TileBounds, TileCoord, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON,
};

use std::f64::consts::PI;

/// Inward nudge applied to the east and south edges when enumerating tiles,
/// so a box ending exactly on a tile edge does not include the next tile.
const EDGE_EPSILON: f64 = 1e-11;

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 22)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let (col, row) = tile_index(lat, lon, zoom);
    Ok(TileCoord { row, col, zoom })
}

/// Computes the geographic bounds of a tile.
///
/// North and west come from the tile's own corner, south and east from the
/// corner of the diagonal neighbour.
pub fn tile_bounds(tile: &TileCoord) -> TileBounds {
    let (north, west) = corner_lat_lon(tile.col as f64, tile.row as f64, tile.zoom);
    let (south, east) = corner_lat_lon(tile.col as f64 + 1.0, tile.row as f64 + 1.0, tile.zoom);
    TileBounds {
        west,
        south,
        east,
        north,
    }
}

/// Enumerates every tile at `zoom` whose bounds intersect the given box.
///
/// Latitudes are clamped to the Web Mercator limit and longitudes to ±180.
/// Tiles are yielded column by column, north to south within a column.
pub fn tiles_in_bounds(
    west: f64,
    south: f64,
    east: f64,
    north: f64,
    zoom: u8,
) -> impl Iterator<Item = TileCoord> {
    let (min_col, max_col, min_row, max_row) = tile_ranges(west, south, east, north, zoom);
    (min_col..=max_col)
        .flat_map(move |col| (min_row..=max_row).map(move |row| TileCoord { row, col, zoom }))
}

/// Counts the tiles [`tiles_in_bounds`] would yield, without enumerating them.
pub fn count_tiles(west: f64, south: f64, east: f64, north: f64, zoom: u8) -> u64 {
    let (min_col, max_col, min_row, max_row) = tile_ranges(west, south, east, north, zoom);
    (max_col - min_col + 1) as u64 * (max_row - min_row + 1) as u64
}

fn tile_ranges(west: f64, south: f64, east: f64, north: f64, zoom: u8) -> (u32, u32, u32, u32) {
    let west = west.clamp(MIN_LON, MAX_LON);
    let east = east.clamp(MIN_LON, MAX_LON);
    let north = north.clamp(MIN_LAT, MAX_LAT);
    let south = south.clamp(MIN_LAT, MAX_LAT);

    let (min_col, min_row) = tile_index(north, west, zoom);
    let (max_col, max_row) = tile_index(south + EDGE_EPSILON, east - EDGE_EPSILON, zoom);

    (
        min_col,
        max_col.max(min_col),
        min_row,
        max_row.max(min_row),
    )
}

/// Column and row containing a point, clamped to the valid tile range.
fn tile_index(lat: f64, lon: f64, zoom: u8) -> (u32, u32) {
    let n = 2.0_f64.powi(zoom as i32);
    let last = n - 1.0;

    let x = ((lon + 180.0) / 360.0 * n).floor().clamp(0.0, last);

    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n)
        .floor()
        .clamp(0.0, last);

    (x as u32, y as u32)
}

/// Latitude/longitude of the northwest corner of fractional tile position `(x, y)`.
fn corner_lat_lon(x: f64, y: f64, zoom: u8) -> (f64, f64) {
    let n = 2.0_f64.powi(zoom as i32);

    let lon = x / n * 360.0 - 180.0;

    let lat_rad = (PI * (1.0 - 2.0 * y / n)).sinh().atan();
    let lat = lat_rad.to_degrees();

    (lat, lon)
}
