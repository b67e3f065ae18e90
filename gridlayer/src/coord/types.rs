//! Coordinate type definitions

use std::fmt;

use thiserror::Error;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Deepest zoom level accepted for archive generation
pub const MAX_ZOOM: u8 = 22;

/// Tile coordinates in the Web Mercator / Slippy Map (XYZ) system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Y coordinate (north-south), 0 at north
    pub row: u32,
    /// X coordinate (east-west), 0 at west
    pub col: u32,
    /// Zoom level (0-22)
    pub zoom: u8,
}

impl TileCoord {
    /// Creates a tile coordinate.
    pub fn new(zoom: u8, col: u32, row: u32) -> Self {
        Self { row, col, zoom }
    }

    /// Number of tiles along one axis at this zoom level.
    #[inline]
    pub fn tiles_per_axis(&self) -> u64 {
        1u64 << self.zoom
    }

    /// Row in the archive convention (row 0 at the south edge).
    ///
    /// MBTiles stores rows TMS-style, so the XYZ row is flipped:
    /// `(2^zoom - 1) - row`.
    #[inline]
    pub fn archive_row(&self) -> u32 {
        ((self.tiles_per_axis() - 1) - self.row as u64) as u32
    }

    /// Geographic bounds of this tile.
    #[inline]
    pub fn bounds(&self) -> TileBounds {
        super::tile_bounds(self)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.col, self.row)
    }
}

/// Geographic bounding box of a tile in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileBounds {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl TileBounds {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Longitude span in degrees.
    #[inline]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Latitude span in degrees.
    #[inline]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Geometric center as `(lat, lon)`.
    #[inline]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.north + self.south) / 2.0,
            (self.east + self.west) / 2.0,
        )
    }
}

/// Errors from converting a geographic position to a tile.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("latitude {0} is outside the Web Mercator range ({min} to {max})", min = MIN_LAT, max = MAX_LAT)]
    InvalidLatitude(f64),

    #[error("longitude {0} is outside {min} to {max}", min = MIN_LON, max = MAX_LON)]
    InvalidLongitude(f64),

    #[error("zoom level {0} is above the maximum of {max}", max = MAX_ZOOM)]
    InvalidZoom(u8),
}
