//! Error types for tile compositing

use crate::coord::TileCoord;
use thiserror::Error;

/// Errors raised while compositing a single tile.
///
/// These never cross the worker boundary: the orchestrator counts the tile
/// as failed and moves on.
#[derive(Debug, Error)]
pub enum CompositeError {
    /// Base raster could not be decoded
    #[error("failed to decode tile {tile}: {source}")]
    Decode {
        tile: TileCoord,
        #[source]
        source: image::ImageError,
    },

    /// Composited raster could not be encoded as PNG
    #[error("failed to encode tile {tile}: {source}")]
    Encode {
        tile: TileCoord,
        #[source]
        source: image::ImageError,
    },

    /// Tile address lies outside the tile grid
    #[error("tile {0} is outside the tile grid")]
    Bounds(TileCoord),
}
