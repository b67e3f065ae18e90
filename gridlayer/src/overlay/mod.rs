//! MGRS grid overlay computation.
//!
//! Pure geometry for the overlay drawn onto each tile: which grid lines
//! cross the tile at its zoom level, which zone identifiers it contains and
//! where to anchor their labels, and how geographic positions map onto the
//! tile's pixels. Nothing here touches image data.

mod grid;
mod labels;

pub use grid::{compute_grid_lines, GridLine, GridPrecision, Orientation};
pub use labels::{GridOverlay, ZoneLabel};

use crate::coord::TileBounds;

/// Projects a geographic position onto a tile canvas.
///
/// `x = round((lon - west) / (east - west) * width)`,
/// `y = round((north - lat) / (north - south) * height)`.
/// Y is inverted because image rows grow downward while latitude grows
/// upward. Results may fall outside the canvas.
pub fn project_to_pixel(
    lat: f64,
    lon: f64,
    bounds: &TileBounds,
    width: u32,
    height: u32,
) -> (i32, i32) {
    let x_ratio = (lon - bounds.west) / bounds.width();
    let y_ratio = (bounds.north - lat) / bounds.height();

    (
        (x_ratio * width as f64).round() as i32,
        (y_ratio * height as f64).round() as i32,
    )
}
