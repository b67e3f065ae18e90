//! Raster compositing.
//!
//! Decodes a fetched base tile, draws the MGRS grid lines and zone labels
//! computed by [`crate::overlay`], and re-encodes the result as PNG.

mod bitmap;
mod compositor;
mod error;
mod label;

pub use compositor::{CompositedTile, TileCompositor};
pub use error::CompositeError;
pub use label::{LabelRenderer, DEFAULT_FONT_SIZE};
