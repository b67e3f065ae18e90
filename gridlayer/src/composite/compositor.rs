//! Overlay compositing onto decoded tiles.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use tracing::trace;

use super::error::CompositeError;
use super::label::LabelRenderer;
use crate::coord::{tile_bounds, TileBounds, TileCoord, MAX_ZOOM};
use crate::overlay::{compute_grid_lines, project_to_pixel, GridOverlay, Orientation, ZoneLabel};

const GRID_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const LABEL_TEXT_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const LABEL_BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Labels whose anchor is closer than this to any edge are dropped.
const LABEL_MARGIN: i32 = 10;
const LABEL_PADDING_X: i32 = 2;
const LABEL_PADDING_Y: i32 = 1;

/// A tile with the overlay drawn, encoded as PNG.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositedTile {
    pub coord: TileCoord,
    pub data: Vec<u8>,
}

/// Draws the MGRS grid and zone labels onto base-map tiles.
///
/// Stateless per call and shared read-only across workers.
pub struct TileCompositor {
    overlay: GridOverlay,
    labels: LabelRenderer,
}

impl TileCompositor {
    pub fn new(labels: LabelRenderer) -> Self {
        Self::with_overlay(GridOverlay::default(), labels)
    }

    pub fn with_overlay(overlay: GridOverlay, labels: LabelRenderer) -> Self {
        Self { overlay, labels }
    }

    /// Decodes `bytes`, draws the overlay for `coord` and re-encodes as PNG.
    ///
    /// The canvas keeps the source dimensions. Sources without an alpha
    /// channel are written as RGB.
    pub fn composite(&self, bytes: &[u8], coord: &TileCoord) -> Result<CompositedTile, CompositeError> {
        if coord.zoom > MAX_ZOOM
            || coord.col as u64 >= coord.tiles_per_axis()
            || coord.row as u64 >= coord.tiles_per_axis()
        {
            return Err(CompositeError::Bounds(*coord));
        }

        let decoded = image::load_from_memory(bytes).map_err(|source| CompositeError::Decode {
            tile: *coord,
            source,
        })?;
        let has_alpha = decoded.color().has_alpha();
        let mut canvas = decoded.to_rgba8();

        let bounds = tile_bounds(coord);
        self.draw_grid(&mut canvas, &bounds, coord.zoom);
        for label in self.overlay.compute_zone_labels(&bounds) {
            self.draw_label(&mut canvas, &bounds, &label);
        }

        let output = DynamicImage::ImageRgba8(canvas);
        let output = if has_alpha {
            output
        } else {
            DynamicImage::ImageRgb8(output.to_rgb8())
        };

        let mut data = Vec::new();
        output
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .map_err(|source| CompositeError::Encode {
                tile: *coord,
                source,
            })?;

        Ok(CompositedTile {
            coord: *coord,
            data,
        })
    }

    /// Draws full-length grid lines; lines projecting off the canvas are skipped.
    fn draw_grid(&self, canvas: &mut RgbaImage, bounds: &TileBounds, zoom: u8) {
        let (width, height) = canvas.dimensions();

        for line in compute_grid_lines(bounds, zoom) {
            match line.orientation {
                Orientation::Vertical => {
                    let (x, _) = project_to_pixel(bounds.south, line.coordinate, bounds, width, height);
                    if (0..=width as i32).contains(&x) {
                        draw_line_segment_mut(
                            canvas,
                            (x as f32, 0.0),
                            (x as f32, height as f32),
                            GRID_COLOR,
                        );
                    }
                }
                Orientation::Horizontal => {
                    let (_, y) = project_to_pixel(line.coordinate, bounds.west, bounds, width, height);
                    if (0..=height as i32).contains(&y) {
                        draw_line_segment_mut(
                            canvas,
                            (0.0, y as f32),
                            (width as f32, y as f32),
                            GRID_COLOR,
                        );
                    }
                }
            }
        }
    }

    fn draw_label(&self, canvas: &mut RgbaImage, bounds: &TileBounds, label: &ZoneLabel) {
        let (width, height) = canvas.dimensions();
        let (x, y) = project_to_pixel(label.lat, label.lon, bounds, width, height);

        if !within_margin(x, y, width, height) {
            trace!(zone = %label.identifier, x, y, "Label outside margin, dropped");
            return;
        }

        let (text_width, text_height) = self.labels.text_size(&label.identifier);
        let background = Rect::at(x - LABEL_PADDING_X, y - LABEL_PADDING_Y).of_size(
            text_width + 2 * LABEL_PADDING_X as u32,
            text_height.max(1) + 2 * LABEL_PADDING_Y as u32,
        );

        draw_filled_rect_mut(canvas, background, LABEL_BACKGROUND);
        draw_hollow_rect_mut(canvas, background, LABEL_TEXT_COLOR);
        self.labels
            .draw_text(canvas, LABEL_TEXT_COLOR, x, y, &label.identifier);
    }
}

/// Returns true if a label anchor leaves the required margin on every side.
fn within_margin(x: i32, y: i32, width: u32, height: u32) -> bool {
    (LABEL_MARGIN..=width as i32 - LABEL_MARGIN).contains(&x)
        && (LABEL_MARGIN..=height as i32 - LABEL_MARGIN).contains(&y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mgrs::{GridReferenceConverter, GridReferenceError};
    use image::{ColorType, Rgb, RgbImage};
    use std::sync::Arc;

    const BASE: Rgb<u8> = Rgb([0, 0, 200]);

    struct SingleZone;

    impl GridReferenceConverter for SingleZone {
        fn to_grid_reference(&self, _lat: f64, _lon: f64) -> Result<String, GridReferenceError> {
            Ok("33TUG1234512345".to_string())
        }
    }

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    fn base_tile(size: u32, format: ImageFormat) -> Vec<u8> {
        encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(size, size, BASE)),
            format,
        )
    }

    fn compositor() -> TileCompositor {
        TileCompositor::with_overlay(
            GridOverlay::new(Arc::new(SingleZone)),
            LabelRenderer::bitmap(14.0),
        )
    }

    // Tile just south-east of 0°N 0°E: lon 0..1.40625, 0.1° grid at zoom 8
    fn equator_tile() -> TileCoord {
        TileCoord::new(8, 128, 128)
    }

    #[test]
    fn test_output_is_png_with_source_dimensions() {
        let tile = compositor()
            .composite(&base_tile(256, ImageFormat::Png), &equator_tile())
            .unwrap();

        assert_eq!(&tile.data[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(tile.coord, equator_tile());
        let decoded = image::load_from_memory(&tile.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (256, 256));
    }

    #[test]
    fn test_jpeg_source_is_accepted() {
        let tile = compositor()
            .composite(&base_tile(256, ImageFormat::Jpeg), &equator_tile())
            .unwrap();
        let decoded = image::load_from_memory(&tile.data).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgb8);
    }

    #[test]
    fn test_grid_lines_drawn_in_red() {
        let tile = compositor()
            .composite(&base_tile(256, ImageFormat::Png), &equator_tile())
            .unwrap();
        let decoded = image::load_from_memory(&tile.data).unwrap().to_rgb8();

        // 0° meridian on the west edge, 0.1°E at round(0.1 / 1.40625 * 256) = 18
        assert_eq!(*decoded.get_pixel(0, 40), Rgb([255, 0, 0]));
        assert_eq!(*decoded.get_pixel(18, 40), Rgb([255, 0, 0]));
        // Between lines the base raster is untouched
        assert_eq!(*decoded.get_pixel(9, 40), BASE);
    }

    #[test]
    fn test_label_drawn_over_background() {
        let tile = compositor()
            .composite(&base_tile(256, ImageFormat::Png), &equator_tile())
            .unwrap();
        let decoded = image::load_from_memory(&tile.data).unwrap().to_rgb8();

        // Label anchored at the centre; '3' starts with a full top row
        assert_eq!(*decoded.get_pixel(128, 128), Rgb([255, 0, 0]));
        // Gap between the first two glyphs shows the white background
        assert_eq!(*decoded.get_pixel(138, 129), Rgb([255, 255, 255]));
        // Outline one pixel above the text
        assert_eq!(*decoded.get_pixel(130, 127), Rgb([255, 0, 0]));
    }

    #[test]
    fn test_larger_tiles_keep_their_size() {
        let tile = compositor()
            .composite(&base_tile(512, ImageFormat::Png), &equator_tile())
            .unwrap();
        let decoded = image::load_from_memory(&tile.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (512, 512));
    }

    #[test]
    fn test_alpha_is_preserved() {
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(256, 256, Rgba([0, 0, 0, 0])));
        let tile = compositor()
            .composite(&encode(source, ImageFormat::Png), &equator_tile())
            .unwrap();
        let decoded = image::load_from_memory(&tile.data).unwrap();
        assert_eq!(decoded.color(), ColorType::Rgba8);
    }

    #[test]
    fn test_undecodable_bytes() {
        let result = compositor().composite(b"<html>not a tile</html>", &equator_tile());
        assert!(matches!(result, Err(CompositeError::Decode { .. })));
    }

    #[test]
    fn test_tile_outside_grid() {
        let bytes = base_tile(256, ImageFormat::Png);
        assert!(matches!(
            compositor().composite(&bytes, &TileCoord::new(3, 8, 0)),
            Err(CompositeError::Bounds(_))
        ));
        assert!(matches!(
            compositor().composite(&bytes, &TileCoord::new(23, 0, 0)),
            Err(CompositeError::Bounds(_))
        ));
    }

    #[test]
    fn test_margin() {
        assert!(within_margin(10, 10, 256, 256));
        assert!(within_margin(246, 246, 256, 256));
        assert!(!within_margin(9, 128, 256, 256));
        assert!(!within_margin(128, 247, 256, 256));
        assert!(within_margin(502, 502, 512, 512));
        assert!(!within_margin(503, 128, 512, 512));
    }
}
