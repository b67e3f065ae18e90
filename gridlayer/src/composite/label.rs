//! Label text rendering.
//!
//! The renderer is resolved once at startup. Candidate font files are tried
//! in priority order (an explicit override, then well-known platform paths);
//! if none of them loads, a built-in bitmap font is used so labels are
//! always drawn.

use std::fmt;
use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::{debug, info, warn};

use super::bitmap::{self, GLYPH_HEIGHT, GLYPH_SPACING, GLYPH_WIDTH};

/// Default label font size in pixels.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

#[cfg(target_os = "windows")]
const PLATFORM_FONTS: &[&str] = &[
    "C:/Windows/Fonts/arial.ttf",
    "C:/Windows/Fonts/calibri.ttf",
    "C:/Windows/Fonts/tahoma.ttf",
];

#[cfg(target_os = "macos")]
const PLATFORM_FONTS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const PLATFORM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
];

/// Draws label text onto tile canvases.
pub enum LabelRenderer {
    /// Outline font loaded from disk
    Font {
        font: FontVec,
        scale: PxScale,
        source: PathBuf,
    },
    /// Built-in 5×7 bitmap font, each glyph pixel drawn as a `scale`-sized square
    Bitmap { scale: u32 },
}

impl fmt::Debug for LabelRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelRenderer::Font { scale, source, .. } => f
                .debug_struct("Font")
                .field("scale", &scale.y)
                .field("source", source)
                .finish(),
            LabelRenderer::Bitmap { scale } => {
                f.debug_struct("Bitmap").field("scale", scale).finish()
            }
        }
    }
}

impl LabelRenderer {
    /// Resolves a renderer from an optional override followed by the
    /// platform font paths.
    pub fn resolve(font_override: Option<&Path>, font_size: f32) -> Self {
        let candidates: Vec<PathBuf> = font_override
            .map(Path::to_path_buf)
            .into_iter()
            .chain(PLATFORM_FONTS.iter().map(PathBuf::from))
            .collect();

        if let Some(path) = font_override {
            if !path.exists() {
                warn!(path = %path.display(), "Configured label font not found");
            }
        }

        Self::resolve_from(&candidates, font_size)
    }

    /// Returns the first candidate that loads, or the bitmap renderer.
    pub fn resolve_from(candidates: &[PathBuf], font_size: f32) -> Self {
        for path in candidates {
            if let Some(renderer) = Self::from_file(path, font_size) {
                info!(path = %path.display(), font_size, "Label font loaded");
                return renderer;
            }
        }

        info!("No label font found, using built-in bitmap font");
        Self::bitmap(font_size)
    }

    /// Loads an outline font, returning `None` if the file is missing or
    /// not a usable font.
    pub fn from_file(path: &Path, font_size: f32) -> Option<Self> {
        let data = match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Font candidate unavailable");
                return None;
            }
        };

        match FontVec::try_from_vec(data) {
            Ok(font) => Some(LabelRenderer::Font {
                font,
                scale: PxScale::from(font_size),
                source: path.to_path_buf(),
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Font candidate is not a valid font");
                None
            }
        }
    }

    /// Built-in bitmap renderer sized to approximate `font_size`.
    pub fn bitmap(font_size: f32) -> Self {
        let scale = (font_size / GLYPH_HEIGHT as f32).round().max(1.0) as u32;
        LabelRenderer::Bitmap { scale }
    }

    /// Returns true if this renderer uses the built-in bitmap font.
    pub fn is_bitmap(&self) -> bool {
        matches!(self, LabelRenderer::Bitmap { .. })
    }

    /// Path of the loaded font file, if any.
    pub fn source(&self) -> Option<&Path> {
        match self {
            LabelRenderer::Font { source, .. } => Some(source),
            LabelRenderer::Bitmap { .. } => None,
        }
    }

    /// Width and height in pixels of `text` as drawn.
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        match self {
            LabelRenderer::Font { font, scale, .. } => text_size(*scale, font, text),
            LabelRenderer::Bitmap { scale } => {
                let chars = text.chars().count() as u32;
                if chars == 0 {
                    return (0, 0);
                }
                let advance = (GLYPH_WIDTH + GLYPH_SPACING) * scale;
                (chars * advance - GLYPH_SPACING * scale, GLYPH_HEIGHT * scale)
            }
        }
    }

    /// Draws `text` with its top-left corner at `(x, y)`, clipped to the canvas.
    pub fn draw_text(&self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str) {
        match self {
            LabelRenderer::Font { font, scale, .. } => {
                draw_text_mut(canvas, color, x, y, *scale, font, text)
            }
            LabelRenderer::Bitmap { scale } => {
                let advance = ((GLYPH_WIDTH + GLYPH_SPACING) * scale) as i32;
                for (i, c) in text.chars().enumerate() {
                    let Some(rows) = bitmap::glyph(c) else {
                        continue;
                    };
                    let origin_x = x + i as i32 * advance;
                    for (gx, gy) in bitmap::lit_pixels(rows) {
                        let px = origin_x + (gx * scale) as i32;
                        let py = y + (gy * scale) as i32;
                        draw_filled_rect_mut(canvas, Rect::at(px, py).of_size(*scale, *scale), color);
                    }
                }
            }
        }
    }
}
