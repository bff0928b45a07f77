//! Painters: blit the displayed glyph grid onto an output surface.
//!
//! The engine drives a [`Painter`] and never owns the surface itself; hosts
//! plug in their own implementation or use one of the built-ins. Every call
//! is a full frame: clear to the background, then blit. Whitespace glyphs are
//! skipped entirely (no draw call).

use std::collections::HashMap;

use crate::foundation::core::{Dimensions, Glyph, Grid};
use crate::foundation::error::{GlyphformError, GlyphformResult};

/// Fallback frame text shown when the source image could not be loaded.
pub const FALLBACK_LINES: [&str; 2] = ["PORTRAIT", "LOADING..."];

/// Output surface contract.
pub trait Painter {
    /// Paint one full frame of `grid`.
    fn paint(&mut self, grid: &Grid<Glyph>, dims: &Dimensions) -> GlyphformResult<()>;

    /// Paint the static placeholder frame (image load failed).
    fn paint_fallback(&mut self, dims: &Dimensions) -> GlyphformResult<()>;
}

/// Text painter: renders the grid as lines of ramp characters.
///
/// Keeps the last painted frame and a paint counter, which makes it the
/// in-memory sink for tests and the CLI's text output.
#[derive(Debug, Default)]
pub struct TextPainter {
    last_frame: Option<String>,
    paint_count: u64,
}

impl TextPainter {
    /// Create an empty text painter.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently painted frame, if any.
    pub fn last_frame(&self) -> Option<&str> {
        self.last_frame.as_deref()
    }

    /// Number of frames painted so far (fallback frames included).
    pub fn paint_count(&self) -> u64 {
        self.paint_count
    }
}

impl Painter for TextPainter {
    fn paint(&mut self, grid: &Grid<Glyph>, _dims: &Dimensions) -> GlyphformResult<()> {
        let mut out = String::with_capacity((grid.width() as usize + 1) * grid.height() as usize);
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let g = grid.get(x, y).copied().unwrap_or(Glyph::BLANK);
                out.push(g.as_char());
            }
            out.push('\n');
        }
        self.last_frame = Some(out);
        self.paint_count += 1;
        Ok(())
    }

    fn paint_fallback(&mut self, dims: &Dimensions) -> GlyphformResult<()> {
        let width = dims.width as usize;
        let height = dims.height as usize;
        let mut lines = vec![" ".repeat(width); height];

        for (i, text) in FALLBACK_LINES.iter().enumerate() {
            let row = (height / 2).saturating_sub(1) + i * 2;
            if row >= height {
                break;
            }
            let text: String = text.chars().take(width).collect();
            let col = (width.saturating_sub(text.len())) / 2;
            let mut line: Vec<char> = lines[row].chars().collect();
            for (j, c) in text.chars().enumerate() {
                line[col + j] = c;
            }
            lines[row] = line.into_iter().collect();
        }

        let mut out = String::with_capacity((width + 1) * height);
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        self.last_frame = Some(out);
        self.paint_count += 1;
        Ok(())
    }
}

/// One rendered RGBA8 frame, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRgba {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes, 4 per pixel.
    pub data: Vec<u8>,
}

impl FrameRgba {
    fn opaque_black(width: u32, height: u32) -> Self {
        let mut data = vec![0u8; width as usize * height as usize * 4];
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Self {
            width,
            height,
            data,
        }
    }
}

type RasterizedGlyph = (fontdue::Metrics, Vec<u8>);

/// Raster painter: blits monospace glyphs into an RGBA8 frame.
///
/// White glyphs on a black background, pixel-snapped at the fixed cell pitch
/// (`cell_w = font_size * 0.6`, `cell_h = font_size`). Rasterized coverage
/// bitmaps are cached per character and invalidated when the pitch changes.
pub struct RasterPainter {
    font: fontdue::Font,
    cache: HashMap<char, RasterizedGlyph>,
    cached_px: f32,
    frame: Option<FrameRgba>,
}

impl RasterPainter {
    /// Build a painter from raw TTF/OTF bytes.
    pub fn from_font_bytes(bytes: &[u8]) -> GlyphformResult<Self> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| GlyphformError::surface(format!("failed to parse font: {e}")))?;
        Ok(Self {
            font,
            cache: HashMap::new(),
            cached_px: 0.0,
            frame: None,
        })
    }

    /// The most recently painted frame, if any.
    pub fn frame(&self) -> Option<&FrameRgba> {
        self.frame.as_ref()
    }

    fn rasterized(&mut self, c: char, px: f32) -> &RasterizedGlyph {
        if px != self.cached_px {
            self.cache.clear();
            self.cached_px = px;
        }
        let font = &self.font;
        self.cache.entry(c).or_insert_with(|| font.rasterize(c, px))
    }

    fn blit_char(frame: &mut FrameRgba, glyph: &RasterizedGlyph, origin_x: i32, baseline_y: i32) {
        let (metrics, coverage) = glyph;
        let top = baseline_y - metrics.ymin - metrics.height as i32;
        let left = origin_x + metrics.xmin;
        for gy in 0..metrics.height {
            let py = top + gy as i32;
            if py < 0 || py >= frame.height as i32 {
                continue;
            }
            for gx in 0..metrics.width {
                let px = left + gx as i32;
                if px < 0 || px >= frame.width as i32 {
                    continue;
                }
                let cov = coverage[gy * metrics.width + gx];
                if cov == 0 {
                    continue;
                }
                let i = (py as usize * frame.width as usize + px as usize) * 4;
                frame.data[i] = frame.data[i].max(cov);
                frame.data[i + 1] = frame.data[i + 1].max(cov);
                frame.data[i + 2] = frame.data[i + 2].max(cov);
            }
        }
    }

    fn draw_text(&mut self, frame: &mut FrameRgba, text: &str, px: f32, left: f32, baseline: f32) {
        let mut pen = left;
        for c in text.chars() {
            if c != ' ' {
                let glyph = self.rasterized(c, px);
                Self::blit_char(frame, glyph, pen.round() as i32, baseline.round() as i32);
            }
            pen += px * 0.6;
        }
    }

    fn ascent(&self, px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent)
            .unwrap_or(px * 0.8)
    }
}

impl Painter for RasterPainter {
    fn paint(&mut self, grid: &Grid<Glyph>, dims: &Dimensions) -> GlyphformResult<()> {
        let mut frame = FrameRgba::opaque_black(dims.surface_width(), dims.surface_height());
        let px = dims.font_size;
        let ascent = self.ascent(px);

        for y in 0..grid.height() {
            let baseline = (f64::from(y) * f64::from(dims.cell_height())) as f32 + ascent;
            for x in 0..grid.width() {
                let g = grid.get(x, y).copied().unwrap_or(Glyph::BLANK);
                if g.is_blank() {
                    continue;
                }
                let origin = (f64::from(x) * f64::from(dims.cell_width())) as f32;
                let glyph = self.rasterized(g.as_char(), px);
                Self::blit_char(
                    &mut frame,
                    glyph,
                    origin.round() as i32,
                    baseline.round() as i32,
                );
            }
        }

        self.frame = Some(frame);
        Ok(())
    }

    fn paint_fallback(&mut self, dims: &Dimensions) -> GlyphformResult<()> {
        let mut frame = FrameRgba::opaque_black(dims.surface_width(), dims.surface_height());
        let px = dims.font_size * 2.0;
        let center_y = frame.height as f32 / 2.0;

        for (i, text) in FALLBACK_LINES.iter().enumerate() {
            let text_w = text.chars().count() as f32 * px * 0.6;
            let left = (frame.width as f32 - text_w) / 2.0;
            let baseline = center_y + (i as f32 * 2.0 - 1.0) * px;
            self.draw_text(&mut frame, text, px, left.max(0.0), baseline);
        }

        self.frame = Some(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Grid;

    #[test]
    fn text_painter_renders_ramp_rows() {
        let grid = Grid::from_fn(3, 2, |x, y| Glyph::from_level_clamped((x + y * 3) as i32))
            .unwrap();
        let mut p = TextPainter::new();
        p.paint(&grid, &Dimensions::default()).unwrap();
        assert_eq!(p.last_frame(), Some(" .:\n-=+\n"));
        assert_eq!(p.paint_count(), 1);
    }

    #[test]
    fn text_painter_fallback_contains_placeholder() {
        let dims = Dimensions::new(20, 6, 10.0).unwrap();
        let mut p = TextPainter::new();
        p.paint_fallback(&dims).unwrap();
        let frame = p.last_frame().unwrap();
        assert!(frame.contains("PORTRAIT"));
        assert!(frame.contains("LOADING..."));
        assert_eq!(frame.lines().count(), 6);
    }

    #[test]
    fn text_painter_fallback_survives_tiny_grids() {
        let dims = Dimensions::new(4, 2, 10.0).unwrap();
        let mut p = TextPainter::new();
        p.paint_fallback(&dims).unwrap();
        assert_eq!(p.last_frame().unwrap().lines().count(), 2);
    }
}
