//! Image sampling: source bitmap to `target` glyph grid.
//!
//! Sampling is pure: for a fixed image and fixed grid dimensions the produced
//! grid is identical across runs. It writes only the `target` grid, never
//! `current`.

use std::path::Path;

use image::RgbaImage;
use image::imageops::FilterType;

use crate::foundation::core::{Glyph, Grid};
use crate::foundation::error::{GlyphformError, GlyphformResult};
use crate::foundation::rng::Rng64;

/// Decode a source bitmap from disk.
///
/// Decode failure is an expected boundary error (the caller shows the
/// placeholder fallback); it never panics past this function.
pub fn load_image(path: &Path) -> GlyphformResult<RgbaImage> {
    let img = image::open(path).map_err(|e| {
        GlyphformError::sampling(format!("failed to load '{}': {e}", path.display()))
    })?;
    Ok(img.to_rgba8())
}

/// Downsample `img` into a `width x height` glyph grid.
///
/// Each cell takes the average of R, G, B of the corresponding downsampled
/// pixel and maps it through the inverted 9-level ramp (bright pixels become
/// sparse glyphs).
#[tracing::instrument(skip(img), fields(src_w = img.width(), src_h = img.height()))]
pub fn sample_target(img: &RgbaImage, width: u32, height: u32) -> GlyphformResult<Grid<Glyph>> {
    if width == 0 || height == 0 {
        return Err(GlyphformError::validation(
            "sample dimensions must be non-zero",
        ));
    }
    if img.width() == 0 || img.height() == 0 {
        return Err(GlyphformError::sampling("source image has no pixels"));
    }

    let small = image::imageops::resize(img, width, height, FilterType::Triangle);
    Grid::from_fn(width, height, |x, y| {
        let p = small.get_pixel(x, y);
        let brightness = ((u16::from(p[0]) + u16::from(p[1]) + u16::from(p[2])) / 3) as u8;
        Glyph::from_brightness(brightness)
    })
}

/// Fill a grid with uniformly random glyphs, the noise source for the
/// cycling/formation phases.
pub fn random_grid(rng: &mut Rng64, width: u32, height: u32) -> GlyphformResult<Grid<Glyph>> {
    Grid::from_fn(width, height, |_, _| Glyph::random(rng))
}
