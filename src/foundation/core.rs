//! Glyphs, grids, dimensions and performance modes.

use std::time::Duration;

use crate::foundation::error::{GlyphformError, GlyphformResult};
use crate::foundation::rng::Rng64;

/// Number of density levels in the glyph ramp.
pub const GLYPH_LEVELS: u8 = 9;

/// Ordered density ramp, level 0 (lightest, blank) to level 8 (darkest).
const GLYPH_RAMP: [char; GLYPH_LEVELS as usize] = [' ', '.', ':', '-', '=', '+', '*', '#', '@'];

/// One of 9 ordered density glyphs mapped from a brightness bucket.
///
/// Level 0 is the sparsest glyph (whitespace), level 8 the densest (`@`). The
/// brightness-to-glyph mapping is monotonic and fixed: the same brightness
/// always yields the same glyph.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Glyph(u8);

impl Glyph {
    /// The blank glyph (level 0).
    pub const BLANK: Glyph = Glyph(0);
    /// The densest glyph (level 8, `@`).
    pub const DARKEST: Glyph = Glyph(8);

    /// Create a glyph from a validated density level in `0..=8`.
    pub fn from_level(level: u8) -> GlyphformResult<Self> {
        if level >= GLYPH_LEVELS {
            return Err(GlyphformError::validation(format!(
                "glyph level {level} out of range 0..=8"
            )));
        }
        Ok(Self(level))
    }

    /// Create a glyph from an arbitrary level, clamping into `0..=8`.
    pub fn from_level_clamped(level: i32) -> Self {
        Self(level.clamp(0, i32::from(GLYPH_LEVELS) - 1) as u8)
    }

    /// Map a brightness value (0 = black, 255 = white) to a glyph.
    ///
    /// Brightness is bucketed via `floor(brightness/255 * 8)` and then
    /// inverted (`8 - bucket`) so bright pixels map to sparse glyphs and dark
    /// pixels to dense ones. The inversion is a deliberate contrast
    /// convention.
    pub fn from_brightness(brightness: u8) -> Self {
        let bucket = (u32::from(brightness) * 8 / 255) as u8;
        Self(GLYPH_LEVELS - 1 - bucket)
    }

    /// Draw a uniformly random glyph level.
    pub fn random(rng: &mut Rng64) -> Self {
        Self((rng.next_u64() % u64::from(GLYPH_LEVELS)) as u8)
    }

    /// Density level in `0..=8`.
    pub fn level(self) -> u8 {
        self.0
    }

    /// The ramp character for this glyph.
    pub fn as_char(self) -> char {
        GLYPH_RAMP[usize::from(self.0)]
    }

    /// Return `true` for the whitespace glyph (painters skip it).
    pub fn is_blank(self) -> bool {
        self.0 == 0
    }
}

/// Fixed-size row-major 2D array of cells.
///
/// Three grid instances co-exist in the engine: `target` (sampled truth),
/// `current` (what gets painted), and `random` (noise source). Grids are
/// rebuilt whole on dimension or image change, never patched in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    /// Build a grid by calling `f(x, y)` for every cell in row-major order.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> T,
    ) -> GlyphformResult<Self> {
        if width == 0 || height == 0 {
            return Err(GlyphformError::validation(
                "grid dimensions must be non-zero",
            ));
        }
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Grid width in cells.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> u32 {
        self.height
    }

    fn idx(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Cell at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(&self.cells[self.idx(x, y)])
    }

    /// Overwrite the cell at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        if x < self.width && y < self.height {
            let i = self.idx(x, y);
            self.cells[i] = value;
        }
    }

    /// Row-major view of all cells.
    pub fn cells(&self) -> &[T] {
        &self.cells
    }
}

impl<T: Clone> Grid<T> {
    /// Build a grid with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: T) -> GlyphformResult<Self> {
        Self::from_fn(width, height, |_, _| value.clone())
    }
}

impl<T: Copy> Grid<T> {
    /// Copy every cell from `other`. Sizes must match.
    pub fn copy_from(&mut self, other: &Grid<T>) -> GlyphformResult<()> {
        if self.width != other.width || self.height != other.height {
            return Err(GlyphformError::validation(
                "grid copy requires matching dimensions",
            ));
        }
        self.cells.copy_from_slice(&other.cells);
        Ok(())
    }
}

/// Grid cell counts plus font pitch, the responsive unit of the engine.
///
/// Regenerating dimensions invalidates both the `target` and `random` grids;
/// the engine treats a dimension change as a full reset.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Font size in pixels; cell pitch is `font_size * 0.6` by `font_size`.
    pub font_size: f32,
}

impl Dimensions {
    /// Create validated dimensions (non-zero cells, positive font size).
    pub fn new(width: u32, height: u32, font_size: f32) -> GlyphformResult<Self> {
        if width == 0 || height == 0 {
            return Err(GlyphformError::validation(
                "dimensions must have non-zero width and height",
            ));
        }
        if !(font_size > 0.0) {
            return Err(GlyphformError::validation("font_size must be positive"));
        }
        Ok(Self {
            width,
            height,
            font_size,
        })
    }

    /// Derive dimensions for a container width, using mobile/tablet
    /// breakpoints. Scaled cell counts are clamped to at least one cell so a
    /// narrow container can never produce a degenerate grid.
    pub fn responsive(self, container_width: u32) -> Self {
        let (scale, font_size) = if container_width < 768 {
            (0.7, (self.font_size * 0.8).max(8.0))
        } else if container_width < 1024 {
            (0.85, (self.font_size * 0.9).max(9.0))
        } else {
            return self;
        };

        Self {
            width: (((self.width as f32) * scale).floor() as u32).max(1),
            height: (((self.height as f32) * scale).floor() as u32).max(1),
            font_size,
        }
    }

    /// Horizontal cell pitch in pixels.
    pub fn cell_width(self) -> f32 {
        self.font_size * 0.6
    }

    /// Vertical cell pitch in pixels.
    pub fn cell_height(self) -> f32 {
        self.font_size
    }

    /// Painted surface width in pixels.
    pub fn surface_width(self) -> u32 {
        ((self.width as f32) * self.cell_width()).round().max(1.0) as u32
    }

    /// Painted surface height in pixels.
    pub fn surface_height(self) -> u32 {
        ((self.height as f32) * self.cell_height()).round().max(1.0) as u32
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: 60,
            height: 45,
            font_size: 10.0,
        }
    }
}

/// Frame-rate budget selected by the host.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceMode {
    /// 60 fps target.
    High,
    /// 45 fps target.
    #[default]
    Balanced,
    /// 30 fps target.
    Low,
}

impl PerformanceMode {
    /// Target frames per second for this mode.
    pub fn target_fps(self) -> u32 {
        match self {
            Self::High => 60,
            Self::Balanced => 45,
            Self::Low => 30,
        }
    }

    /// Minimum interval between painted frames; earlier frames are dropped,
    /// not queued.
    pub fn frame_interval(self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brightness_mapping_is_monotonic_and_inverted() {
        assert_eq!(Glyph::from_brightness(255), Glyph::BLANK);
        assert_eq!(Glyph::from_brightness(0), Glyph::DARKEST);

        let mut prev = Glyph::from_brightness(0).level();
        for b in 1..=255u16 {
            let level = Glyph::from_brightness(b as u8).level();
            assert!(level <= prev, "levels must not increase with brightness");
            prev = level;
        }
    }

    #[test]
    fn glyph_level_is_validated_and_clamped() {
        assert!(Glyph::from_level(8).is_ok());
        assert!(Glyph::from_level(9).is_err());
        assert_eq!(Glyph::from_level_clamped(-3), Glyph::BLANK);
        assert_eq!(Glyph::from_level_clamped(99), Glyph::DARKEST);
    }

    #[test]
    fn ramp_chars_are_distinct_and_anchored() {
        assert_eq!(Glyph::BLANK.as_char(), ' ');
        assert_eq!(Glyph::DARKEST.as_char(), '@');
        for a in 0..GLYPH_LEVELS {
            for b in (a + 1)..GLYPH_LEVELS {
                assert_ne!(
                    Glyph::from_level(a).unwrap().as_char(),
                    Glyph::from_level(b).unwrap().as_char()
                );
            }
        }
    }

    #[test]
    fn grid_rejects_degenerate_dimensions() {
        assert!(Grid::filled(0, 4, 0u8).is_err());
        assert!(Grid::filled(4, 0, 0u8).is_err());
    }

    #[test]
    fn grid_is_row_major() {
        let g = Grid::from_fn(3, 2, |x, y| (x, y)).unwrap();
        assert_eq!(g.cells()[0], (0, 0));
        assert_eq!(g.cells()[3], (0, 1));
        assert_eq!(g.get(2, 1), Some(&(2, 1)));
        assert_eq!(g.get(3, 0), None);
    }

    #[test]
    fn grid_copy_requires_matching_dimensions() {
        let a = Grid::filled(3, 2, 1u8).unwrap();
        let mut b = Grid::filled(3, 2, 0u8).unwrap();
        let mut c = Grid::filled(2, 2, 0u8).unwrap();
        b.copy_from(&a).unwrap();
        assert_eq!(a, b);
        assert!(c.copy_from(&a).is_err());
    }

    #[test]
    fn responsive_dimensions_follow_breakpoints() {
        let base = Dimensions::default();

        let mobile = base.responsive(500);
        assert_eq!(mobile.width, 42);
        assert_eq!(mobile.height, 31);
        assert_eq!(mobile.font_size, 8.0);

        let tablet = base.responsive(800);
        assert_eq!(tablet.width, 51);
        assert_eq!(tablet.height, 38);
        assert_eq!(tablet.font_size, 9.0);

        assert_eq!(base.responsive(1400), base);
    }

    #[test]
    fn responsive_dimensions_never_collapse_to_zero() {
        let tiny = Dimensions::new(1, 1, 10.0).unwrap();
        let scaled = tiny.responsive(320);
        assert!(scaled.width >= 1);
        assert!(scaled.height >= 1);
    }

    #[test]
    fn surface_size_uses_cell_pitch() {
        let d = Dimensions::default();
        assert_eq!(d.surface_width(), 360); // 60 * 10 * 0.6
        assert_eq!(d.surface_height(), 450); // 45 * 10
    }

    #[test]
    fn performance_modes_map_to_fps() {
        assert_eq!(PerformanceMode::High.target_fps(), 60);
        assert_eq!(PerformanceMode::Balanced.target_fps(), 45);
        assert_eq!(PerformanceMode::Low.target_fps(), 30);
        assert!(PerformanceMode::Low.frame_interval() > PerformanceMode::High.frame_interval());
    }
}
