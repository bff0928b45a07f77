//! glyphform is a procedural ASCII-portrait reveal engine.
//!
//! It converts a source bitmap into a fixed-size grid of 9 density glyphs and
//! animates that grid through a five-phase timeline (random cycling → gradual
//! formation → detail refinement → glitch transition → photo reveal), driven
//! strictly by elapsed wall-clock time.
//!
//! The public surface is host-driven:
//!
//! - Build an [`Engine`] from a source image and an [`EngineConfig`]
//! - Plug in a [`Painter`] (text, raster, or your own surface)
//! - Call [`Engine::tick`] from your frame callback with a monotonic clock
//!
//! All stochastic behavior is seeded, so a full run is reproducible from
//! `(image, dimensions, seed)`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod engine;
pub mod foundation;
pub mod paint;
pub mod renderer;
pub mod sampler;
pub mod timeline;

pub use engine::{AnimationState, Engine, EngineConfig, TickOutcome};
pub use foundation::core::{Dimensions, GLYPH_LEVELS, Glyph, Grid, PerformanceMode};
pub use foundation::error::{GlyphformError, GlyphformResult};
pub use foundation::rng::Rng64;
pub use paint::{FALLBACK_LINES, FrameRgba, Painter, RasterPainter, TextPainter};
pub use renderer::CellRenderer;
pub use timeline::{Cursor, Phase, RESTART_COOLDOWN, Timeline};
