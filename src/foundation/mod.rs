//! Core vocabulary: glyphs, grids, dimensions, errors, deterministic RNG.

pub mod core;
pub mod error;
pub mod rng;
