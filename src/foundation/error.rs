//! Crate-wide error and result types.

/// Crate-wide result alias.
pub type GlyphformResult<T> = Result<T, GlyphformError>;

/// Error type for all fallible glyphform operations.
#[derive(thiserror::Error, Debug)]
pub enum GlyphformError {
    /// Invalid configuration or degenerate input (zero-sized grid, bad durations).
    #[error("validation error: {0}")]
    Validation(String),

    /// Image decode or brightness sampling failure.
    #[error("sampling error: {0}")]
    Sampling(String),

    /// Animation state machine misuse or timeline failure.
    #[error("animation error: {0}")]
    Animation(String),

    /// Painting surface failure (raster buffer, glyph rasterization).
    #[error("surface error: {0}")]
    Surface(String),

    /// Wrapped external error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GlyphformError {
    /// Build a [`GlyphformError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`GlyphformError::Sampling`].
    pub fn sampling(msg: impl Into<String>) -> Self {
        Self::Sampling(msg.into())
    }

    /// Build a [`GlyphformError::Animation`].
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`GlyphformError::Surface`].
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            GlyphformError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            GlyphformError::sampling("x")
                .to_string()
                .contains("sampling error:")
        );
        assert!(
            GlyphformError::animation("x")
                .to_string()
                .contains("animation error:")
        );
        assert!(
            GlyphformError::surface("x")
                .to_string()
                .contains("surface error:")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = GlyphformError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
