//! Seeded pseudo-random number generation.

/// Small deterministic RNG used by the stochastic phase rules.
///
/// Every run of the engine owns one `Rng64` seeded from its configuration, so
/// a full animation is reproducible from `(image, dimensions, seed)`.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Create a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 64-bit value (one SplitMix64 step).
    pub fn next_u64(&mut self) -> u64 {
        // Weyl increment, then two mix rounds.
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Next uniform value in `[0, 1)`.
    pub fn next_f64_01(&mut self) -> f64 {
        // Top 53 bits, the f64 mantissa width.
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }
}
