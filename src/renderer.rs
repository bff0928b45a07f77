//! Cell-state renderer: mutates the displayed grid toward the sampled truth.
//!
//! Three grids co-exist: `target` (immutable sampled truth), `current` (what
//! gets painted) and `random` (noise source). One mutation rule per phase,
//! applied to every cell every tick. All randomness comes from the renderer's
//! seeded [`Rng64`], so a run is reproducible.

use crate::foundation::core::{Glyph, Grid};
use crate::foundation::error::GlyphformResult;
use crate::foundation::rng::Rng64;
use crate::sampler::random_grid;
use crate::timeline::Phase;

/// Owns the three glyph grids and applies the per-phase mutation rules.
#[derive(Clone, Debug)]
pub struct CellRenderer {
    target: Grid<Glyph>,
    current: Grid<Glyph>,
    random: Grid<Glyph>,
    rng: Rng64,
    frame_count: u64,
}

impl CellRenderer {
    /// Create a renderer for `target`. `current` starts fully blank; `random`
    /// is generated from `seed`.
    pub fn new(target: Grid<Glyph>, seed: u64) -> GlyphformResult<Self> {
        let mut rng = Rng64::new(seed);
        let current = Grid::filled(target.width(), target.height(), Glyph::BLANK)?;
        let random = random_grid(&mut rng, target.width(), target.height())?;
        Ok(Self {
            target,
            current,
            random,
            rng,
            frame_count: 0,
        })
    }

    /// The sampled truth grid.
    pub fn target(&self) -> &Grid<Glyph> {
        &self.target
    }

    /// The displayed grid.
    pub fn current(&self) -> &Grid<Glyph> {
        &self.current
    }

    /// Frames applied since construction or [`CellRenderer::reset`].
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Restart the run: blank `current`, fresh `random`, frame count zeroed.
    /// The RNG stream continues, so looping runs differ from each other.
    pub fn reset(&mut self) -> GlyphformResult<()> {
        self.current = Grid::filled(self.target.width(), self.target.height(), Glyph::BLANK)?;
        self.random = random_grid(&mut self.rng, self.target.width(), self.target.height())?;
        self.frame_count = 0;
        Ok(())
    }

    /// Apply one animation frame for `phase` at `progress` in `[0, 1]`.
    pub fn apply(&mut self, phase: Phase, progress: f64) -> GlyphformResult<()> {
        self.frame_count += 1;
        match phase {
            Phase::RandomCycling => self.apply_random_cycling()?,
            Phase::GradualFormation => self.apply_gradual_formation(progress),
            Phase::DetailRefinement => self.apply_detail_refinement(),
            Phase::GlitchTransition => self.apply_glitch_transition(progress),
            Phase::PhotoReveal => self.apply_photo_reveal(progress),
        }
        Ok(())
    }

    /// Write `current = target` exactly. Used by the reduced-motion static
    /// path and by the end-of-cycle guarantee.
    pub fn force_target(&mut self) {
        // Grids share dimensions by construction.
        let _ = self.current.copy_from(&self.target);
    }

    fn regenerate_random(&mut self) -> GlyphformResult<()> {
        self.random = random_grid(&mut self.rng, self.target.width(), self.target.height())?;
        Ok(())
    }

    /// Phase 1: show pure noise. The noise grid is regenerated only every 3rd
    /// frame, producing a flicker rather than per-frame white noise.
    fn apply_random_cycling(&mut self) -> GlyphformResult<()> {
        if self.frame_count % 3 == 0 {
            self.regenerate_random()?;
        }
        let _ = self.current.copy_from(&self.random);
        Ok(())
    }

    /// Phase 2: reveal target cells behind an organic spatial-noise front;
    /// unrevealed cells keep cycling every 5th frame.
    fn apply_gradual_formation(&mut self, progress: f64) {
        let recycle = self.frame_count % 5 == 0;
        for y in 0..self.target.height() {
            for x in 0..self.target.width() {
                let noise =
                    ((f64::from(x) * 0.1).sin() + (f64::from(y) * 0.1).cos()) * 0.5 + 0.5;
                let threshold = progress + (noise - 0.5) * 0.3;
                if self.rng.next_f64_01() < threshold {
                    let t = *self.target.get(x, y).unwrap_or(&Glyph::BLANK);
                    self.current.set(x, y, t);
                } else if recycle {
                    let g = Glyph::random(&mut self.rng);
                    self.current.set(x, y, g);
                }
            }
        }
    }

    /// Phase 3: 95% of cells settle on target; the rest flicker within one
    /// density level of it, clamped to the ramp.
    fn apply_detail_refinement(&mut self) {
        for y in 0..self.target.height() {
            for x in 0..self.target.width() {
                let t = *self.target.get(x, y).unwrap_or(&Glyph::BLANK);
                if self.rng.next_f64_01() < 0.95 {
                    self.current.set(x, y, t);
                } else {
                    let offset = self.rng.next_f64_01() * 2.0 - 1.0;
                    let level = (f64::from(t.level()) + offset).floor() as i32;
                    self.current.set(x, y, Glyph::from_level_clamped(level));
                }
            }
        }
    }

    /// Phase 4: decaying glitch oscillation; a cell shows a fully random
    /// glyph with probability `intensity * 0.7`, otherwise target.
    fn apply_glitch_transition(&mut self, progress: f64) {
        let intensity = (progress * std::f64::consts::PI * 10.0).sin() * 0.5 + 0.5;
        let p_glitch = intensity * 0.7;
        for y in 0..self.target.height() {
            for x in 0..self.target.width() {
                if self.rng.next_f64_01() < p_glitch {
                    let g = Glyph::random(&mut self.rng);
                    self.current.set(x, y, g);
                } else {
                    let t = *self.target.get(x, y).unwrap_or(&Glyph::BLANK);
                    self.current.set(x, y, t);
                }
            }
        }
    }

    /// Phase 5: linear stochastic ramp toward target; from `progress >= 0.9`
    /// every cell is force-written so the final frame is exact regardless of
    /// the ramp.
    fn apply_photo_reveal(&mut self, progress: f64) {
        for y in 0..self.target.height() {
            for x in 0..self.target.width() {
                if self.rng.next_f64_01() < progress {
                    let t = *self.target.get(x, y).unwrap_or(&Glyph::BLANK);
                    self.current.set(x, y, t);
                }
            }
        }

        if progress >= 0.9 {
            self.force_target();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::Grid;

    fn checker_target(width: u32, height: u32) -> Grid<Glyph> {
        Grid::from_fn(width, height, |x, y| {
            Glyph::from_level_clamped(((x + y) % 9) as i32)
        })
        .unwrap()
    }

    #[test]
    fn starts_blank() {
        let r = CellRenderer::new(checker_target(8, 6), 1).unwrap();
        assert!(r.current().cells().iter().all(|g| g.is_blank()));
    }

    #[test]
    fn random_cycling_copies_noise_grid() {
        let mut r = CellRenderer::new(checker_target(8, 6), 1).unwrap();
        r.apply(Phase::RandomCycling, 0.0).unwrap();
        assert_eq!(r.current(), &r.random);
    }

    #[test]
    fn random_cycling_regenerates_every_third_frame() {
        let mut r = CellRenderer::new(checker_target(16, 12), 1).unwrap();
        r.apply(Phase::RandomCycling, 0.0).unwrap();
        let after_first = r.random.clone();
        r.apply(Phase::RandomCycling, 0.0).unwrap();
        assert_eq!(r.random, after_first, "frame 2 must not regenerate");
        r.apply(Phase::RandomCycling, 0.0).unwrap();
        assert_ne!(r.random, after_first, "frame 3 must regenerate");
    }

    #[test]
    fn detail_refinement_flickers_within_one_level() {
        let target = Grid::filled(16, 16, Glyph::from_level(4).unwrap()).unwrap();
        let mut r = CellRenderer::new(target, 9).unwrap();
        r.apply(Phase::DetailRefinement, 0.5).unwrap();
        for g in r.current().cells() {
            let d = i32::from(g.level()) - 4;
            assert!(d.abs() <= 1, "flicker level {} too far from target", g.level());
        }
    }

    #[test]
    fn detail_refinement_clamps_at_ramp_edges() {
        for target_level in [0u8, 8u8] {
            let target = Grid::filled(16, 16, Glyph::from_level(target_level).unwrap()).unwrap();
            let mut r = CellRenderer::new(target, 5).unwrap();
            for _ in 0..50 {
                r.apply(Phase::DetailRefinement, 0.5).unwrap();
                assert!(r.current().cells().iter().all(|g| g.level() <= 8));
            }
        }
    }

    #[test]
    fn photo_reveal_forces_exact_target_at_end() {
        for seed in 0..20 {
            let mut r = CellRenderer::new(checker_target(10, 10), seed).unwrap();
            r.apply(Phase::RandomCycling, 0.0).unwrap();
            r.apply(Phase::PhotoReveal, 0.95).unwrap();
            assert_eq!(r.current(), r.target(), "seed {seed} left residual noise");
        }
    }

    #[test]
    fn photo_reveal_below_threshold_may_keep_noise() {
        let mut r = CellRenderer::new(checker_target(20, 20), 3).unwrap();
        r.apply(Phase::RandomCycling, 0.0).unwrap();
        r.apply(Phase::PhotoReveal, 0.1).unwrap();
        // With a 10% ramp almost all cells should still differ from target.
        let diff = r
            .current()
            .cells()
            .iter()
            .zip(r.target().cells())
            .filter(|(a, b)| a != b)
            .count();
        assert!(diff > 0);
    }

    #[test]
    fn same_seed_reproduces_identical_run() {
        let script = [
            (Phase::RandomCycling, 0.2),
            (Phase::GradualFormation, 0.4),
            (Phase::DetailRefinement, 0.5),
            (Phase::GlitchTransition, 0.6),
            (Phase::PhotoReveal, 0.7),
        ];
        let mut a = CellRenderer::new(checker_target(12, 8), 77).unwrap();
        let mut b = CellRenderer::new(checker_target(12, 8), 77).unwrap();
        for (phase, progress) in script {
            a.apply(phase, progress).unwrap();
            b.apply(phase, progress).unwrap();
            assert_eq!(a.current(), b.current());
        }
    }

    #[test]
    fn reset_blanks_current_and_zeroes_frames() {
        let mut r = CellRenderer::new(checker_target(8, 6), 1).unwrap();
        r.apply(Phase::RandomCycling, 0.0).unwrap();
        r.reset().unwrap();
        assert_eq!(r.frame_count(), 0);
        assert!(r.current().cells().iter().all(|g| g.is_blank()));
    }
}
