//! Five-phase reveal timeline.
//!
//! The scheduler is a pure function of elapsed wall-clock time, never frame
//! count, so behavior is consistent across hosts with different refresh
//! rates.

use std::time::Duration;

use crate::foundation::error::{GlyphformError, GlyphformResult};

/// Pause between the end of one cycle and an auto-restart when looping.
pub const RESTART_COOLDOWN: Duration = Duration::from_millis(3000);

/// One of the five fixed-duration reveal stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    /// Phase 1: pure flickering noise.
    RandomCycling,
    /// Phase 2: organic, noise-front reveal of the portrait.
    GradualFormation,
    /// Phase 3: mostly-settled image with sparse settling flicker.
    DetailRefinement,
    /// Phase 4: short intense glitch burst.
    GlitchTransition,
    /// Phase 5: linear ramp into the exact final frame.
    PhotoReveal,
}

impl Phase {
    /// All phases in timeline order.
    pub const ALL: [Phase; 5] = [
        Phase::RandomCycling,
        Phase::GradualFormation,
        Phase::DetailRefinement,
        Phase::GlitchTransition,
        Phase::PhotoReveal,
    ];

    /// 1-based phase index.
    pub fn index(self) -> u8 {
        match self {
            Self::RandomCycling => 1,
            Self::GradualFormation => 2,
            Self::DetailRefinement => 3,
            Self::GlitchTransition => 4,
            Self::PhotoReveal => 5,
        }
    }

    /// Default duration of this phase.
    pub fn default_duration(self) -> Duration {
        let ms = match self {
            Self::RandomCycling => 2000,
            Self::GradualFormation => 2000,
            Self::DetailRefinement => 1000,
            Self::GlitchTransition => 200,
            Self::PhotoReveal => 1000,
        };
        Duration::from_millis(ms)
    }
}

/// Position in the timeline for a given elapsed time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cursor {
    /// Inside a phase with normalized progress in `[0, 1]`.
    Active {
        /// Current phase.
        phase: Phase,
        /// Progress within the phase, clamped to `[0, 1]`.
        progress: f64,
    },
    /// Elapsed time is past the end of the last phase.
    Complete,
}

/// Fixed five-phase schedule with per-phase durations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeline {
    durations: [Duration; 5],
}

impl Timeline {
    /// Create a timeline with validated per-phase durations.
    pub fn new(durations: [Duration; 5]) -> GlyphformResult<Self> {
        if durations.iter().any(|d| d.is_zero()) {
            return Err(GlyphformError::validation(
                "phase durations must be non-zero",
            ));
        }
        Ok(Self { durations })
    }

    /// Total duration of one full cycle.
    pub fn total(&self) -> Duration {
        self.durations.iter().sum()
    }

    /// Duration of `phase`.
    pub fn duration_of(&self, phase: Phase) -> Duration {
        self.durations[phase.index() as usize - 1]
    }

    /// Locate the phase and progress for `elapsed` time since animation
    /// start.
    ///
    /// Walks phases accumulating durations until `elapsed` falls inside one;
    /// progress is `(elapsed - previous_cumulative) / phase_duration`,
    /// clamped to `[0, 1]`. For monotonically increasing `elapsed` the
    /// returned phase never decreases.
    pub fn cursor_at(&self, elapsed: Duration) -> Cursor {
        let mut cumulative = Duration::ZERO;
        for (phase, &duration) in Phase::ALL.iter().zip(&self.durations) {
            if elapsed <= cumulative + duration {
                let progress =
                    (elapsed - cumulative).as_secs_f64() / duration.as_secs_f64();
                return Cursor::Active {
                    phase: *phase,
                    progress: progress.clamp(0.0, 1.0),
                };
            }
            cumulative += duration;
        }
        Cursor::Complete
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            durations: Phase::ALL.map(Phase::default_duration),
        }
    }
}
