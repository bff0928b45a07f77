//! Animation engine: lifecycle, visibility gating, and frame-rate governing.
//!
//! The engine is an explicit instance owned by whoever composes the page or
//! scene; there are no module-level singletons. It never pumps frames itself:
//! the host calls [`Engine::tick`] with a monotonically non-decreasing clock
//! reading (its own frame callback, a test's fake clock), and the engine
//! decides through a single predicate whether that frame runs, is throttled,
//! or is skipped. This keeps cancellation and testing tractable without a
//! live frame pump.

use std::time::Duration;

use image::RgbaImage;
use tracing::debug;

use crate::foundation::core::{Dimensions, Glyph, Grid, PerformanceMode};
use crate::foundation::error::{GlyphformError, GlyphformResult};
use crate::paint::Painter;
use crate::renderer::CellRenderer;
use crate::sampler::sample_target;
use crate::timeline::{Cursor, RESTART_COOLDOWN, Timeline};

/// Engine configuration, passed at construction (never looked up globally).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Grid cell counts and font pitch.
    pub dimensions: Dimensions,
    /// Begin animating on the first visible tick.
    pub auto_start: bool,
    /// Restart after a cool-down once a cycle completes.
    pub looping: bool,
    /// Frame-rate budget.
    pub performance_mode: PerformanceMode,
    /// Derive dimensions from the host container width.
    pub responsive: bool,
    /// Label exposed to assistive technology.
    pub accessibility_label: String,
    /// Seed for the stochastic phase rules.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dimensions: Dimensions::default(),
            auto_start: true,
            looping: true,
            performance_mode: PerformanceMode::default(),
            responsive: true,
            accessibility_label: "ASCII art portrait".to_owned(),
            seed: 0,
        }
    }
}

/// Snapshot of the running animation, per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationState {
    /// Current phase index, `1..=5`. Monotonic within one run.
    pub phase: u8,
    /// Progress within the phase, clamped to `[0, 1]`.
    pub progress: f64,
    /// Whether a run is in flight.
    pub is_animating: bool,
    /// Clock reading when the run started.
    pub started_at: Duration,
    /// Frames applied in this run.
    pub frame_count: u64,
}

/// What the engine did with one host tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was computed and painted.
    Painted,
    /// The tick arrived faster than the frame interval and was dropped.
    Throttled,
    /// The surface is not visible; state kept, nothing painted.
    Paused,
    /// Nothing to do (stopped, done, or waiting out the restart cool-down).
    Idle,
    /// The final frame was painted and the completion callback fired.
    Completed,
    /// Reduced motion: the single static final frame was painted.
    Static,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunState {
    Idle,
    Running { started_at: Duration },
    CoolingDown { restart_at: Duration },
    Done,
}

/// The portrait animation engine.
///
/// Owns the three glyph grids and the source bitmap for the duration of its
/// life; the painted surface belongs to the host and is only written through
/// the [`Painter`] passed to each tick.
pub struct Engine {
    config: EngineConfig,
    timeline: Timeline,
    source: Option<RgbaImage>,
    dims: Dimensions,
    renderer: Option<CellRenderer>,
    state: RunState,
    visible: bool,
    reduced_motion: bool,
    static_painted: bool,
    fallback_painted: bool,
    last_paint: Option<Duration>,
    on_complete: Option<Box<dyn FnMut()>>,
}

impl Engine {
    /// Create an engine for a loaded source bitmap.
    pub fn new(source: RgbaImage, config: EngineConfig) -> GlyphformResult<Self> {
        let dims = config.dimensions;
        let target = sample_target(&source, dims.width, dims.height)?;
        let renderer = CellRenderer::new(target, config.seed)?;
        Ok(Self {
            config,
            timeline: Timeline::default(),
            source: Some(source),
            dims,
            renderer: Some(renderer),
            state: RunState::Idle,
            visible: true,
            reduced_motion: false,
            static_painted: false,
            fallback_painted: false,
            last_paint: None,
            on_complete: None,
        })
    }

    /// Create an engine in fallback mode (the source image failed to load).
    ///
    /// No animation ever starts; each painter sees the static placeholder
    /// frame exactly once.
    pub fn fallback(config: EngineConfig) -> Self {
        let dims = config.dimensions;
        Self {
            config,
            timeline: Timeline::default(),
            source: None,
            dims,
            renderer: None,
            state: RunState::Done,
            visible: true,
            reduced_motion: false,
            static_painted: false,
            fallback_painted: false,
            last_paint: None,
            on_complete: None,
        }
    }

    /// Replace the default timeline (validated by [`Timeline::new`]).
    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = timeline;
        self
    }

    /// Register the completion callback, invoked once per full cycle at the
    /// end of the reveal, before any restart is scheduled.
    pub fn set_on_complete(&mut self, cb: impl FnMut() + 'static) {
        self.on_complete = Some(Box::new(cb));
    }

    /// Active dimensions (after any responsive derivation).
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Configured frame-rate budget.
    pub fn performance_mode(&self) -> PerformanceMode {
        self.config.performance_mode
    }

    /// The displayed grid, when a source image is loaded.
    pub fn current(&self) -> Option<&Grid<Glyph>> {
        self.renderer.as_ref().map(CellRenderer::current)
    }

    /// The sampled truth grid, when a source image is loaded.
    pub fn target(&self) -> Option<&Grid<Glyph>> {
        self.renderer.as_ref().map(CellRenderer::target)
    }

    /// Whether a run is currently in flight.
    pub fn is_animating(&self) -> bool {
        matches!(self.state, RunState::Running { .. })
    }

    /// Whether the reduced-motion static mode indicator should be shown.
    pub fn is_static_mode(&self) -> bool {
        self.reduced_motion
    }

    /// Label for the host to expose to assistive technology.
    pub fn accessibility_label(&self) -> &str {
        &self.config.accessibility_label
    }

    /// Textual description of the surface for assistive technology.
    pub fn description(&self) -> String {
        let behavior = if self.reduced_motion {
            "displays a static portrait"
        } else {
            "animates from random characters to form a portrait"
        };
        format!(
            "{}. This is an ASCII art representation that {behavior}.",
            self.config.accessibility_label
        )
    }

    /// Snapshot of the running animation, or `None` when not animating.
    pub fn animation_state(&self, now: Duration) -> Option<AnimationState> {
        let RunState::Running { started_at } = self.state else {
            return None;
        };
        let elapsed = now.saturating_sub(started_at);
        let (phase, progress) = match self.timeline.cursor_at(elapsed) {
            Cursor::Active { phase, progress } => (phase.index(), progress),
            Cursor::Complete => (5, 1.0),
        };
        Some(AnimationState {
            phase,
            progress,
            is_animating: true,
            started_at,
            frame_count: self.renderer.as_ref().map_or(0, CellRenderer::frame_count),
        })
    }

    /// Begin a run at clock reading `now`.
    ///
    /// No-op while already animating, in fallback mode, while hidden, or when
    /// reduced motion is active (the static path takes over on the next
    /// tick).
    pub fn start(&mut self, now: Duration) -> GlyphformResult<()> {
        if self.is_animating() || self.renderer.is_none() || !self.visible || self.reduced_motion {
            return Ok(());
        }
        self.begin_run(now)
    }

    /// Stop the animation and cancel any pending restart. Idempotent: safe to
    /// call when already stopped.
    ///
    /// A stopped engine stays stopped across ticks even with `auto_start`;
    /// only an explicit [`Engine::start`] re-arms it.
    pub fn stop(&mut self) {
        if self.state != RunState::Done {
            debug!("animation stopped");
        }
        self.state = RunState::Done;
        self.last_paint = None;
    }

    /// Viewport visibility transition. Hiding pauses the run without
    /// discarding state; re-entering resumes from elapsed wall-clock time.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            debug!(visible, "visibility changed");
        }
        self.visible = visible;
    }

    /// Reduced-motion preference transition (mount-time value or a live
    /// media-query change). When set, the animated path is skipped entirely;
    /// lifting the preference re-arms the engine so `auto_start` (or an
    /// explicit [`Engine::start`]) can begin a fresh run.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        if self.reduced_motion == reduced {
            return;
        }
        debug!(reduced, "reduced motion changed");
        self.reduced_motion = reduced;
        if !reduced {
            self.static_painted = false;
            if self.renderer.is_some() {
                self.state = RunState::Idle;
            }
        }
    }

    /// Apply new dimensions: a full reset, not a patch.
    ///
    /// The target and random grids are rebuilt completely before the old ones
    /// are swapped out, so a frame never observes a partially rebuilt grid.
    /// Any running animation and pending restart are cancelled.
    pub fn set_dimensions(&mut self, dims: Dimensions) -> GlyphformResult<()> {
        if let Some(source) = &self.source {
            let target = sample_target(source, dims.width, dims.height)?;
            let renderer = CellRenderer::new(target, self.config.seed)?;
            self.renderer = Some(renderer);
        }
        debug!(
            width = dims.width,
            height = dims.height,
            font_size = dims.font_size,
            "dimensions rebuilt"
        );
        self.dims = dims;
        self.state = if self.renderer.is_some() {
            RunState::Idle
        } else {
            RunState::Done
        };
        self.static_painted = false;
        self.fallback_painted = false;
        self.last_paint = None;
        Ok(())
    }

    /// Recompute responsive dimensions for a container width and apply them
    /// when they changed. No-op when `responsive` is disabled.
    pub fn observe_container_width(&mut self, container_width: u32) -> GlyphformResult<()> {
        if !self.config.responsive {
            return Ok(());
        }
        let dims = self.config.dimensions.responsive(container_width);
        if dims != self.dims {
            self.set_dimensions(dims)?;
        }
        Ok(())
    }

    /// Advance the animation to clock reading `now` and paint when due.
    ///
    /// `now` must be non-decreasing across calls within one engine's life.
    pub fn tick(
        &mut self,
        now: Duration,
        painter: &mut dyn Painter,
    ) -> GlyphformResult<TickOutcome> {
        // Fallback mode: static placeholder, painted once.
        if self.renderer.is_none() {
            if self.fallback_painted {
                return Ok(TickOutcome::Idle);
            }
            painter.paint_fallback(&self.dims)?;
            self.fallback_painted = true;
            return Ok(TickOutcome::Painted);
        }

        // Reduced motion: write current = target once, paint a single static
        // frame, and never request another.
        if self.reduced_motion {
            if self.static_painted {
                return Ok(TickOutcome::Idle);
            }
            let renderer = self.renderer.as_mut().ok_or_else(Self::missing_renderer)?;
            renderer.force_target();
            painter.paint(renderer.current(), &self.dims)?;
            self.static_painted = true;
            self.state = RunState::Done;
            return Ok(TickOutcome::Static);
        }

        if !self.visible {
            return Ok(TickOutcome::Paused);
        }

        let started_at = match self.state {
            RunState::Running { started_at } => started_at,
            RunState::Idle => {
                if !self.config.auto_start {
                    return Ok(TickOutcome::Idle);
                }
                self.begin_run(now)?;
                now
            }
            RunState::CoolingDown { restart_at } => {
                if now < restart_at {
                    return Ok(TickOutcome::Idle);
                }
                self.begin_run(now)?;
                now
            }
            RunState::Done => return Ok(TickOutcome::Idle),
        };

        // Frame-rate governing: early frames are dropped, never queued.
        if let Some(last) = self.last_paint
            && now.saturating_sub(last) < self.config.performance_mode.frame_interval()
        {
            return Ok(TickOutcome::Throttled);
        }

        let elapsed = now.saturating_sub(started_at);
        match self.timeline.cursor_at(elapsed) {
            Cursor::Active { phase, progress } => {
                let renderer = self.renderer.as_mut().ok_or_else(Self::missing_renderer)?;
                renderer.apply(phase, progress)?;
                painter.paint(renderer.current(), &self.dims)?;
                self.last_paint = Some(now);
                Ok(TickOutcome::Painted)
            }
            Cursor::Complete => self.finish(now, painter),
        }
    }

    fn begin_run(&mut self, now: Duration) -> GlyphformResult<()> {
        let renderer = self.renderer.as_mut().ok_or_else(Self::missing_renderer)?;
        renderer.reset()?;
        self.state = RunState::Running { started_at: now };
        self.last_paint = None;
        debug!(at_ms = now.as_millis() as u64, "animation started");
        Ok(())
    }

    /// End-of-cycle: exact final frame, completion callback, then either a
    /// cool-down restart or rest.
    fn finish(
        &mut self,
        now: Duration,
        painter: &mut dyn Painter,
    ) -> GlyphformResult<TickOutcome> {
        let renderer = self.renderer.as_mut().ok_or_else(Self::missing_renderer)?;
        renderer.force_target();
        painter.paint(renderer.current(), &self.dims)?;
        self.last_paint = Some(now);

        if let Some(cb) = self.on_complete.as_mut() {
            cb();
        }

        if self.config.looping && !self.reduced_motion && self.visible {
            let restart_at = now + RESTART_COOLDOWN;
            self.state = RunState::CoolingDown { restart_at };
            debug!(
                restart_at_ms = restart_at.as_millis() as u64,
                "cycle complete, restart scheduled"
            );
        } else {
            self.state = RunState::Done;
            debug!("cycle complete");
        }
        Ok(TickOutcome::Completed)
    }

    fn missing_renderer() -> GlyphformError {
        GlyphformError::animation("engine has no renderer (fallback mode)")
    }
}
