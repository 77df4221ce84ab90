//! # LUMEN Frame Loop
//!
//! ```text
//! Frame N:
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ 1. CLOCK         advance real + scaled time                     │
//! │ 2. EARLY TICK    frame counter + one-shot tasks                 │
//! │ 3. TREE UPDATE   node hooks parents-first, then interaction     │
//! │ 4. PHYSICS       external step (scaled dt)                      │
//! │ 5. LATE TICK     repeating tasks, then one-shot tasks again     │
//! │ 6. PREPARE       fill the pooled draw list                      │
//! └─────────────────────────────────────────────────────────────────┘
//!          consume() runs whenever the display wants a frame,
//!          on this thread or another one (see FrameConsumer).
//! ```

use std::time::{Duration, Instant};

use lumen_core::{FrameClock, Scheduler, Size, TimeBase, TimeSource};
use lumen_rendering::{Camera, FrameConsumer, RenderStats};
use lumen_ui::{InputState, NodeTree};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::physics::PhysicsStep;

/// Handles user code needs to schedule work on the timeline.
///
/// Cheap to clone. Hand it to whatever needs the clock or the scheduler
/// instead of reaching for a global.
#[derive(Debug, Clone)]
pub struct EngineContext {
    clock: FrameClock,
    scheduler: Scheduler,
}

impl EngineContext {
    /// Frame clock.
    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Task scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Current time on `base`.
    #[must_use]
    pub fn now(&self, base: TimeBase) -> Duration {
        self.clock.now(base)
    }

    /// Frames started so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }
}

/// Timing of one frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Scaled delta handed to the tree and physics, in seconds.
    pub delta_time: f32,
    /// Whole frame in microseconds.
    pub total_us: u64,
    /// Early scheduler pass.
    pub early_us: u64,
    /// Node tree update.
    pub update_us: u64,
    /// Physics step.
    pub physics_us: u64,
    /// Late scheduler pass.
    pub late_us: u64,
    /// Render prepare.
    pub prepare_us: u64,
    /// One-shot tasks still pending after the frame.
    pub pending_tasks: usize,
    /// What prepare produced.
    pub render: RenderStats,
}

/// Scheduler, node tree and camera driven in lockstep.
pub struct Engine {
    config: EngineConfig,
    context: EngineContext,
    tree: NodeTree,
    camera: Camera,
    stats: FrameStatsAccumulator,
}

impl Engine {
    /// Builds an engine reading time from `time_source`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`](crate::EngineError::Config) if the
    /// config fails validation.
    pub fn init(config: EngineConfig, time_source: impl TimeSource + 'static) -> EngineResult<Self> {
        config.validate()?;

        let clock = FrameClock::new(time_source);
        clock.set_time_scale(config.time_scale);
        clock.set_max_delta(config.max_frame_delta());
        let scheduler = Scheduler::new(clock.clone());

        let viewport: Size = config.viewport.into();
        let tree = NodeTree::new(viewport);
        let camera = Camera::new(viewport, config.draw_pool_capacity);
        camera.set_background(config.background);

        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            target_fps = config.target_fps,
            "engine initialized"
        );

        Ok(Self {
            config,
            context: EngineContext { clock, scheduler },
            tree,
            camera,
            stats: FrameStatsAccumulator::new(),
        })
    }

    /// Runs one frame.
    pub fn frame(&mut self, input: &InputState, physics: &mut dyn PhysicsStep) -> FrameStats {
        let start = Instant::now();
        let clock = &self.context.clock;
        let scheduler = &self.context.scheduler;

        clock.advance();
        let delta_time = clock.delta_seconds();

        let mark = Instant::now();
        scheduler.tick_early();
        let early_us = elapsed_us(mark);

        let mark = Instant::now();
        self.tree.update(input, delta_time);
        let update_us = elapsed_us(mark);

        let mark = Instant::now();
        physics.step(delta_time);
        let physics_us = elapsed_us(mark);

        let mark = Instant::now();
        scheduler.tick_late();
        let late_us = elapsed_us(mark);

        let mark = Instant::now();
        let render = self.camera.prepare(&mut self.tree, physics.world());
        let prepare_us = elapsed_us(mark);

        let stats = FrameStats {
            frame: clock.frame(),
            delta_time,
            total_us: elapsed_us(start),
            early_us,
            update_us,
            physics_us,
            late_us,
            prepare_us,
            pending_tasks: scheduler.pending_count(),
            render,
        };
        self.end_frame(stats);
        stats
    }

    fn end_frame(&mut self, stats: FrameStats) {
        let budget_us = duration_us(self.config.frame_budget());
        self.stats.record(stats, budget_us);

        if self.config.enable_timing_logs && stats.total_us > budget_us {
            #[allow(clippy::cast_precision_loss)]
            let (took_ms, budget_ms) = (stats.total_us as f64 / 1000.0, budget_us as f64 / 1000.0);
            tracing::warn!(frame = stats.frame, took_ms, budget_ms, "frame exceeded budget");
        }
        tracing::trace!(
            frame = stats.frame,
            total_us = stats.total_us,
            entries = stats.render.entries,
            "frame done"
        );
    }

    /// Consumer handle for the display side.
    #[must_use]
    pub fn consumer(&self) -> FrameConsumer {
        self.camera.consumer()
    }

    /// Cancels every task, tears the tree down to its root (structure
    /// locks do not apply) and returns the draw list to the pool.
    pub fn reset(&mut self) {
        self.context.scheduler.clear();
        self.tree.reset();
        self.camera.clear();
        self.stats = FrameStatsAccumulator::new();
        tracing::debug!("engine reset");
    }

    /// Resizes the tree and camera viewport.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.tree.set_viewport(viewport);
        self.camera.set_viewport(viewport);
    }

    /// Clock and scheduler handles.
    #[must_use]
    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Task scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.context.scheduler
    }

    /// Frame clock.
    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.context.clock
    }

    /// Node tree.
    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    /// Mutable node tree.
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    /// Camera.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Accumulated frame statistics.
    #[must_use]
    pub fn stats(&self) -> &FrameStatsAccumulator {
        &self.stats
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("frame", &self.context.frame())
            .field("nodes", &self.tree.len())
            .field("pending_tasks", &self.context.scheduler.pending_count())
            .field("draw_entries", &self.camera.len())
            .finish_non_exhaustive()
    }
}

fn elapsed_us(since: Instant) -> u64 {
    duration_us(since.elapsed())
}

fn duration_us(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Running totals over recorded frames.
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total frame times.
    pub total_us_sum: u64,
    /// Sum of tree update times.
    pub update_us_sum: u64,
    /// Sum of scheduler pass times (early + late).
    pub scheduler_us_sum: u64,
    /// Sum of prepare times.
    pub prepare_us_sum: u64,
    /// Min frame time.
    pub min_frame_us: u64,
    /// Max frame time.
    pub max_frame_us: u64,
    /// Frames that exceeded budget.
    pub frames_over_budget: u64,
}

impl FrameStatsAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            update_us_sum: 0,
            scheduler_us_sum: 0,
            prepare_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
        }
    }

    /// Records a frame against a budget in microseconds.
    pub fn record(&mut self, stats: FrameStats, budget_us: u64) {
        self.frames_recorded += 1;
        self.total_us_sum = self.total_us_sum.saturating_add(stats.total_us);
        self.update_us_sum = self.update_us_sum.saturating_add(stats.update_us);
        self.scheduler_us_sum = self
            .scheduler_us_sum
            .saturating_add(stats.early_us + stats.late_us);
        self.prepare_us_sum = self.prepare_us_sum.saturating_add(stats.prepare_us);
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);

        if stats.total_us > budget_us {
            self.frames_over_budget += 1;
        }
    }

    /// Average frame time in milliseconds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_frame_ms(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (self.total_us_sum as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Average FPS.
    #[must_use]
    pub fn avg_fps(&self) -> f64 {
        let avg_ms = self.avg_frame_ms();
        if avg_ms <= 0.0 {
            return 0.0;
        }
        1000.0 / avg_ms
    }

    /// Fraction of frames over budget.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use lumen_core::ManualTimeSource;
    use lumen_ui::Panel;

    use super::*;
    use crate::physics::NoPhysics;

    fn engine() -> (Engine, ManualTimeSource) {
        let source = ManualTimeSource::new();
        let engine = Engine::init(EngineConfig::default(), source.clone()).unwrap();
        (engine, source)
    }

    #[test]
    fn test_init_rejects_invalid_config() {
        let config = EngineConfig {
            target_fps: 0,
            ..EngineConfig::default()
        };
        assert!(Engine::init(config, ManualTimeSource::new()).is_err());
    }

    #[test]
    fn test_frame_advances_clock_and_scheduler() {
        let (mut engine, source) = engine();
        source.advance(Duration::from_millis(16));

        let stats = engine.frame(&InputState::new(), &mut NoPhysics);
        assert_eq!(stats.frame, 1);
        assert_eq!(engine.scheduler().frame(), 1);
        assert!((stats.delta_time - 0.016).abs() < 1e-6);
        assert!(stats.render.placeholder);
    }

    #[test]
    fn test_task_from_context_runs_next_frame() {
        let (mut engine, _source) = engine();
        let ran = Rc::new(Cell::new(0u64));
        let context = engine.context().clone();

        let seen = Rc::clone(&ran);
        let task_context = context.clone();
        let handle = context.scheduler().schedule_next_frame(move || {
            seen.set(task_context.frame());
            Ok(())
        });

        engine.frame(&InputState::new(), &mut NoPhysics);
        assert!(handle.is_finished());
        assert_eq!(ran.get(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut engine, _source) = engine();
        let root = engine.tree().root();
        let panel = engine.tree_mut().add_child(root, Panel::new(Size::new(4.0, 4.0))).unwrap();
        engine.tree_mut().lock_structure(panel).unwrap();
        let handle = engine.scheduler().schedule(|| Ok(()), || false);
        engine.frame(&InputState::new(), &mut NoPhysics);
        assert!(!engine.camera().is_empty());

        engine.reset();
        assert!(handle.is_cancelled());
        assert_eq!(engine.tree().len(), 1);
        assert!(engine.camera().is_empty());
        assert_eq!(engine.stats().frames_recorded, 0);
    }

    #[test]
    fn test_accumulator() {
        let mut acc = FrameStatsAccumulator::new();
        for i in 0..100 {
            acc.record(
                FrameStats {
                    total_us: 10_000 + i * 100,
                    ..FrameStats::default()
                },
                16_666,
            );
        }

        assert_eq!(acc.frames_recorded, 100);
        assert_eq!(acc.min_frame_us, 10_000);
        assert_eq!(acc.max_frame_us, 19_900);
        assert_eq!(acc.frames_over_budget, 33);
        assert!(acc.avg_fps() > 50.0 && acc.avg_fps() < 100.0);
    }
}
