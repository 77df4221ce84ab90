//! # Frame Clock
//!
//! Two time bases advance once per frame:
//!
//! ```text
//! real   += raw delta                       (wall clock, never scaled)
//! scaled += min(raw delta, max_delta) * time_scale
//! ```
//!
//! Both values are sampled ONCE per frame by [`FrameClock::advance`], so every
//! system that reads the clock during a frame sees the same instant.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default clamp applied to a single frame's scaled delta.
///
/// Prevents simulation explosions after a debugger pause or window drag.
pub const DEFAULT_MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

/// Which clock a time-based task follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeBase {
    /// Wall-clock time, unaffected by pause or slow motion.
    Real,
    /// Game time: clamped per frame and multiplied by the time scale.
    #[default]
    Scaled,
}

/// Monotonic source of "now", measured from an arbitrary origin.
pub trait TimeSource {
    /// Returns the elapsed time since the source's origin.
    fn now(&self) -> Duration;
}

/// Time source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    /// Creates a source whose origin is the moment of construction.
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven time source for simulations and tests.
///
/// Clones share the same underlying instant.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    nanos: Arc<AtomicU64>,
}

impl ManualTimeSource {
    /// Creates a source starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward.
    pub fn advance(&self, delta: Duration) {
        self.nanos.fetch_add(duration_to_nanos(delta), Ordering::AcqRel);
    }

    /// Jumps to an absolute instant.
    pub fn set(&self, now: Duration) {
        self.nanos.store(duration_to_nanos(now), Ordering::Release);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }
}

fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

struct ClockState {
    source: Box<dyn TimeSource>,
    /// Raw source reading at the last advance.
    last_sample: Cell<Duration>,
    real: Cell<Duration>,
    scaled: Cell<Duration>,
    real_delta: Cell<Duration>,
    scaled_delta: Cell<Duration>,
    time_scale: Cell<f64>,
    max_delta: Cell<Duration>,
    frame: Cell<u64>,
}

/// Per-frame clock shared by the scheduler, the node tree and the frame loop.
///
/// Cheap to clone; all clones observe the same state. The clock belongs to
/// the main timeline and is deliberately `!Send`.
#[derive(Clone)]
pub struct FrameClock {
    state: Rc<ClockState>,
}

impl FrameClock {
    /// Creates a clock reading from `source`, starting at the source's current
    /// instant.
    #[must_use]
    pub fn new(source: impl TimeSource + 'static) -> Self {
        let start = source.now();
        Self {
            state: Rc::new(ClockState {
                source: Box::new(source),
                last_sample: Cell::new(start),
                real: Cell::new(Duration::ZERO),
                scaled: Cell::new(Duration::ZERO),
                real_delta: Cell::new(Duration::ZERO),
                scaled_delta: Cell::new(Duration::ZERO),
                time_scale: Cell::new(1.0),
                max_delta: Cell::new(DEFAULT_MAX_FRAME_DELTA),
                frame: Cell::new(0),
            }),
        }
    }

    /// Creates a clock driven by the system monotonic clock.
    #[must_use]
    pub fn system() -> Self {
        Self::new(SystemTimeSource::new())
    }

    /// Samples the time source and advances both time bases.
    ///
    /// Call exactly once at the start of every frame.
    pub fn advance(&self) {
        let state = &self.state;
        let sample = state.source.now();
        let raw = sample.saturating_sub(state.last_sample.get());
        state.last_sample.set(sample);

        let clamped = raw.min(state.max_delta.get());
        let scaled = clamped.mul_f64(state.time_scale.get());

        state.real.set(state.real.get() + raw);
        state.scaled.set(state.scaled.get() + scaled);
        state.real_delta.set(raw);
        state.scaled_delta.set(scaled);
        state.frame.set(state.frame.get() + 1);
    }

    /// Current time on the requested base.
    #[inline]
    #[must_use]
    pub fn now(&self, base: TimeBase) -> Duration {
        match base {
            TimeBase::Real => self.state.real.get(),
            TimeBase::Scaled => self.state.scaled.get(),
        }
    }

    /// Last frame's delta on the requested base.
    #[inline]
    #[must_use]
    pub fn delta(&self, base: TimeBase) -> Duration {
        match base {
            TimeBase::Real => self.state.real_delta.get(),
            TimeBase::Scaled => self.state.scaled_delta.get(),
        }
    }

    /// Last frame's scaled delta in seconds.
    #[inline]
    #[must_use]
    pub fn delta_seconds(&self) -> f32 {
        self.state.scaled_delta.get().as_secs_f32()
    }

    /// Number of completed [`advance`](Self::advance) calls.
    #[inline]
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.state.frame.get()
    }

    /// Current time scale.
    #[must_use]
    pub fn time_scale(&self) -> f64 {
        self.state.time_scale.get()
    }

    /// Sets the time scale. Negative or non-finite values pause scaled time.
    pub fn set_time_scale(&self, scale: f64) {
        let scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
        self.state.time_scale.set(scale);
    }

    /// Sets the per-frame clamp applied before scaling.
    pub fn set_max_delta(&self, max_delta: Duration) {
        self.state.max_delta.set(max_delta);
    }
}

impl std::fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameClock")
            .field("frame", &self.frame())
            .field("real", &self.now(TimeBase::Real))
            .field("scaled", &self.now(TimeBase::Scaled))
            .field("time_scale", &self.time_scale())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances_both_bases() {
        let source = ManualTimeSource::new();
        let clock = FrameClock::new(source.clone());

        source.advance(Duration::from_millis(16));
        clock.advance();

        assert_eq!(clock.frame(), 1);
        assert_eq!(clock.now(TimeBase::Real), Duration::from_millis(16));
        assert_eq!(clock.now(TimeBase::Scaled), Duration::from_millis(16));
    }

    #[test]
    fn test_time_scale_only_affects_scaled() {
        let source = ManualTimeSource::new();
        let clock = FrameClock::new(source.clone());
        clock.set_time_scale(0.5);

        source.advance(Duration::from_millis(20));
        clock.advance();

        assert_eq!(clock.now(TimeBase::Real), Duration::from_millis(20));
        assert_eq!(clock.now(TimeBase::Scaled), Duration::from_millis(10));
    }

    #[test]
    fn test_stall_is_clamped_on_scaled_base() {
        let source = ManualTimeSource::new();
        let clock = FrameClock::new(source.clone());

        source.advance(Duration::from_secs(5));
        clock.advance();

        assert_eq!(clock.now(TimeBase::Real), Duration::from_secs(5));
        assert_eq!(clock.now(TimeBase::Scaled), DEFAULT_MAX_FRAME_DELTA);
    }

    #[test]
    fn test_reading_is_stable_within_a_frame() {
        let source = ManualTimeSource::new();
        let clock = FrameClock::new(source.clone());
        source.advance(Duration::from_millis(10));
        clock.advance();

        source.advance(Duration::from_millis(500));
        // Not advanced yet: the frame's sample is unchanged.
        assert_eq!(clock.now(TimeBase::Real), Duration::from_millis(10));
    }
}
