//! # Step-wise Execution
//!
//! A coroutine here is an explicit state machine: every call to
//! [`Coroutine::resume`] runs one step to completion on the timeline and
//! either finishes or names the [`Condition`] that must hold before the next
//! step. The scheduler turns each yielded condition into a fresh one-shot
//! task, so a chain of steps is a chain of tasks:
//!
//! ```text
//! spawn ──▶ [next frame] step 1 ──yield(c1)──▶ [c1] step 2 ──yield(c2)──▶ [c2] step 3 ──▶ Complete(v)
//! ```
//!
//! No threads, no stacks: suspension is just "the condition for the next
//! call".

use std::marker::PhantomData;
use std::time::Duration;

use crate::error::TaskResult;
use crate::time::{FrameClock, TimeBase};

/// Readiness predicate gating a one-shot task or the next coroutine step.
pub struct Condition {
    check: Box<dyn FnMut() -> bool>,
}

impl Condition {
    /// Ready whenever `check` returns true.
    #[must_use]
    pub fn when(check: impl FnMut() -> bool + 'static) -> Self {
        Self {
            check: Box::new(check),
        }
    }

    /// Always ready.
    ///
    /// Tasks registered during a frame never run in that same frame, so this
    /// means "on the next frame".
    #[must_use]
    pub fn next_frame() -> Self {
        Self::when(|| true)
    }

    /// Ready once `delay` has elapsed on `base`, measured from now.
    #[must_use]
    pub fn after(clock: &FrameClock, base: TimeBase, delay: Duration) -> Self {
        let deadline = clock.now(base) + delay;
        let clock = clock.clone();
        Self::when(move || clock.now(base) >= deadline)
    }

    /// Ready once `count` more frames have started.
    #[must_use]
    pub fn frames(clock: &FrameClock, count: u64) -> Self {
        let target = clock.frame() + count;
        let clock = clock.clone();
        Self::when(move || clock.frame() >= target)
    }

    /// Evaluates the predicate.
    pub fn is_met(&mut self) -> bool {
        (self.check)()
    }
}

impl std::fmt::Debug for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Condition").finish_non_exhaustive()
    }
}

/// What a coroutine step produced.
#[derive(Debug)]
pub enum Step<T> {
    /// Suspend until the condition holds, then resume.
    Yield(Condition),
    /// Finished; the value completes the coroutine's handle.
    Complete(T),
}

/// A resumable multi-step job driven by the scheduler.
pub trait Coroutine {
    /// Final value of the chain.
    type Output;

    /// Runs the next step.
    ///
    /// # Errors
    ///
    /// A failure ends the chain and fails the coroutine's handle.
    fn resume(&mut self) -> TaskResult<Step<Self::Output>>;
}

/// Adapts a closure into a [`Coroutine`]; the closure keeps its own resume
/// point in captured state.
pub struct StepFn<F, T> {
    step: F,
    _output: PhantomData<fn() -> T>,
}

impl<F, T> StepFn<F, T>
where
    F: FnMut() -> TaskResult<Step<T>>,
{
    /// Wraps `step`.
    #[must_use]
    pub fn new(step: F) -> Self {
        Self {
            step,
            _output: PhantomData,
        }
    }
}

impl<F, T> Coroutine for StepFn<F, T>
where
    F: FnMut() -> TaskResult<Step<T>>,
{
    type Output = T;

    fn resume(&mut self) -> TaskResult<Step<T>> {
        (self.step)()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualTimeSource;

    #[test]
    fn test_after_condition_waits_for_clock() {
        let source = ManualTimeSource::new();
        let clock = FrameClock::new(source.clone());
        let mut condition = Condition::after(&clock, TimeBase::Real, Duration::from_millis(50));

        assert!(!condition.is_met());
        source.advance(Duration::from_millis(50));
        assert!(!condition.is_met()); // clock not advanced yet
        clock.advance();
        assert!(condition.is_met());
    }

    #[test]
    fn test_frames_condition() {
        let clock = FrameClock::new(ManualTimeSource::new());
        let mut condition = Condition::frames(&clock, 2);
        clock.advance();
        assert!(!condition.is_met());
        clock.advance();
        assert!(condition.is_met());
    }

    #[test]
    fn test_step_fn_keeps_state() {
        let mut calls = 0;
        let mut co = StepFn::new(move || {
            calls += 1;
            if calls < 3 {
                Ok(Step::Yield(Condition::next_frame()))
            } else {
                Ok(Step::Complete(calls))
            }
        });

        assert!(matches!(co.resume(), Ok(Step::Yield(_))));
        assert!(matches!(co.resume(), Ok(Step::Yield(_))));
        assert!(matches!(co.resume(), Ok(Step::Complete(3))));
    }
}
