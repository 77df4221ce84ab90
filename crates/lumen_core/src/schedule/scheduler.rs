//! # Task Scheduler
//!
//! Deferred, conditional, repeating and step-wise work for the main timeline.
//!
//! ```text
//! Frame N:
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ tick_early   one-shot tasks registered before this pass          │
//! │ node update                                                      │
//! │ physics                                                          │
//! │ tick_late    repeating tasks, then one-shots still pending       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A one-shot task registered while a sweep is running (from a producer, a
//! coroutine step or a repeating action) only becomes eligible in frame N + 1.
//! One registered between the passes (node update, physics) is picked up by
//! `tick_late` of the same frame. Nothing is ever evaluated synchronously at
//! registration.
//!
//! Each sweep iterates a snapshot of the pending set kept in a reused scratch
//! buffer. Entries carry a `retired` flag so an entry removed mid-sweep is
//! never run from the stale snapshot; retired entries leave the live set in
//! one pass when the sweep ends.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::{trace, warn};

use super::coroutine::{Condition, Coroutine, Step};
use super::handle::{RepeatHandle, Slot, TaskHandle};
use crate::error::{TaskError, TaskResult};
use crate::time::{FrameClock, TimeBase};

/// Type-erased one-shot work.
trait OneShotJob {
    fn is_cancelled(&self) -> bool;
    fn is_ready(&mut self) -> bool;
    fn cancel(&self);
    fn run(self: Box<Self>);
}

struct OneShotEntry {
    /// First frame whose sweeps may evaluate the task.
    eligible_from: u64,
    retired: Cell<bool>,
    job: RefCell<Option<Box<dyn OneShotJob>>>,
}

struct RepeatEntry {
    stopped: Rc<Cell<bool>>,
    job: RefCell<RepeatJob>,
}

struct Inner {
    clock: FrameClock,
    one_shots: RefCell<Vec<Rc<OneShotEntry>>>,
    repeating: RefCell<Vec<Rc<RepeatEntry>>>,
    one_shot_scratch: RefCell<Vec<Rc<OneShotEntry>>>,
    repeat_scratch: RefCell<Vec<Rc<RepeatEntry>>>,
    frame: Cell<u64>,
    /// True while a sweep is evaluating tasks.
    sweeping: Cell<bool>,
}

/// The deferred-task scheduler of one timeline.
///
/// Cheap to clone: clones share the same pending sets, which lets producers
/// and coroutine steps capture a handle and schedule follow-up work. The
/// scheduler is `!Send`; all of its work runs on the thread that owns it.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<Inner>,
}

impl Scheduler {
    /// Creates a scheduler reading time from `clock`.
    #[must_use]
    pub fn new(clock: FrameClock) -> Self {
        Self {
            inner: Rc::new(Inner {
                clock,
                one_shots: RefCell::new(Vec::with_capacity(64)),
                repeating: RefCell::new(Vec::with_capacity(16)),
                one_shot_scratch: RefCell::new(Vec::with_capacity(64)),
                repeat_scratch: RefCell::new(Vec::with_capacity(16)),
                frame: Cell::new(0),
                sweeping: Cell::new(false),
            }),
        }
    }

    /// The clock shared with this scheduler.
    #[must_use]
    pub fn clock(&self) -> &FrameClock {
        &self.inner.clock
    }

    /// Number of frames started by [`tick_early`](Self::tick_early).
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.inner.frame.get()
    }

    /// Number of one-shot tasks (including coroutine steps) still pending.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner
            .one_shots
            .borrow()
            .iter()
            .filter(|entry| !entry.retired.get())
            .count()
    }

    /// Number of live repeating tasks.
    #[must_use]
    pub fn repeating_count(&self) -> usize {
        self.inner
            .repeating
            .borrow()
            .iter()
            .filter(|entry| !entry.stopped.get())
            .count()
    }

    /// Registers a one-shot task: once `ready` returns true, `producer` runs
    /// and its result completes the returned handle.
    ///
    /// Never evaluated synchronously, even if `ready` already holds.
    pub fn schedule<T, F, P>(&self, producer: F, ready: P) -> TaskHandle<T>
    where
        T: 'static,
        F: FnOnce() -> TaskResult<T> + 'static,
        P: FnMut() -> bool + 'static,
    {
        let slot = Slot::new();
        let handle = TaskHandle::new(Rc::clone(&slot));
        self.push_one_shot(Box::new(ProducerJob {
            producer,
            ready,
            slot,
        }));
        handle
    }

    /// Registers a one-shot task gated on `condition`.
    pub fn schedule_when<T, F>(&self, condition: Condition, producer: F) -> TaskHandle<T>
    where
        T: 'static,
        F: FnOnce() -> TaskResult<T> + 'static,
    {
        let mut condition = condition;
        self.schedule(producer, move || condition.is_met())
    }

    /// Runs `producer` on the next pass that may take it: the late pass when
    /// registered between the passes, otherwise the next early pass.
    pub fn schedule_next_frame<T, F>(&self, producer: F) -> TaskHandle<T>
    where
        T: 'static,
        F: FnOnce() -> TaskResult<T> + 'static,
    {
        self.schedule(producer, || true)
    }

    /// Runs `producer` once `delay` has elapsed on `base`.
    pub fn schedule_after<T, F>(&self, delay: Duration, base: TimeBase, producer: F) -> TaskHandle<T>
    where
        T: 'static,
        F: FnOnce() -> TaskResult<T> + 'static,
    {
        let condition = Condition::after(&self.inner.clock, base, delay);
        self.schedule_when(condition, producer)
    }

    /// Registers a repeating task.
    ///
    /// The first firing is due `initial_delay` after registration on `base`;
    /// the cursor then advances by `interval` per firing. `action` returning
    /// `Ok(false)` stops the task; an `Err` is logged and also stops it.
    /// After a stall the task fires once and the cursor restarts from the
    /// current time, so missed firings are dropped, not queued.
    pub fn schedule_repeating<F>(
        &self,
        action: F,
        interval: Duration,
        initial_delay: Duration,
        base: TimeBase,
    ) -> RepeatHandle
    where
        F: FnMut() -> TaskResult<bool> + 'static,
    {
        let stopped = Rc::new(Cell::new(false));
        let entry = Rc::new(RepeatEntry {
            stopped: Rc::clone(&stopped),
            job: RefCell::new(RepeatJob {
                action: Box::new(action),
                interval,
                first_fire: self.inner.clock.now(base) + initial_delay,
                cursor: None,
                base,
            }),
        });
        self.inner.repeating.borrow_mut().push(entry);
        RepeatHandle::new(stopped)
    }

    /// Starts a coroutine; its first step runs on the next frame.
    ///
    /// Every yielded [`Condition`] becomes a new one-shot task that resumes
    /// the coroutine once the condition holds. Cancelling the handle stops
    /// the chain before its next step.
    pub fn spawn<C>(&self, coroutine: C) -> TaskHandle<C::Output>
    where
        C: Coroutine + 'static,
        C::Output: 'static,
    {
        let slot = Slot::new();
        let handle = TaskHandle::new(Rc::clone(&slot));
        self.push_step(coroutine, Condition::next_frame(), slot);
        handle
    }

    /// Early pass: starts a new frame and evaluates pending one-shot tasks.
    pub fn tick_early(&self) {
        let frame = self.inner.frame.get() + 1;
        self.inner.frame.set(frame);
        trace!(frame, pending = self.pending_count(), "scheduler early pass");
        self.sweep_one_shots();
    }

    /// Late pass: evaluates repeating tasks, then one-shot tasks still pending.
    ///
    /// Covers tasks registered between the two passes, but not those
    /// registered while the early pass was sweeping.
    pub fn tick_late(&self) {
        trace!(frame = self.frame(), repeating = self.repeating_count(), "scheduler late pass");
        self.sweep_repeating();
        self.sweep_one_shots();
    }

    /// Cancels every pending task and stops every repeating task.
    pub fn clear(&self) {
        let one_shots = std::mem::take(&mut *self.inner.one_shots.borrow_mut());
        for entry in one_shots {
            entry.retired.set(true);
            if let Ok(mut job) = entry.job.try_borrow_mut() {
                if let Some(job) = job.take() {
                    job.cancel();
                }
            }
        }

        let repeating = std::mem::take(&mut *self.inner.repeating.borrow_mut());
        for entry in repeating {
            entry.stopped.set(true);
        }
    }

    fn push_one_shot(&self, job: Box<dyn OneShotJob>) {
        let eligible_from = if self.inner.sweeping.get() {
            self.inner.frame.get() + 1
        } else {
            0
        };
        let entry = Rc::new(OneShotEntry {
            eligible_from,
            retired: Cell::new(false),
            job: RefCell::new(Some(job)),
        });
        self.inner.one_shots.borrow_mut().push(entry);
    }

    fn push_step<C>(&self, coroutine: C, condition: Condition, slot: Rc<Slot<C::Output>>)
    where
        C: Coroutine + 'static,
        C::Output: 'static,
    {
        self.push_one_shot(Box::new(StepJob {
            coroutine,
            condition,
            slot,
            scheduler: Rc::downgrade(&self.inner),
        }));
    }

    fn sweep_one_shots(&self) {
        let frame = self.inner.frame.get();
        // A sweep started from inside a task gets a fresh buffer.
        let mut snapshot = std::mem::take(&mut *self.inner.one_shot_scratch.borrow_mut());
        snapshot.extend(self.inner.one_shots.borrow().iter().cloned());
        let outer = self.inner.sweeping.replace(true);

        for entry in snapshot.drain(..) {
            if entry.retired.get() || entry.eligible_from > frame {
                continue;
            }

            let job = {
                // Already borrowed: this task is being evaluated further up
                // the stack.
                let Ok(mut slot) = entry.job.try_borrow_mut() else {
                    continue;
                };
                let Some(job) = slot.as_mut() else {
                    continue;
                };
                if job.is_cancelled() {
                    slot.take();
                    None
                } else if job.is_ready() {
                    slot.take()
                } else {
                    continue;
                }
            };

            // The predicate may have cleared the scheduler.
            if entry.retired.get() {
                if let Some(job) = job {
                    job.cancel();
                }
                continue;
            }

            entry.retired.set(true);
            if let Some(job) = job {
                job.run();
            }
        }

        self.inner.sweeping.set(outer);
        self.inner.one_shots.borrow_mut().retain(|entry| !entry.retired.get());
        *self.inner.one_shot_scratch.borrow_mut() = snapshot;
    }

    fn sweep_repeating(&self) {
        let mut snapshot = std::mem::take(&mut *self.inner.repeat_scratch.borrow_mut());
        snapshot.extend(self.inner.repeating.borrow().iter().cloned());
        let outer = self.inner.sweeping.replace(true);

        for entry in snapshot.drain(..) {
            if entry.stopped.get() {
                continue;
            }
            let keep = {
                let Ok(mut job) = entry.job.try_borrow_mut() else {
                    continue;
                };
                let now = self.inner.clock.now(job.base);
                job.evaluate(now)
            };
            if !keep {
                entry.stopped.set(true);
            }
        }

        self.inner.sweeping.set(outer);
        self.inner.repeating.borrow_mut().retain(|entry| !entry.stopped.get());
        *self.inner.repeat_scratch.borrow_mut() = snapshot;
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("frame", &self.frame())
            .field("pending", &self.pending_count())
            .field("repeating", &self.repeating_count())
            .finish()
    }
}

struct ProducerJob<T, F, P> {
    producer: F,
    ready: P,
    slot: Rc<Slot<T>>,
}

impl<T, F, P> OneShotJob for ProducerJob<T, F, P>
where
    F: FnOnce() -> TaskResult<T>,
    P: FnMut() -> bool,
{
    fn is_cancelled(&self) -> bool {
        self.slot.is_cancelled()
    }

    fn is_ready(&mut self) -> bool {
        (self.ready)()
    }

    fn cancel(&self) {
        self.slot.cancel();
    }

    fn run(self: Box<Self>) {
        let ProducerJob { producer, slot, .. } = *self;
        match producer() {
            Ok(value) => slot.complete(value),
            Err(error) => {
                warn!(%error, "scheduled task failed");
                slot.fail(error);
            }
        }
    }
}

struct StepJob<C: Coroutine> {
    coroutine: C,
    condition: Condition,
    slot: Rc<Slot<C::Output>>,
    scheduler: Weak<Inner>,
}

impl<C> OneShotJob for StepJob<C>
where
    C: Coroutine + 'static,
    C::Output: 'static,
{
    fn is_cancelled(&self) -> bool {
        self.slot.is_cancelled()
    }

    fn is_ready(&mut self) -> bool {
        self.condition.is_met()
    }

    fn cancel(&self) {
        self.slot.cancel();
    }

    fn run(self: Box<Self>) {
        let StepJob {
            mut coroutine,
            slot,
            scheduler,
            ..
        } = *self;

        match coroutine.resume() {
            Ok(Step::Yield(condition)) => match scheduler.upgrade() {
                Some(inner) => Scheduler { inner }.push_step(coroutine, condition, slot),
                None => slot.fail(TaskError::failed("scheduler dropped while coroutine suspended")),
            },
            Ok(Step::Complete(value)) => slot.complete(value),
            Err(error) => {
                warn!(%error, "coroutine step failed");
                slot.fail(error);
            }
        }
    }
}

struct RepeatJob {
    action: Box<dyn FnMut() -> TaskResult<bool>>,
    interval: Duration,
    /// Registration time plus the initial delay.
    first_fire: Duration,
    /// Next due time; materialized on first evaluation.
    cursor: Option<Duration>,
    base: TimeBase,
}

impl RepeatJob {
    /// Fires if due. Returns false once the task should stop.
    fn evaluate(&mut self, now: Duration) -> bool {
        let due = *self.cursor.get_or_insert(self.first_fire);
        if now < due {
            return true;
        }

        match (self.action)() {
            Ok(true) => {
                self.cursor = Some((due + self.interval).max(now));
                true
            }
            Ok(false) => false,
            Err(error) => {
                warn!(%error, "repeating task failed, stopping it");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{StepFn, TaskStatus};
    use crate::time::ManualTimeSource;

    fn scheduler() -> (Scheduler, ManualTimeSource) {
        let source = ManualTimeSource::new();
        let clock = FrameClock::new(source.clone());
        (Scheduler::new(clock), source)
    }

    fn frame(scheduler: &Scheduler, source: &ManualTimeSource, step: Duration) {
        source.advance(step);
        scheduler.clock().advance();
        scheduler.tick_early();
        scheduler.tick_late();
    }

    #[test]
    fn test_schedule_is_never_synchronous() {
        let (scheduler, _) = scheduler();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);

        let handle = scheduler.schedule(
            move || {
                flag.set(true);
                Ok(42)
            },
            || true,
        );

        assert!(!ran.get());
        assert!(handle.is_pending());

        scheduler.tick_early();
        assert!(ran.get());
        assert_eq!(handle.take(), Some(Ok(42)));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_task_registered_during_early_waits_for_next_frame() {
        let (scheduler, _) = scheduler();
        let inner_ran = Rc::new(Cell::new(0u32));

        let spawner = scheduler.clone();
        let counter = Rc::clone(&inner_ran);
        let _outer = scheduler.schedule_next_frame(move || {
            let counter = Rc::clone(&counter);
            let _ = spawner.schedule(
                move || {
                    counter.set(counter.get() + 1);
                    Ok(())
                },
                || true,
            );
            Ok(())
        });

        scheduler.tick_early(); // outer runs, registers inner
        scheduler.tick_late();
        assert_eq!(inner_ran.get(), 0);

        scheduler.tick_early();
        assert_eq!(inner_ran.get(), 1);
    }

    #[test]
    fn test_task_registered_during_late_runs_next_early() {
        let (scheduler, _) = scheduler();
        let ran = Rc::new(Cell::new(false));

        let spawner = scheduler.clone();
        let flag = Rc::clone(&ran);
        let _repeat = scheduler.schedule_repeating(
            move || {
                let flag = Rc::clone(&flag);
                let _ = spawner.schedule_next_frame(move || {
                    flag.set(true);
                    Ok(())
                });
                Ok(false)
            },
            Duration::ZERO,
            Duration::ZERO,
            TimeBase::Real,
        );

        scheduler.tick_early();
        scheduler.tick_late(); // repeating registers the one-shot
        assert!(!ran.get());

        scheduler.tick_early();
        assert!(ran.get());
    }

    #[test]
    fn test_pending_task_is_reswept_in_late_pass() {
        let (scheduler, _) = scheduler();
        let gate = Rc::new(Cell::new(false));
        let open = Rc::clone(&gate);

        let handle = scheduler.schedule(|| Ok("done"), move || open.get());

        scheduler.tick_early();
        assert!(handle.is_pending());

        gate.set(true); // e.g. flipped during node update
        scheduler.tick_late();
        assert_eq!(handle.take(), Some(Ok("done")));
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let (scheduler, _) = scheduler();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);

        let handle = scheduler.schedule_next_frame(move || {
            flag.set(true);
            Ok(())
        });
        assert!(handle.cancel());

        scheduler.tick_early();
        assert!(!ran.get());
        assert_eq!(handle.status(), TaskStatus::Cancelled);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_failure_is_isolated_per_task() {
        let (scheduler, _) = scheduler();

        let failing = scheduler.schedule_next_frame(|| -> TaskResult<u32> {
            Err(TaskError::failed("boom"))
        });
        let healthy = scheduler.schedule_next_frame(|| Ok(7u32));

        scheduler.tick_early();

        assert!(failing.is_failed());
        assert_eq!(
            failing.take(),
            Some(Err(TaskError::Failed {
                message: "boom".to_string()
            }))
        );
        assert_eq!(healthy.take(), Some(Ok(7)));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_repeating_task_fire_times() {
        let (scheduler, source) = scheduler();
        let fired = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&fired);
        let clock = scheduler.clock().clone();
        let _handle = scheduler.schedule_repeating(
            move || {
                log.borrow_mut().push(clock.now(TimeBase::Real));
                Ok(true)
            },
            Duration::from_secs(1),
            Duration::from_millis(500),
            TimeBase::Real,
        );

        // 0.0s -> 2.6s in 100ms frames
        for _ in 0..26 {
            frame(&scheduler, &source, Duration::from_millis(100));
        }

        let fired = fired.borrow();
        assert_eq!(
            *fired,
            vec![
                Duration::from_millis(500),
                Duration::from_millis(1500),
                Duration::from_millis(2500),
            ]
        );
    }

    #[test]
    fn test_repeating_catch_up_is_capped() {
        let (scheduler, source) = scheduler();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&fired);
        let clock = scheduler.clock().clone();

        let _handle = scheduler.schedule_repeating(
            move || {
                log.borrow_mut().push(clock.now(TimeBase::Real));
                Ok(true)
            },
            Duration::from_secs(1),
            Duration::ZERO,
            TimeBase::Real,
        );

        frame(&scheduler, &source, Duration::from_millis(100));

        // 10 second stall, then normal frames up to one interval later.
        frame(&scheduler, &source, Duration::from_secs(10));
        for _ in 0..10 {
            frame(&scheduler, &source, Duration::from_millis(100));
        }

        // The stall costs one firing plus one catch-up, then the cadence
        // resumes one interval after the stall.
        assert_eq!(
            *fired.borrow(),
            vec![
                Duration::from_millis(100),
                Duration::from_millis(10_100),
                Duration::from_millis(10_200),
                Duration::from_millis(11_100),
            ]
        );
    }

    #[test]
    fn test_task_registered_between_passes_runs_in_late_pass() {
        let (scheduler, _) = scheduler();

        scheduler.tick_early();
        // e.g. registered by a node update hook
        let handle = scheduler.schedule_next_frame(|| Ok(1));
        scheduler.tick_late();

        assert_eq!(handle.take(), Some(Ok(1)));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_sweeps_reuse_scratch_buffers() {
        let (scheduler, source) = scheduler();
        for _ in 0..32 {
            let _ = scheduler.schedule(|| Ok(()), || false);
        }
        let _repeat = scheduler.schedule_repeating(|| Ok(true), Duration::ZERO, Duration::ZERO, TimeBase::Real);

        frame(&scheduler, &source, Duration::from_millis(16));
        let one_shot_capacity = scheduler.inner.one_shot_scratch.borrow().capacity();
        let repeat_capacity = scheduler.inner.repeat_scratch.borrow().capacity();
        assert!(one_shot_capacity >= 32);

        for _ in 0..10 {
            frame(&scheduler, &source, Duration::from_millis(16));
        }
        assert_eq!(scheduler.inner.one_shot_scratch.borrow().capacity(), one_shot_capacity);
        assert_eq!(scheduler.inner.repeat_scratch.borrow().capacity(), repeat_capacity);
        assert_eq!(scheduler.pending_count(), 32);
        assert_eq!(scheduler.repeating_count(), 1);
    }

    #[test]
    fn test_repeating_stops_on_false_and_on_error() {
        let (scheduler, source) = scheduler();

        let _stops = scheduler.schedule_repeating(|| Ok(false), Duration::ZERO, Duration::ZERO, TimeBase::Scaled);
        let _fails = scheduler.schedule_repeating(
            || Err(TaskError::failed("bad tick")),
            Duration::ZERO,
            Duration::ZERO,
            TimeBase::Scaled,
        );
        assert_eq!(scheduler.repeating_count(), 2);

        frame(&scheduler, &source, Duration::from_millis(16));
        assert_eq!(scheduler.repeating_count(), 0);
    }

    #[test]
    fn test_repeat_handle_cancel() {
        let (scheduler, source) = scheduler();
        let count = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&count);

        let handle = scheduler.schedule_repeating(
            move || {
                counter.set(counter.get() + 1);
                Ok(true)
            },
            Duration::ZERO,
            Duration::ZERO,
            TimeBase::Scaled,
        );

        frame(&scheduler, &source, Duration::from_millis(16));
        handle.cancel();
        frame(&scheduler, &source, Duration::from_millis(16));

        assert_eq!(count.get(), 1);
        assert!(handle.is_stopped());
        assert_eq!(scheduler.repeating_count(), 0);
    }

    #[test]
    fn test_schedule_after_uses_clock() {
        let (scheduler, source) = scheduler();
        let handle = scheduler.schedule_after(Duration::from_millis(250), TimeBase::Scaled, || Ok(1));

        frame(&scheduler, &source, Duration::from_millis(100));
        frame(&scheduler, &source, Duration::from_millis(100));
        assert!(handle.is_pending());

        frame(&scheduler, &source, Duration::from_millis(100));
        assert_eq!(handle.take(), Some(Ok(1)));
    }

    #[test]
    fn test_coroutine_chain_steps_once_per_condition() {
        let (scheduler, source) = scheduler();
        let clock = scheduler.clock().clone();
        let steps = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&steps);
        let mut stage = 0u32;
        let handle = scheduler.spawn(StepFn::new(move || {
            stage += 1;
            log.borrow_mut().push(clock.frame());
            match stage {
                1 => Ok(Step::Yield(Condition::next_frame())),
                2 => Ok(Step::Yield(Condition::frames(&clock, 3))),
                _ => Ok(Step::Complete(stage)),
            }
        }));

        for _ in 0..8 {
            frame(&scheduler, &source, Duration::from_millis(16));
        }

        assert_eq!(handle.take(), Some(Ok(3)));
        // step 1 at frame 1, step 2 at frame 2, step 3 once 3 more frames began
        assert_eq!(*steps.borrow(), vec![1, 2, 5]);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_coroutine_failure_and_cancel() {
        let (scheduler, source) = scheduler();

        let failing = scheduler.spawn(StepFn::new(|| -> TaskResult<Step<()>> {
            Err(TaskError::failed("step exploded"))
        }));

        let resumed = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&resumed);
        let cancelled = scheduler.spawn(StepFn::new(move || -> TaskResult<Step<()>> {
            counter.set(counter.get() + 1);
            Ok(Step::Yield(Condition::next_frame()))
        }));

        frame(&scheduler, &source, Duration::from_millis(16));
        assert!(failing.is_failed());
        assert_eq!(resumed.get(), 1);

        cancelled.cancel();
        frame(&scheduler, &source, Duration::from_millis(16));
        frame(&scheduler, &source, Duration::from_millis(16));
        assert_eq!(resumed.get(), 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_clear_cancels_everything() {
        let (scheduler, _) = scheduler();
        let one_shot = scheduler.schedule(|| Ok(()), || false);
        let repeat = scheduler.schedule_repeating(|| Ok(true), Duration::ZERO, Duration::ZERO, TimeBase::Real);

        scheduler.clear();

        assert!(one_shot.is_finished());
        assert_eq!(one_shot.take(), Some(Err(TaskError::Cancelled)));
        assert!(repeat.is_stopped());
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(scheduler.repeating_count(), 0);
    }
}
