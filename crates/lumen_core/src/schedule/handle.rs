//! Result handles returned by the scheduler.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{TaskError, TaskResult};

/// Observable state of a one-shot task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Not evaluated to completion yet.
    Pending,
    /// Finished with a value that has not been taken.
    Completed,
    /// Finished with a failure that has not been taken.
    Failed,
    /// Cancelled before the producer ran.
    Cancelled,
    /// The outcome was moved out through [`TaskHandle::take`].
    Taken,
}

#[derive(Debug)]
enum Outcome<T> {
    Pending,
    Completed(T),
    Failed(TaskError),
    Cancelled,
    Taken,
}

/// Write-once cell shared between a task and its handle.
#[derive(Debug)]
pub(crate) struct Slot<T> {
    outcome: RefCell<Outcome<T>>,
}

impl<T> Slot<T> {
    pub(crate) fn new() -> Rc<Self> {
        Rc::new(Self {
            outcome: RefCell::new(Outcome::Pending),
        })
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        matches!(*self.outcome.borrow(), Outcome::Cancelled)
    }

    /// Stores a value. Ignored unless the slot is still pending.
    pub(crate) fn complete(&self, value: T) {
        let mut outcome = self.outcome.borrow_mut();
        if matches!(*outcome, Outcome::Pending) {
            *outcome = Outcome::Completed(value);
        }
    }

    /// Stores a failure. Ignored unless the slot is still pending.
    pub(crate) fn fail(&self, error: TaskError) {
        let mut outcome = self.outcome.borrow_mut();
        if matches!(*outcome, Outcome::Pending) {
            *outcome = Outcome::Failed(error);
        }
    }

    /// Marks the slot cancelled. Returns false if it already had an outcome.
    pub(crate) fn cancel(&self) -> bool {
        let mut outcome = self.outcome.borrow_mut();
        if matches!(*outcome, Outcome::Pending) {
            *outcome = Outcome::Cancelled;
            true
        } else {
            false
        }
    }

    fn status(&self) -> TaskStatus {
        match *self.outcome.borrow() {
            Outcome::Pending => TaskStatus::Pending,
            Outcome::Completed(_) => TaskStatus::Completed,
            Outcome::Failed(_) => TaskStatus::Failed,
            Outcome::Cancelled => TaskStatus::Cancelled,
            Outcome::Taken => TaskStatus::Taken,
        }
    }

    fn take(&self) -> Option<TaskResult<T>> {
        let mut outcome = self.outcome.borrow_mut();
        match std::mem::replace(&mut *outcome, Outcome::Taken) {
            Outcome::Pending => {
                *outcome = Outcome::Pending;
                None
            }
            Outcome::Completed(value) => Some(Ok(value)),
            Outcome::Failed(error) => Some(Err(error)),
            Outcome::Cancelled => {
                *outcome = Outcome::Cancelled;
                Some(Err(TaskError::Cancelled))
            }
            Outcome::Taken => None,
        }
    }
}

/// Handle to the eventual outcome of a one-shot task or coroutine.
///
/// The outcome is written exactly once: a value, a failure, or cancellation.
/// Clones observe the same outcome.
#[derive(Debug)]
pub struct TaskHandle<T> {
    slot: Rc<Slot<T>>,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(slot: Rc<Slot<T>>) -> Self {
        Self { slot }
    }

    /// Cancels the task if it has not finished.
    ///
    /// The producer will not run; the task leaves the pending set on the next
    /// sweep. Returns false if the task had already finished.
    pub fn cancel(&self) -> bool {
        self.slot.cancel()
    }

    /// Current state of the task.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.slot.status()
    }

    /// Returns true until the task completes, fails or is cancelled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status() == TaskStatus::Pending
    }

    /// Returns true once the task has an outcome (including cancellation).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !self.is_pending()
    }

    /// Returns true if the task was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status() == TaskStatus::Cancelled
    }

    /// Returns true if the task finished with a failure not yet taken.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status() == TaskStatus::Failed
    }

    /// Moves the outcome out of the handle.
    ///
    /// Returns `None` while pending and after a value or failure has already
    /// been taken. Cancellation is reported as `Err(TaskError::Cancelled)`
    /// every time it is asked for.
    pub fn take(&self) -> Option<TaskResult<T>> {
        self.slot.take()
    }
}

/// Handle to a repeating task.
#[derive(Debug, Clone)]
pub struct RepeatHandle {
    stopped: Rc<Cell<bool>>,
}

impl RepeatHandle {
    pub(crate) fn new(stopped: Rc<Cell<bool>>) -> Self {
        Self { stopped }
    }

    /// Stops the task; it leaves the scheduler on the next late sweep.
    pub fn cancel(&self) {
        self.stopped.set(true);
    }

    /// Returns true once the task was cancelled or stopped itself.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_is_write_once() {
        let slot = Slot::new();
        let handle = TaskHandle::new(Rc::clone(&slot));

        slot.complete(1);
        slot.complete(2);
        slot.fail(TaskError::failed("late"));

        assert_eq!(handle.status(), TaskStatus::Completed);
        assert_eq!(handle.take(), Some(Ok(1)));
        assert_eq!(handle.status(), TaskStatus::Taken);
        assert_eq!(handle.take(), None);
    }

    #[test]
    fn test_cancel_only_while_pending() {
        let slot: Rc<Slot<u8>> = Slot::new();
        let handle = TaskHandle::new(Rc::clone(&slot));

        assert!(handle.cancel());
        assert!(!handle.cancel());
        slot.complete(3);

        assert!(handle.is_cancelled());
        assert_eq!(handle.take(), Some(Err(TaskError::Cancelled)));
        assert_eq!(handle.take(), Some(Err(TaskError::Cancelled)));
    }

    #[test]
    fn test_pending_take_is_none() {
        let slot: Rc<Slot<u8>> = Slot::new();
        let handle = TaskHandle::new(slot);
        assert_eq!(handle.take(), None);
        assert!(handle.is_pending());
    }
}
