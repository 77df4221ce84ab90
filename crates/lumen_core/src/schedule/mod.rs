//! # Timeline Scheduling
//!
//! Everything that should happen "later" on the main timeline goes through
//! the [`Scheduler`]:
//!
//! | Kind        | Registered with                          | Swept in              |
//! |-------------|------------------------------------------|-----------------------|
//! | One-shot    | [`Scheduler::schedule`] and friends      | early, then late      |
//! | Repeating   | [`Scheduler::schedule_repeating`]        | late                  |
//! | Coroutine   | [`Scheduler::spawn`]                     | early, then late      |
//!
//! A producer failing never disturbs other tasks; the failure is logged and
//! stored in that task's [`TaskHandle`].

mod coroutine;
mod handle;
mod scheduler;

pub use coroutine::{Condition, Coroutine, Step, StepFn};
pub use handle::{RepeatHandle, TaskHandle, TaskStatus};
pub use scheduler::Scheduler;
