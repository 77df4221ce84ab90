//! # LUMEN Core
//!
//! The timeline kernel shared by every other LUMEN crate:
//! - A frame clock with real and scaled time bases
//! - A deferred task scheduler with early and late passes
//! - Growable object pools for per-frame records
//! - Mutex-guarded lists handed between the timeline and the display
//!
//! ## Architecture Rules
//!
//! 1. **One timeline** - The clock and scheduler are `!Send`; only the thread
//!    that owns them runs tasks
//! 2. **Sampled time** - The clock advances once per frame, every reader in
//!    that frame sees the same instant
//! 3. **Short locks** - Shared lists are locked only to copy, never to draw
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use lumen_core::{FrameClock, ManualTimeSource, Scheduler};
//!
//! let source = ManualTimeSource::new();
//! let scheduler = Scheduler::new(FrameClock::new(source.clone()));
//! let handle = scheduler.schedule_next_frame(|| Ok(2 + 2));
//!
//! source.advance(Duration::from_millis(16));
//! scheduler.clock().advance();
//! scheduler.tick_early();
//! assert_eq!(handle.take(), Some(Ok(4)));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod math;
pub mod memory;
pub mod schedule;
pub mod sync;
pub mod time;

pub use error::{TaskError, TaskResult};
pub use math::{Size, Vec2};
pub use memory::{ObjectPool, Recycle};
pub use schedule::{
    Condition, Coroutine, RepeatHandle, Scheduler, Step, StepFn, TaskHandle, TaskStatus,
};
pub use sync::SnapshotList;
pub use time::{
    FrameClock, ManualTimeSource, SystemTimeSource, TimeBase, TimeSource,
    DEFAULT_MAX_FRAME_DELTA,
};
