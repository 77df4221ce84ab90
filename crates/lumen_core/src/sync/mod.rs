//! # Synchronization Primitives for the Prepare/Consume Split
//!
//! ## The Problem
//!
//! ```text
//! Thread 1 (Timeline):  REBUILD the frame's draw list
//! Thread 2 (Display):   READ the draw list and push pixels
//!
//! Without synchronization: a reader sees a half-resized list
//! ```
//!
//! ## The Solution: Snapshot Copies
//!
//! ```text
//! Frame N:
//!   Timeline locks, resizes and fills the list, unlocks
//!   Display locks, copies the list, unlocks, draws the copy
//! ```
//!
//! One short lock per side. The display never holds the lock while drawing,
//! and the timeline never waits for a draw to finish.

mod snapshot;

pub use snapshot::SnapshotList;
