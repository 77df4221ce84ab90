//! # Snapshot List
//!
//! A list written in place by one producer and copied out by any number of
//! readers.
//!
//! ```text
//! Producer (timeline):   lock ─ resize ─ fill ─ unlock
//! Consumer (any thread): lock ─ copy ─ unlock ─ use the copy
//! ```
//!
//! The lock is held only for the resize/fill and for the copy, never while a
//! consumer works with its snapshot. A reader therefore always sees either
//! the previous complete list or the next complete list.

use std::sync::Arc;

use parking_lot::Mutex;

/// Mutex-guarded list shared between a producer and snapshot readers.
///
/// Cloning the handle shares the same list.
#[derive(Debug)]
pub struct SnapshotList<T> {
    inner: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for SnapshotList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> SnapshotList<T> {
    /// Creates an empty list with room for `capacity` items.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::with_capacity(capacity))),
        }
    }

    /// Runs `update` with exclusive access to the live list.
    ///
    /// Producer side. Everything `update` does is observed atomically by
    /// readers.
    pub fn update<R>(&self, update: impl FnOnce(&mut Vec<T>) -> R) -> R {
        let mut guard = self.inner.lock();
        update(&mut guard)
    }

    /// Number of live items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns true if the live list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl<T: Clone> SnapshotList<T> {
    /// Copies the live list into `out`, replacing its contents.
    ///
    /// Reuses `out`'s allocation, so a consumer that keeps its buffer around
    /// copies without allocating once the buffer is large enough.
    pub fn snapshot_into(&self, out: &mut Vec<T>) {
        out.clear();
        let guard = self.inner.lock();
        out.extend(guard.iter().cloned());
    }

    /// Returns a copy of the live list.
    #[must_use]
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.lock().clone()
    }
}

impl<T> Default for SnapshotList<T> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}
