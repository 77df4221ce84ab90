//! # Object Pool
//!
//! Growable recycling pool for objects that are handed out and returned
//! every frame.

/// Objects that can be scrubbed before going back into a pool.
pub trait Recycle {
    /// Drops any borrowed or shared state so the pooled object holds nothing
    /// alive while it sits in the free list.
    fn recycle(&mut self);
}

/// A recycling pool of `T`.
///
/// Unlike a fixed-capacity allocator this pool never fails: when the free
/// list is empty a fresh object is built with `T::default()`. Returned
/// objects are kept, never dropped, so once the pool has seen the peak
/// demand every later frame is allocation free.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. It belongs to the producer side of the
/// render pipeline.
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: ObjectPool<DrawEntry> = ObjectPool::with_capacity(256);
///
/// // Acquire - O(1), allocates only when the free list is empty
/// let entry = pool.acquire();
///
/// // Release - O(1), the object is parked for the next frame
/// pool.release(entry);
/// ```
#[derive(Debug)]
pub struct ObjectPool<T> {
    /// Objects waiting to be reused.
    free_list: Vec<T>,
    /// Total objects ever built by this pool.
    created: usize,
}

impl<T: Default + Recycle> ObjectPool<T> {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            free_list: Vec::new(),
            created: 0,
        }
    }

    /// Creates a pool with `capacity` objects already built.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let free_list: Vec<T> = (0..capacity).map(|_| T::default()).collect();
        Self {
            free_list,
            created: capacity,
        }
    }

    /// Number of objects waiting in the free list.
    #[inline]
    #[must_use]
    pub fn available(&self) -> usize {
        self.free_list.len()
    }

    /// Total number of objects this pool has ever built.
    #[inline]
    #[must_use]
    pub const fn created(&self) -> usize {
        self.created
    }

    /// Takes an object out of the pool, building one if none are free.
    ///
    /// This is a **O(1)** operation.
    pub fn acquire(&mut self) -> T {
        if let Some(item) = self.free_list.pop() {
            item
        } else {
            self.created += 1;
            T::default()
        }
    }

    /// Returns an object to the pool.
    ///
    /// The object is recycled first so it does not keep shared state alive.
    pub fn release(&mut self, mut item: T) {
        item.recycle();
        self.free_list.push(item);
    }

    /// Returns every object yielded by `items` to the pool.
    pub fn release_all(&mut self, items: impl IntoIterator<Item = T>) {
        for item in items {
            self.release(item);
        }
    }

    /// Drops every parked object, shrinking the pool back to empty.
    pub fn clear(&mut self) {
        self.free_list.clear();
    }
}

impl<T: Default + Recycle> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug, PartialEq)]
    struct Slot {
        payload: Option<u32>,
    }

    impl Recycle for Slot {
        fn recycle(&mut self) {
            self.payload = None;
        }
    }

    #[test]
    fn test_pool_grows_on_demand() {
        let mut pool: ObjectPool<Slot> = ObjectPool::new();
        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.created(), 2);
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn test_pool_reuse() {
        let mut pool: ObjectPool<Slot> = ObjectPool::with_capacity(1);

        let mut slot = pool.acquire();
        slot.payload = Some(7);
        pool.release(slot);

        let again = pool.acquire();
        assert_eq!(pool.created(), 1); // Same object reused
        assert_eq!(again.payload, None); // Recycled on release
    }

    #[test]
    fn test_release_all() {
        let mut pool: ObjectPool<Slot> = ObjectPool::new();
        let items: Vec<Slot> = (0..4).map(|_| pool.acquire()).collect();
        pool.release_all(items);
        assert_eq!(pool.available(), 4);
        assert_eq!(pool.created(), 4);
    }
}
