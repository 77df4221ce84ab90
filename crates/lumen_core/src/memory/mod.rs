//! # Memory Management
//!
//! Recycling pools for per-frame objects.
//!
//! ## Design Philosophy
//!
//! Memory is allocated when demand first peaks. After that:
//! - No heap allocations in steady-state frames
//! - Returned objects are parked, never dropped
//! - Predictable, flat latency

mod pool;

pub use pool::{ObjectPool, Recycle};
