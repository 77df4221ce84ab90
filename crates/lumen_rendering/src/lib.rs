//! # LUMEN Rendering
//!
//! Prepare/consume split between the update timeline and the display.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      RENDER PIPELINE                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │  World objects ─▶ view-bounds cull ─┐                        │
//! │                                     ├─▶ pooled draw list     │
//! │  Node tree ─▶ paint order ──────────┘        │ (one lock)    │
//! │                                              ▼               │
//! │                 consume() ─▶ snapshot ─▶ DisplaySink::draw   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - `prepare` runs on the update timeline only
//! - `consume` runs anywhere, never mutates the pool
//! - The list lock is never held across a sink call
//! - Draw entries are pooled: no allocations in steady state
//!
//! ## Example
//!
//! ```rust
//! use lumen_core::Size;
//! use lumen_rendering::{Camera, CountingSink, SpriteWorld};
//! use lumen_ui::{NodeTree, Panel};
//!
//! let viewport = Size::new(320.0, 240.0);
//! let mut tree = NodeTree::new(viewport);
//! tree.add_child(tree.root(), Panel::new(Size::new(32.0, 32.0))).unwrap();
//!
//! let mut camera = Camera::new(viewport, 16);
//! let world = SpriteWorld::new();
//! let stats = camera.prepare(&mut tree, Some(&world));
//! assert_eq!(stats.entries, 1);
//!
//! let mut consumer = camera.consumer();
//! let mut sink = CountingSink::default();
//! assert!(consumer.consume(&mut sink));
//! assert_eq!(sink.last_len, 1);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod camera;
pub mod culling;
pub mod draw;
pub mod sink;
pub mod stats;
pub mod world;

pub use camera::{Camera, FrameConsumer};
pub use culling::ViewBounds;
pub use draw::{pack_transforms, DrawEntry, DrawTransform};
pub use sink::{CountingSink, DisplaySink};
pub use stats::RenderStats;
pub use world::{SpriteWorld, World, WorldObject};
