//! # LUMEN UI
//!
//! The node tree drawn on top of the game world.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         NODE PIPELINE                          │
//! ├────────────────────────────────────────────────────────────────┤
//! │  property write ─▶ mark_modified ─▶ (flag only)                │
//! │  update(input)  ─▶ hooks parents-first ─▶ hover/press/focus    │
//! │  collect_visible ─▶ image() regenerates once ─▶ paint list     │
//! │  screen_position ─▶ cached per frame ─▶ invalidated by camera  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lumen_core::Size;
//! use lumen_ui::{NodeTree, Panel, RenderOrder};
//!
//! let mut tree = NodeTree::new(Size::new(640.0, 480.0));
//! let root = tree.root();
//! let panel = tree.add_child(root, Panel::new(Size::new(100.0, 40.0))).unwrap();
//! tree.set_render_order(panel, RenderOrder::AfterChildren).unwrap();
//!
//! let mut paint = Vec::new();
//! tree.collect_visible(root, &mut paint).unwrap();
//! assert_eq!(paint.len(), 1);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod image;
pub mod input;
pub mod layout;
pub mod node;
pub mod style;

pub use error::{GenerateError, TreeError, TreeResult};
pub use image::{Image, ImageBackend, ImageRef, MaskImage, SoftwareBackend, SolidImage};
pub use input::{InputState, MouseButton};
pub use layout::{Align, Alignment, Rect, SizeBounds};
pub use node::{
    ContentLayout, Custom, Iter, NodeContent, NodeContext, NodeEvent, NodeEventReceiver, NodeId,
    NodeTree, PaintEntry, Panel, RenderOrder, Structure, Walker,
};
pub use style::{Color, Theme};
