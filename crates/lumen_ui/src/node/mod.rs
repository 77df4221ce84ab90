//! # Node Tree
//!
//! ```text
//!                 viewport
//!                    │
//!                  root (structure, locked)
//!                 ╱    ╲
//!            panel      hud (structure)
//!           ╱     ╲         │
//!       label    icon     meter
//! ```
//!
//! Nodes live in an arena keyed by [`NodeId`]. Children are ordered: the
//! first child paints first (bottom), the last child paints last (top).
//!
//! ## Lazy images
//!
//! Property writes call [`NodeTree::mark_modified`], which only flips a flag.
//! The content's generate hook runs at most once per batch of writes, the
//! next time [`NodeTree::image`] is asked for the image.
//!
//! ## Node states
//!
//! | Local enabled | Ancestors enabled | Visible (self + ancestors) | State           |
//! |---------------|-------------------|----------------------------|-----------------|
//! | no            | any               | any                        | Disabled        |
//! | yes           | no                | any                        | Disabled        |
//! | yes           | yes               | no                         | Enabled-Hidden  |
//! | yes           | yes               | yes                        | Enabled-Visible |
//!
//! Only Enabled-Visible nodes paint and hit-test.

mod content;
mod event;
mod interaction;
mod tree;
mod walker;

pub use content::{ContentLayout, Custom, NodeContent, NodeContext, Panel, Structure};
pub use event::{NodeEvent, NodeEventReceiver};
pub use tree::{NodeTree, PaintEntry};
pub use walker::{Iter, Walker};

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Creates a node ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// When a node's own image is painted relative to its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderOrder {
    /// Node first, children on top.
    #[default]
    BeforeChildren,
    /// Children first, node on top.
    AfterChildren,
    /// Node below AND above its children.
    BeforeAndAfter,
}

impl RenderOrder {
    /// Returns true if the node paints before recursing into children.
    #[must_use]
    pub const fn paints_before(self) -> bool {
        matches!(self, Self::BeforeChildren | Self::BeforeAndAfter)
    }

    /// Returns true if the node paints after recursing into children.
    #[must_use]
    pub const fn paints_after(self) -> bool {
        matches!(self, Self::AfterChildren | Self::BeforeAndAfter)
    }
}

/// Node state flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct NodeFlags(u32);

impl NodeFlags {
    /// Locally enabled.
    pub const ENABLED: u32 = 1 << 0;
    /// Locally visible.
    pub const VISIBLE: u32 = 1 << 1;
    /// Image must be regenerated.
    pub const MODIFIED: u32 = 1 << 2;
    /// Image regeneration in progress.
    pub const MODIFY_LOCK: u32 = 1 << 3;
    /// Parent and visibility are frozen.
    pub const STRUCTURE_LOCKED: u32 = 1 << 4;
    /// Takes part in hover / press / click.
    pub const INTERACTIVE: u32 = 1 << 5;
    /// Can take focus when pressed.
    pub const FOCUSABLE: u32 = 1 << 6;
    /// Hit tests also check image alpha.
    pub const PIXEL_PERFECT: u32 = 1 << 7;

    /// Flags of a freshly inserted node.
    pub const DEFAULT: Self = Self(Self::ENABLED | Self::VISIBLE | Self::MODIFIED);

    #[inline]
    pub const fn has(self, flag: u32) -> bool {
        (self.0 & flag) != 0
    }

    #[inline]
    pub fn set(&mut self, flag: u32) {
        self.0 |= flag;
    }

    #[inline]
    pub fn clear(&mut self, flag: u32) {
        self.0 &= !flag;
    }

    #[inline]
    pub fn assign(&mut self, flag: u32, on: bool) {
        if on {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_order_sides() {
        assert!(RenderOrder::BeforeChildren.paints_before());
        assert!(!RenderOrder::BeforeChildren.paints_after());
        assert!(RenderOrder::AfterChildren.paints_after());
        assert!(RenderOrder::BeforeAndAfter.paints_before() && RenderOrder::BeforeAndAfter.paints_after());
    }

    #[test]
    fn test_flags() {
        let mut flags = NodeFlags::DEFAULT;
        assert!(flags.has(NodeFlags::MODIFIED));
        flags.clear(NodeFlags::MODIFIED);
        flags.assign(NodeFlags::FOCUSABLE, true);
        assert!(!flags.has(NodeFlags::MODIFIED));
        assert!(flags.has(NodeFlags::FOCUSABLE));
        assert_eq!(NodeId::new(7).to_string(), "#7");
    }
}
