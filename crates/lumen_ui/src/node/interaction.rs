//! Per-frame node update and pointer interaction.
//!
//! ```text
//! update(input, dt)
//!   1. walk parents-first, run each enabled node's update hook
//!   2. find the topmost interactive node under the pointer
//!   3. hover enter/leave ──▶ Hovered / Unhovered
//!   4. button down       ──▶ Pressed, focus moves (or clears)
//!   5. button up         ──▶ Clicked if still over the pressed node
//! ```

use lumen_core::Vec2;

use super::content::NodeContext;
use super::event::NodeEvent;
use super::walker::Walker;
use super::{NodeFlags, NodeId, NodeTree};
use crate::input::{InputState, MouseButton};

/// Hover / press / focus targets. At most one of each per tree.
#[derive(Debug, Default)]
pub(crate) struct Interaction {
    hovered: Option<NodeId>,
    pressed: Option<NodeId>,
    focused: Option<NodeId>,
}

impl Interaction {
    /// Drops every reference to a removed node.
    pub fn forget(&mut self, id: NodeId) {
        for slot in [&mut self.hovered, &mut self.pressed, &mut self.focused] {
            if *slot == Some(id) {
                *slot = None;
            }
        }
    }
}

impl NodeTree {
    /// Runs the per-frame update: content hooks, then interaction.
    ///
    /// Hooks may restructure the tree; the walk tolerates it (see
    /// [`Walker`]). Disabled subtrees are skipped.
    pub fn update(&mut self, input: &InputState, dt: f32) {
        let mut walker = Walker::new(self.root);
        while let Some(id) = walker.next(self) {
            let enabled = self
                .nodes
                .get(&id)
                .is_some_and(|node| node.flags.has(NodeFlags::ENABLED));
            if !enabled {
                walker.skip_children();
                continue;
            }
            self.run_update_hook(id, input, dt);
        }

        self.update_interaction(input);
    }

    /// Node under the pointer last frame.
    #[must_use]
    pub fn hovered(&self) -> Option<NodeId> {
        self.interaction.hovered
    }

    /// Node the primary button went down on and has not been released.
    #[must_use]
    pub fn pressed(&self) -> Option<NodeId> {
        self.interaction.pressed
    }

    /// Focused node.
    #[must_use]
    pub fn focused(&self) -> Option<NodeId> {
        self.interaction.focused
    }

    /// Moves focus, emitting [`NodeEvent::FocusLost`] / [`NodeEvent::FocusGained`].
    pub fn set_focus(&mut self, target: Option<NodeId>) {
        let target = target.filter(|id| self.contains_node(*id));
        if target == self.interaction.focused {
            return;
        }
        if let Some(old) = self.interaction.focused.take() {
            self.events.emit(NodeEvent::FocusLost { node: old });
        }
        if let Some(new) = target {
            self.events.emit(NodeEvent::FocusGained { node: new });
        }
        self.interaction.focused = target;
    }

    /// Topmost Enabled-Visible interactive node containing `pointer`.
    #[must_use]
    pub fn pick(&self, pointer: Vec2) -> Option<NodeId> {
        let mut hit = None;
        self.pick_into(self.root, pointer, &mut hit);
        hit
    }

    fn pick_into(&self, id: NodeId, pointer: Vec2, hit: &mut Option<NodeId>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.flags.has(NodeFlags::ENABLED) || !node.flags.has(NodeFlags::VISIBLE) {
            return;
        }

        let order = node.render_order;
        let interactive = node.flags.has(NodeFlags::INTERACTIVE);
        let pixel_perfect = node.flags.has(NodeFlags::PIXEL_PERFECT);
        let test = |hit: &mut Option<NodeId>| {
            if interactive && self.hit(id, pointer, pixel_perfect).unwrap_or(false) {
                *hit = Some(id);
            }
        };

        if order.paints_before() {
            test(hit);
        }
        for &child in &node.children {
            self.pick_into(child, pointer, hit);
        }
        if order.paints_after() {
            test(hit);
        }
    }

    fn run_update_hook(&mut self, id: NodeId, input: &InputState, dt: f32) {
        let Some(mut content) = self.nodes.get_mut(&id).and_then(|node| node.content.take()) else {
            return;
        };
        {
            let mut ctx = NodeContext::new(self, id);
            content.update(&mut ctx, input, dt);
        }
        self.restore_content(id, content);
    }

    fn update_interaction(&mut self, input: &InputState) {
        let hit = self.pick(input.pointer);

        if hit != self.interaction.hovered {
            if let Some(old) = self.interaction.hovered {
                self.events.emit(NodeEvent::Unhovered { node: old });
            }
            if let Some(new) = hit {
                self.events.emit(NodeEvent::Hovered { node: new });
            }
            self.interaction.hovered = hit;
        }

        if input.pressed(MouseButton::Left) {
            self.interaction.pressed = hit;
            if let Some(id) = hit {
                self.events.emit(NodeEvent::Pressed { node: id });
            }
            let focus = hit.filter(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|node| node.flags.has(NodeFlags::FOCUSABLE))
            });
            self.set_focus(focus);
        }

        if input.released(MouseButton::Left) {
            if let Some(pressed) = self.interaction.pressed.take() {
                if hit == Some(pressed) {
                    self.events.emit(NodeEvent::Clicked { node: pressed });
                }
            }
        }
    }
}
