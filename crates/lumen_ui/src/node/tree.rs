//! Arena-backed node tree.

use std::cell::Cell;
use std::collections::HashMap;

use lumen_core::{Size, Vec2};
use tracing::{debug, warn};

use super::content::{ContentLayout, NodeContent, NodeContext, Structure};
use super::event::{EventHub, NodeEvent, NodeEventReceiver};
use super::interaction::Interaction;
use super::walker::{Iter, Walker};
use super::{NodeFlags, NodeId, RenderOrder};
use crate::error::{TreeError, TreeResult};
use crate::image::{ImageBackend, ImageRef, SoftwareBackend};
use crate::layout::{Alignment, Rect, SizeBounds};
use crate::style::Theme;

/// Default capacity of a [`NodeTree::subscribe`] channel.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// One entry of the back-to-front paint list.
#[derive(Debug, Clone)]
pub struct PaintEntry {
    /// Node that owns the image.
    pub node: NodeId,
    /// Image to draw at the node's screen position.
    pub image: ImageRef,
}

pub(super) struct Node {
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
    pub(super) flags: NodeFlags,
    pub(super) content: Option<Box<dyn NodeContent>>,
    pub(super) layout: ContentLayout,
    image: Option<ImageRef>,
    /// Resolved screen position; valid until the next invalidation.
    position: Cell<Option<Vec2>>,
    location: Vec2,
    offset: Vec2,
    alignment: Alignment,
    bounds: SizeBounds,
    pub(super) render_order: RenderOrder,
    theme: Option<Theme>,
}

impl Node {
    fn new(content: Box<dyn NodeContent>, parent: Option<NodeId>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            flags: NodeFlags::DEFAULT,
            layout: content.layout(),
            content: Some(content),
            image: None,
            position: Cell::new(None),
            location: Vec2::ZERO,
            offset: Vec2::ZERO,
            alignment: Alignment::CENTER,
            bounds: SizeBounds::UNBOUNDED,
            render_order: RenderOrder::BeforeChildren,
            theme: None,
        }
    }
}

/// The node hierarchy of one timeline.
///
/// The tree always has a root node: a transparent, structure-locked
/// [`Structure`] whose parent is the viewport. Nodes that are detached from
/// the root stay in the arena but neither update, paint nor hit-test.
pub struct NodeTree {
    pub(super) nodes: HashMap<NodeId, Node>,
    pub(super) root: NodeId,
    next_id: u64,
    viewport: Size,
    default_theme: Theme,
    backend: Box<dyn ImageBackend>,
    pub(super) events: EventHub,
    pub(super) interaction: Interaction,
}

impl NodeTree {
    /// Creates a tree over a viewport, drawing with the [`SoftwareBackend`].
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self::with_backend(viewport, SoftwareBackend)
    }

    /// Creates a tree over a viewport with a custom image backend.
    #[must_use]
    pub fn with_backend(viewport: Size, backend: impl ImageBackend + 'static) -> Self {
        let root = NodeId::new(1);
        let mut root_node = Node::new(Box::new(Structure::new()), None);
        root_node.flags.set(NodeFlags::STRUCTURE_LOCKED);

        let mut nodes = HashMap::with_capacity(256);
        nodes.insert(root, root_node);

        Self {
            nodes,
            root,
            next_id: 2,
            viewport,
            default_theme: Theme::default(),
            backend: Box::new(backend),
            events: EventHub::default(),
            interaction: Interaction::default(),
        }
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the arena, including detached ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root cannot be removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if `id` is in the arena.
    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Inserts a node, attached as the last child of `parent` if given.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `parent` does not exist.
    pub fn insert(&mut self, parent: Option<NodeId>, content: impl NodeContent) -> TreeResult<NodeId> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }

        let id = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Node::new(Box::new(content), parent));

        if let Some(parent) = parent {
            self.attach(parent, id);
        }
        Ok(id)
    }

    /// Inserts a node as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `parent` does not exist.
    pub fn add_child(&mut self, parent: NodeId, content: impl NodeContent) -> TreeResult<NodeId> {
        self.insert(Some(parent), content)
    }

    /// Parent of a node.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn parent(&self, id: NodeId) -> TreeResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Children of a node in paint order; empty for unknown nodes.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |node| node.children.as_slice())
    }

    /// Returns true if `ancestor` is a strict ancestor of `node`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// Moves a node under `new_parent` (as its last child), or detaches it.
    ///
    /// Removal events fire on both sides before addition events. A single
    /// [`NodeEvent::ParentResized`] follows if the old and new parents differ
    /// in size and anyone is subscribed.
    ///
    /// # Errors
    ///
    /// - [`TreeError::StructureLocked`] if the node is locked
    /// - [`TreeError::Cycle`] if `new_parent` is the node or a descendant
    /// - [`TreeError::UnknownNode`] for unknown ids
    ///
    /// The tree is unchanged on error.
    pub fn set_parent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> TreeResult<()> {
        let node = self.node(id)?;
        if node.flags.has(NodeFlags::STRUCTURE_LOCKED) {
            return Err(TreeError::StructureLocked(id));
        }
        let old_parent = node.parent;

        if let Some(parent) = new_parent {
            self.node(parent)?;
            if parent == id || self.is_ancestor(id, parent) {
                return Err(TreeError::Cycle { node: id, parent });
            }
        }
        if old_parent == new_parent {
            return Ok(());
        }

        let was_enabled = self.is_enabled_global(id)?;
        let old_size = self.parent_size(old_parent);

        if let Some(old) = old_parent {
            self.detach(old, id);
        }
        self.node_mut(id)?.parent = new_parent;
        if let Some(parent) = new_parent {
            self.attach(parent, id);
        }
        self.invalidate_positions(id);

        if self.events.has_listeners() && old_size != self.parent_size(new_parent) {
            self.events.emit(NodeEvent::ParentResized { node: id });
        }

        let now_enabled = self.is_enabled_global(id)?;
        if was_enabled != now_enabled {
            self.propagate_enabled(id, now_enabled);
        }
        Ok(())
    }

    /// Removes a node and its whole subtree from the arena.
    ///
    /// # Errors
    ///
    /// [`TreeError::StructureLocked`] if the node is locked (the root always
    /// is), [`TreeError::UnknownNode`] if it does not exist.
    pub fn remove(&mut self, id: NodeId) -> TreeResult<()> {
        let node = self.node(id)?;
        if node.flags.has(NodeFlags::STRUCTURE_LOCKED) {
            return Err(TreeError::StructureLocked(id));
        }
        if let Some(parent) = node.parent {
            self.detach(parent, id);
        }
        self.remove_subtree(id);
        Ok(())
    }

    /// Removes every child of a node together with its subtree.
    ///
    /// Nothing is removed if any child is structure-locked.
    ///
    /// # Errors
    ///
    /// [`TreeError::StructureLocked`] naming the first locked child,
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn clear_children(&mut self, id: NodeId) -> TreeResult<()> {
        let locked = self.node(id)?.children.iter().copied().find(|child| {
            self.nodes
                .get(child)
                .is_some_and(|node| node.flags.has(NodeFlags::STRUCTURE_LOCKED))
        });
        if let Some(child) = locked {
            return Err(TreeError::StructureLocked(child));
        }

        let children = std::mem::take(&mut self.node_mut(id)?.children);
        let count = children.len();
        for child in children {
            self.events.emit(NodeEvent::ChildRemoved { parent: id, child });
            self.events.emit(NodeEvent::Detached { node: child, parent: id });
            self.remove_subtree(child);
        }
        debug!(node = %id, count, "cleared children");
        Ok(())
    }

    /// Tears the tree down to its root.
    ///
    /// Every other node is dropped, structure-locked and detached ones
    /// included, and interaction state is forgotten. Subscribers, the theme
    /// and the image backend are kept. Meant for whole-engine teardown; use
    /// [`clear_children`](Self::clear_children) to edit a live tree.
    pub fn reset(&mut self) {
        let root = self.root;
        let children = self
            .nodes
            .get_mut(&root)
            .map(|node| std::mem::take(&mut node.children))
            .unwrap_or_default();
        for &child in &children {
            self.events.emit(NodeEvent::ChildRemoved { parent: root, child });
            self.events.emit(NodeEvent::Removed { node: child });
        }

        let dropped = self.nodes.len().saturating_sub(1);
        self.nodes.retain(|&id, _| id == root);
        self.interaction = Interaction::default();
        self.invalidate_positions(root);
        debug!(dropped, "tree reset");
    }

    /// Freezes a node's parent and visibility. Enablement and content stay
    /// mutable.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn lock_structure(&mut self, id: NodeId) -> TreeResult<()> {
        self.node_mut(id)?.flags.set(NodeFlags::STRUCTURE_LOCKED);
        Ok(())
    }

    /// Returns true if the node's structure is locked.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn is_structure_locked(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.flags.has(NodeFlags::STRUCTURE_LOCKED))
    }

    // =========================================================================
    // Enablement & visibility
    // =========================================================================

    /// Sets the local enabled flag.
    ///
    /// [`NodeEvent::EnabledChanged`] fires for the node and every descendant
    /// that is not locally disabled, only if the global state flipped.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> TreeResult<()> {
        let before = self.is_enabled_global(id)?;
        self.node_mut(id)?.flags.assign(NodeFlags::ENABLED, enabled);
        let after = self.is_enabled_global(id)?;
        if before != after {
            self.propagate_enabled(id, after);
        }
        Ok(())
    }

    /// The node's own enabled flag.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn is_enabled_local(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.flags.has(NodeFlags::ENABLED))
    }

    /// Local flag AND the global state of the parent (the root: local only).
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn is_enabled_global(&self, id: NodeId) -> TreeResult<bool> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            if !node.flags.has(NodeFlags::ENABLED) {
                return Ok(false);
            }
            current = node.parent;
        }
        Ok(true)
    }

    /// Sets the node's own visibility.
    ///
    /// # Errors
    ///
    /// [`TreeError::StructureLocked`] if the node is locked,
    /// [`TreeError::UnknownNode`] if it does not exist.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        if node.flags.has(NodeFlags::STRUCTURE_LOCKED) {
            return Err(TreeError::StructureLocked(id));
        }
        if node.flags.has(NodeFlags::VISIBLE) != visible {
            node.flags.assign(NodeFlags::VISIBLE, visible);
            self.events.emit(NodeEvent::VisibilityChanged { node: id, visible });
        }
        Ok(())
    }

    /// The node's own visibility flag.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn is_visible(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.flags.has(NodeFlags::VISIBLE))
    }

    /// Returns true if the node is Enabled-Visible: it and every ancestor are
    /// enabled and visible.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn is_displayed(&self, id: NodeId) -> TreeResult<bool> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            if !node.flags.has(NodeFlags::ENABLED) || !node.flags.has(NodeFlags::VISIBLE) {
                return Ok(false);
            }
            current = node.parent;
        }
        Ok(true)
    }

    // =========================================================================
    // Image invalidation
    // =========================================================================

    /// Requests regeneration of the node's image.
    ///
    /// No-op while already modified or while the node's image is being
    /// generated; otherwise emits [`NodeEvent::Changed`].
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn mark_modified(&mut self, id: NodeId) -> TreeResult<()> {
        let node = self.node_mut(id)?;
        if node.flags.has(NodeFlags::MODIFIED) || node.flags.has(NodeFlags::MODIFY_LOCK) {
            return Ok(());
        }
        node.flags.set(NodeFlags::MODIFIED);
        self.events.emit(NodeEvent::Changed { node: id });
        Ok(())
    }

    /// Returns true if the image will be regenerated on the next read.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn is_modified(&self, id: NodeId) -> TreeResult<bool> {
        Ok(self.node(id)?.flags.has(NodeFlags::MODIFIED))
    }

    /// The node's image, regenerated first if the node is modified.
    ///
    /// After regeneration, an unchanged size notifies the children with
    /// [`NodeEvent::ParentResized`]; a changed size goes through the resize
    /// path ([`NodeEvent::Resized`], which informs the children itself). A
    /// failing generate hook is logged and the previous image is kept.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn image(&mut self, id: NodeId) -> TreeResult<Option<ImageRef>> {
        let node = self.node_mut(id)?;
        // Content is absent while one of its own hooks runs.
        let regenerate = node.flags.has(NodeFlags::MODIFIED)
            && !node.flags.has(NodeFlags::MODIFY_LOCK)
            && node.content.is_some();

        if regenerate {
            node.flags.set(NodeFlags::MODIFY_LOCK);
            node.flags.clear(NodeFlags::MODIFIED);
            let content = node.content.take();

            let old_size = self.size(id)?;
            if let Some(mut content) = content {
                let result = {
                    let mut ctx = NodeContext::new(self, id);
                    content.generate(&mut ctx)
                };
                let layout = content.layout();
                // The hook may have removed its own node.
                let Some(node) = self.nodes.get_mut(&id) else {
                    return Ok(None);
                };
                node.content = Some(content);
                node.layout = layout;
                match result {
                    Ok(image) => node.image = image,
                    Err(error) => warn!(node = %id, %error, "image generation failed, keeping previous image"),
                }
            }

            self.node_mut(id)?.flags.clear(NodeFlags::MODIFY_LOCK);

            if self.size(id)? == old_size {
                let children = self.children(id).to_vec();
                for child in children {
                    self.events.emit(NodeEvent::ParentResized { node: child });
                }
            } else {
                self.notify_resized(id);
            }
        }
        Ok(self.node(id)?.image.clone())
    }

    /// The cached image without regenerating.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn cached_image(&self, id: NodeId) -> TreeResult<Option<ImageRef>> {
        Ok(self.node(id)?.image.clone())
    }

    /// Mutates the node's content if it is a `C`, then marks the node
    /// modified. Returns `None` if the content is of another type or is
    /// currently running a hook.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn update_content<C, R>(&mut self, id: NodeId, f: impl FnOnce(&mut C) -> R) -> TreeResult<Option<R>>
    where
        C: NodeContent,
    {
        let old_size = self.size(id)?;
        let node = self.node_mut(id)?;
        let Some(content) = node.content.as_mut() else {
            return Ok(None);
        };
        let Some(typed) = content.as_any_mut().downcast_mut::<C>() else {
            return Ok(None);
        };
        let result = f(typed);
        node.layout = content.layout();

        self.mark_modified(id)?;
        if self.size(id)? != old_size {
            self.notify_resized(id);
        }
        Ok(Some(result))
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// The viewport the root is laid out in.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Resizes the viewport.
    pub fn set_viewport(&mut self, viewport: Size) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.notify_resized(self.root);
        }
    }

    /// Reported size: the image (or fixed) size clamped to the node's size
    /// bounds. Transparent structure nodes report their parent's size.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn size(&self, id: NodeId) -> TreeResult<Size> {
        let node = self.node(id)?;
        let base = match node.layout {
            ContentLayout::Transparent => return Ok(self.parent_size(node.parent)),
            ContentLayout::Fixed(size) => size,
            ContentLayout::Image => node.image.as_ref().map_or(Size::ZERO, |image| image.size()),
        };
        Ok(node.bounds.clamp(base))
    }

    /// Sets min/max bounds on the reported size.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn set_size_bounds(&mut self, id: NodeId, bounds: SizeBounds) -> TreeResult<()> {
        let old_size = self.size(id)?;
        self.node_mut(id)?.bounds = bounds;
        if self.size(id)? != old_size {
            self.notify_resized(id);
        }
        Ok(())
    }

    /// Sets the location as a fraction of the parent's half-size
    /// (`(1, 0)` is the parent's right edge).
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn set_location(&mut self, id: NodeId, location: Vec2) -> TreeResult<()> {
        self.node_mut(id)?.location = location;
        self.invalidate_positions(id);
        Ok(())
    }

    /// Sets the absolute pixel offset.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn set_offset(&mut self, id: NodeId, offset: Vec2) -> TreeResult<()> {
        self.node_mut(id)?.offset = offset;
        self.invalidate_positions(id);
        Ok(())
    }

    /// Sets how the node's rectangle sits around its anchor.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn set_alignment(&mut self, id: NodeId, alignment: Alignment) -> TreeResult<()> {
        self.node_mut(id)?.alignment = alignment;
        self.invalidate_positions(id);
        Ok(())
    }

    /// Screen position (center) of the node.
    ///
    /// `parent position + location * parent half-size + offset + alignment
    /// offset`, resolved top-down and cached until
    /// [`invalidate_positions`](Self::invalidate_positions). A transparent
    /// structure node forwards its parent's position.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn screen_position(&self, id: NodeId) -> TreeResult<Vec2> {
        let node = self.node(id)?;
        if let Some(position) = node.position.get() {
            return Ok(position);
        }

        let (parent_position, parent_size) = match node.parent {
            Some(parent) => (self.screen_position(parent)?, self.size(parent)?),
            None => (self.viewport.half(), self.viewport),
        };

        let position = if node.layout == ContentLayout::Transparent {
            parent_position
        } else {
            parent_position
                + node.location.scale(parent_size.half())
                + node.offset
                + node.alignment.offset(self.size(id)?)
        };
        node.position.set(Some(position));
        Ok(position)
    }

    /// Screen rectangle of the node.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn screen_rect(&self, id: NodeId) -> TreeResult<Rect> {
        Ok(Rect::from_center(self.screen_position(id)?, self.size(id)?))
    }

    /// Drops cached screen positions of a node and its subtree.
    pub fn invalidate_positions(&self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                node.position.set(None);
                stack.extend_from_slice(&node.children);
            }
        }
    }

    /// Hit test. Checks the screen rectangle, then, if `pixel_perfect`,
    /// rejects pixels where the image is fully transparent. Only
    /// Enabled-Visible nodes can be hit.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn contains(&self, id: NodeId, pixel: Vec2, pixel_perfect: bool) -> TreeResult<bool> {
        if !self.is_displayed(id)? {
            return Ok(false);
        }
        self.hit(id, pixel, pixel_perfect)
    }

    pub(super) fn hit(&self, id: NodeId, pixel: Vec2, pixel_perfect: bool) -> TreeResult<bool> {
        let rect = self.screen_rect(id)?;
        if !rect.contains(pixel) {
            return Ok(false);
        }
        if !pixel_perfect {
            return Ok(true);
        }

        let Some(image) = self.node(id)?.image.as_ref() else {
            return Ok(false);
        };
        let image_size = image.size();
        let u = (pixel.x - rect.x) / rect.width * image_size.width;
        let v = (pixel.y - rect.y) / rect.height * image_size.height;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let alpha = image.alpha_at(u.max(0.0) as u32, v.max(0.0) as u32);
        Ok(alpha > 0)
    }

    // =========================================================================
    // Painting
    // =========================================================================

    /// Sets when the node paints relative to its children.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn set_render_order(&mut self, id: NodeId, order: RenderOrder) -> TreeResult<()> {
        self.node_mut(id)?.render_order = order;
        Ok(())
    }

    /// Appends the subtree's paint list, back to front, to `out`.
    ///
    /// Disabled or invisible subtrees are skipped. Nodes without an image,
    /// or with a blank one, are left out while their children still paint.
    /// Images are regenerated as needed.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `root` does not exist.
    pub fn collect_visible(&mut self, root: NodeId, out: &mut Vec<PaintEntry>) -> TreeResult<()> {
        if !self.is_displayed(root)? {
            return Ok(());
        }
        self.collect_into(root, out);
        Ok(())
    }

    fn collect_into(&mut self, id: NodeId, out: &mut Vec<PaintEntry>) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.flags.has(NodeFlags::ENABLED) || !node.flags.has(NodeFlags::VISIBLE) {
            return;
        }
        let order = node.render_order;

        if order.paints_before() {
            self.push_paint(id, out);
        }
        let mut index = 0;
        while let Some(child) = self.children(id).get(index).copied() {
            self.collect_into(child, out);
            index += 1;
        }
        if order.paints_after() {
            self.push_paint(id, out);
        }
    }

    fn push_paint(&mut self, id: NodeId, out: &mut Vec<PaintEntry>) {
        if let Ok(Some(image)) = self.image(id) {
            if !image.is_blank() {
                out.push(PaintEntry { node: id, image });
            }
        }
    }

    // =========================================================================
    // Theming
    // =========================================================================

    /// Theme used when no ancestor overrides it.
    #[must_use]
    pub fn default_theme(&self) -> &Theme {
        &self.default_theme
    }

    /// Replaces the fallback theme and marks inheriting nodes modified.
    pub fn set_default_theme(&mut self, theme: Theme) {
        self.default_theme = theme;
        self.mark_inheriting_modified(self.root);
    }

    /// Effective theme: the nearest override up the ancestor chain.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn theme(&self, id: NodeId) -> TreeResult<Theme> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            if let Some(theme) = node.theme {
                return Ok(theme);
            }
            current = node.parent;
        }
        Ok(self.default_theme)
    }

    /// Sets or clears a node's theme override. The node and every descendant
    /// that inherits from it are marked modified.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn set_theme(&mut self, id: NodeId, theme: Option<Theme>) -> TreeResult<()> {
        self.node_mut(id)?.theme = theme;
        self.mark_inheriting_modified(id);
        Ok(())
    }

    fn mark_inheriting_modified(&mut self, id: NodeId) {
        let _ = self.mark_modified(id);
        let children = self.children(id).to_vec();
        for child in children {
            let inherits = self.nodes.get(&child).is_some_and(|node| node.theme.is_none());
            if inherits {
                self.mark_inheriting_modified(child);
            }
        }
    }

    // =========================================================================
    // Interaction flags
    // =========================================================================

    /// Opts a node in or out of hover / press / click.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn set_interactive(&mut self, id: NodeId, interactive: bool) -> TreeResult<()> {
        self.node_mut(id)?.flags.assign(NodeFlags::INTERACTIVE, interactive);
        Ok(())
    }

    /// Lets a node take focus when pressed.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn set_focusable(&mut self, id: NodeId, focusable: bool) -> TreeResult<()> {
        self.node_mut(id)?.flags.assign(NodeFlags::FOCUSABLE, focusable);
        Ok(())
    }

    /// Makes pointer interaction use pixel-perfect hit tests.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownNode`] if `id` does not exist.
    pub fn set_pixel_perfect(&mut self, id: NodeId, pixel_perfect: bool) -> TreeResult<()> {
        self.node_mut(id)?.flags.assign(NodeFlags::PIXEL_PERFECT, pixel_perfect);
        Ok(())
    }

    // =========================================================================
    // Events & traversal
    // =========================================================================

    /// Subscribes to node events.
    pub fn subscribe(&mut self) -> NodeEventReceiver {
        self.events.subscribe(EVENT_CHANNEL_CAPACITY)
    }

    /// A detached pre-order cursor starting at `root`.
    #[must_use]
    pub fn walker(&self, root: NodeId) -> Walker {
        Walker::new(root)
    }

    /// Borrowing pre-order iterator over `root` and its descendants.
    #[must_use]
    pub fn iter(&self, root: NodeId) -> Iter<'_> {
        Iter::new(self, root)
    }

    /// The image backend.
    #[must_use]
    pub fn backend(&self) -> &dyn ImageBackend {
        self.backend.as_ref()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    pub(super) fn node(&self, id: NodeId) -> TreeResult<&Node> {
        self.nodes.get(&id).ok_or(TreeError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> TreeResult<&mut Node> {
        self.nodes.get_mut(&id).ok_or(TreeError::UnknownNode(id))
    }

    fn parent_size(&self, parent: Option<NodeId>) -> Size {
        parent
            .and_then(|parent| self.size(parent).ok())
            .unwrap_or(self.viewport)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        self.events.emit(NodeEvent::ChildAdded { parent, child });
        self.events.emit(NodeEvent::Attached { node: child, parent });
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
        self.events.emit(NodeEvent::ChildRemoved { parent, child });
        self.events.emit(NodeEvent::Detached { node: child, parent });
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
                self.interaction.forget(current);
            }
        }
        self.events.emit(NodeEvent::Removed { node: id });
    }

    fn propagate_enabled(&mut self, id: NodeId, enabled: bool) {
        self.events.emit(NodeEvent::EnabledChanged { node: id, enabled });
        let children = self.children(id).to_vec();
        for child in children {
            let locally_enabled = self
                .nodes
                .get(&child)
                .is_some_and(|node| node.flags.has(NodeFlags::ENABLED));
            if locally_enabled {
                self.propagate_enabled(child, enabled);
            }
        }
    }

    /// Resize path: the node's size changed.
    fn notify_resized(&mut self, id: NodeId) {
        self.invalidate_positions(id);
        self.events.emit(NodeEvent::Resized { node: id });
        let children = self.children(id).to_vec();
        for child in children {
            self.events.emit(NodeEvent::ParentResized { node: child });
        }
    }

    /// Puts content back after an update hook, following layout changes.
    pub(super) fn restore_content(&mut self, id: NodeId, content: Box<dyn NodeContent>) {
        let layout = content.layout();
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.content = Some(content);
        if node.layout != layout {
            node.layout = layout;
            self.notify_resized(id);
        }
    }
}

impl std::fmt::Debug for NodeTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeTree")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}
