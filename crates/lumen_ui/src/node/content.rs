//! Node content: the one capability every node kind implements.
//!
//! Content decides WHAT pixels a node has; the tree decides WHEN they are
//! produced. During a hook the content is taken out of its node and handed
//! a [`NodeContext`] with full access to the tree, so hooks may restructure
//! the tree. Marking the node itself modified from inside `generate` is
//! ignored (the node is modify-locked).

use std::any::Any;

use lumen_core::Size;

use super::{NodeId, NodeTree};
use crate::error::GenerateError;
use crate::image::{ImageBackend, ImageRef};
use crate::input::InputState;
use crate::style::{Color, Theme};

/// How a node's content takes part in layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ContentLayout {
    /// Sized by the generated image.
    #[default]
    Image,
    /// Fixed size regardless of the image.
    Fixed(Size),
    /// Layout-only: forwards the parent's position and size.
    Transparent,
}

/// Behavior of a node kind.
pub trait NodeContent: Any {
    /// Produces the node's image. `Ok(None)` means the node draws nothing.
    ///
    /// # Errors
    ///
    /// A failure is logged by the tree; the node keeps its previous image.
    fn generate(&mut self, ctx: &mut NodeContext<'_>) -> Result<Option<ImageRef>, GenerateError>;

    /// Per-frame hook, called parents-first for enabled nodes.
    fn update(&mut self, _ctx: &mut NodeContext<'_>, _input: &InputState, _dt: f32) {}

    /// Layout participation.
    fn layout(&self) -> ContentLayout {
        ContentLayout::Image
    }

    /// Downcasting support for [`NodeTree::update_content`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Access to the tree from inside a content hook.
pub struct NodeContext<'a> {
    tree: &'a mut NodeTree,
    id: NodeId,
}

impl<'a> NodeContext<'a> {
    pub(crate) fn new(tree: &'a mut NodeTree, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// The node whose hook is running.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree.
    #[must_use]
    pub fn tree(&self) -> &NodeTree {
        &*self.tree
    }

    /// Mutable tree access.
    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut *self.tree
    }

    /// Effective theme of the node.
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.tree
            .theme(self.id)
            .unwrap_or_else(|_| *self.tree.default_theme())
    }

    /// Image factory.
    #[must_use]
    pub fn backend(&self) -> &dyn ImageBackend {
        self.tree.backend()
    }

    /// Marks this node modified. Ignored while its image is being generated.
    pub fn mark_modified(&mut self) {
        // The node exists while its own hook runs.
        let _ = self.tree.mark_modified(self.id);
    }
}

impl std::fmt::Debug for NodeContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeContext").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Layout-only node. Draws nothing.
///
/// Without a size it is transparent to positioning: children are placed as
/// if they were attached to its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Structure {
    size: Option<Size>,
}

impl Structure {
    /// A transparent structure node.
    #[must_use]
    pub const fn new() -> Self {
        Self { size: None }
    }

    /// A structure node with its own size.
    #[must_use]
    pub const fn sized(size: Size) -> Self {
        Self { size: Some(size) }
    }

    /// Changes the size; `None` makes the node transparent.
    pub fn set_size(&mut self, size: Option<Size>) {
        self.size = size;
    }
}

impl NodeContent for Structure {
    fn generate(&mut self, _ctx: &mut NodeContext<'_>) -> Result<Option<ImageRef>, GenerateError> {
        Ok(None)
    }

    fn layout(&self) -> ContentLayout {
        self.size.map_or(ContentLayout::Transparent, ContentLayout::Fixed)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Solid rectangle. Uses the theme's surface color unless given one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    size: Size,
    color: Option<Color>,
}

impl Panel {
    /// A themed panel of `size`.
    #[must_use]
    pub const fn new(size: Size) -> Self {
        Self { size, color: None }
    }

    /// Overrides the fill color.
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Panel size.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Changes the size.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Changes the fill color; `None` follows the theme.
    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }
}

impl NodeContent for Panel {
    fn generate(&mut self, ctx: &mut NodeContext<'_>) -> Result<Option<ImageRef>, GenerateError> {
        let color = self.color.unwrap_or_else(|| ctx.theme().surface);
        ctx.backend().solid(self.size, color).map(Some)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

type GenerateFn = Box<dyn FnMut(&mut NodeContext<'_>) -> Result<Option<ImageRef>, GenerateError>>;
type UpdateFn = Box<dyn FnMut(&mut NodeContext<'_>, &InputState, f32)>;

/// Closure-backed content.
pub struct Custom {
    generate: GenerateFn,
    update: Option<UpdateFn>,
    layout: ContentLayout,
}

impl Custom {
    /// Content whose image comes from `generate`.
    pub fn new<F>(generate: F) -> Self
    where
        F: FnMut(&mut NodeContext<'_>) -> Result<Option<ImageRef>, GenerateError> + 'static,
    {
        Self {
            generate: Box::new(generate),
            update: None,
            layout: ContentLayout::Image,
        }
    }

    /// Adds a per-frame hook.
    #[must_use]
    pub fn with_update<F>(mut self, update: F) -> Self
    where
        F: FnMut(&mut NodeContext<'_>, &InputState, f32) + 'static,
    {
        self.update = Some(Box::new(update));
        self
    }

    /// Overrides layout participation.
    #[must_use]
    pub fn with_layout(mut self, layout: ContentLayout) -> Self {
        self.layout = layout;
        self
    }
}

impl NodeContent for Custom {
    fn generate(&mut self, ctx: &mut NodeContext<'_>) -> Result<Option<ImageRef>, GenerateError> {
        (self.generate)(ctx)
    }

    fn update(&mut self, ctx: &mut NodeContext<'_>, input: &InputState, dt: f32) {
        if let Some(update) = self.update.as_mut() {
            update(ctx, input, dt);
        }
    }

    fn layout(&self) -> ContentLayout {
        self.layout
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl std::fmt::Debug for Custom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Custom")
            .field("layout", &self.layout)
            .field("has_update", &self.update.is_some())
            .finish_non_exhaustive()
    }
}
