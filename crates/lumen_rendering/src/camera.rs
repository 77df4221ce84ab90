//! # Camera
//!
//! Producer side of the render pipeline plus the handle for the consumer
//! side.
//!
//! ```text
//! update timeline                         any thread
//! ───────────────                         ──────────
//! prepare(tree, world)
//!   cull world objects (view bounds)
//!   collect node paint list
//!   ┌ lock ─ resize from/to pool ─ fill ┐
//!   └───────────────────────────────────┘ consume(sink)
//!   invalidate screen positions             ┌ lock ─ copy ┐
//!                                           └─────────────┘
//!                                           sink.draw(copy, background)
//! ```
//!
//! The list lock is the only thing both sides share. It is never held
//! while a sink runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lumen_core::{ObjectPool, Size, SnapshotList, Vec2};
use lumen_ui::{Color, ImageRef, NodeTree, PaintEntry, SolidImage};
use parking_lot::RwLock;

use crate::culling::ViewBounds;
use crate::draw::DrawEntry;
use crate::sink::DisplaySink;
use crate::stats::RenderStats;
use crate::world::{World, WorldObject};

/// Renders a node tree and an optional world into a pooled draw list.
///
/// `Camera` itself stays on the update timeline. Hand
/// [`Camera::consumer`] to whichever thread pushes frames to the display.
#[derive(Debug)]
pub struct Camera {
    /// World position the view is centered on.
    position: Vec2,
    viewport: Size,
    pool: ObjectPool<DrawEntry>,
    consumer: FrameConsumer,
    /// Scratch: indices of world objects that passed culling.
    visible: Vec<usize>,
    /// Scratch: node paint list.
    paint: Vec<PaintEntry>,
    placeholder: Option<ImageRef>,
    stats: RenderStats,
}

impl Camera {
    /// Creates a camera showing `viewport`, with `capacity` entries already
    /// in the pool.
    #[must_use]
    pub fn new(viewport: Size, capacity: usize) -> Self {
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            capacity,
            "camera created"
        );
        Self {
            position: Vec2::ZERO,
            viewport,
            pool: ObjectPool::with_capacity(capacity),
            consumer: FrameConsumer::new(capacity),
            visible: Vec::new(),
            paint: Vec::with_capacity(capacity),
            placeholder: None,
            stats: RenderStats::default(),
        }
    }

    /// World position the view is centered on.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the view.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Viewport size in pixels.
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// Resizes the viewport. The tree's own viewport is set separately.
    pub fn set_viewport(&mut self, viewport: Size) {
        if viewport != self.viewport {
            self.viewport = viewport;
            self.placeholder = None;
        }
    }

    /// Color the sink clears to.
    #[must_use]
    pub fn background(&self) -> Color {
        *self.consumer.background.read()
    }

    /// Sets the clear color. Consumers pick it up on their next call.
    pub fn set_background(&self, color: Color) {
        *self.consumer.background.write() = color;
    }

    /// Statistics of the last [`prepare`](Self::prepare).
    #[must_use]
    pub const fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Entries waiting in the pool.
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.pool.available()
    }

    /// Current draw list length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.consumer.list.len()
    }

    /// Returns true if the draw list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.consumer.list.is_empty()
    }

    /// Handle for the consumer side.
    #[must_use]
    pub fn consumer(&self) -> FrameConsumer {
        self.consumer.clone()
    }

    /// Builds this frame's draw list.
    ///
    /// With a world attached the list is every world object inside the view
    /// bounds (in world order) followed by the tree's paint list. Without
    /// one it is a single placeholder entry covering the viewport. Call only
    /// from the update timeline.
    pub fn prepare(&mut self, tree: &mut NodeTree, world: Option<&dyn World>) -> RenderStats {
        let frame = self.consumer.prepared.load(Ordering::Relaxed) + 1;
        let mut stats = RenderStats {
            frame,
            ..RenderStats::default()
        };

        self.visible.clear();
        self.paint.clear();

        let view = ViewBounds::new(self.position, self.viewport);
        if let Some(world) = world {
            for (index, object) in world.objects().iter().enumerate() {
                if view.test_object(object.position, object.size(), object.rotation) {
                    self.visible.push(index);
                } else {
                    stats.world_culled += 1;
                }
            }

            let root = tree.root();
            if let Err(error) = tree.collect_visible(root, &mut self.paint) {
                tracing::warn!(%error, "node paint list unavailable");
                self.paint.clear();
            }

            stats.world_drawn = count(self.visible.len());
            stats.node_entries = count(self.paint.len());
            self.fill(tree, world.objects(), &view);
        } else {
            stats.placeholder = true;
            let image = self.placeholder_image(tree);
            let center = self.viewport.half();
            let pool = &mut self.pool;
            self.consumer.list.update(|items| {
                resize(items, 1, pool);
                items[0].set(image, 0.0, center);
            });
        }

        tree.invalidate_positions(tree.root());

        stats.entries = count(self.consumer.list.len());
        stats.pooled = count(self.pool.available());
        stats.pool_created = count(self.pool.created());
        self.stats = stats;
        self.consumer.prepared.store(frame, Ordering::Release);

        tracing::trace!(
            frame,
            entries = stats.entries,
            culled = stats.world_culled,
            pooled = stats.pooled,
            "frame prepared"
        );
        stats
    }

    /// Copies the draw list and hands it to `sink`.
    ///
    /// Same as calling [`FrameConsumer::consume`] on a consumer handle.
    pub fn consume<S: DisplaySink + ?Sized>(&mut self, sink: &mut S) -> bool {
        self.consumer.consume(sink)
    }

    /// Returns every live entry to the pool, leaving the list empty.
    pub fn clear(&mut self) {
        let pool = &mut self.pool;
        self.consumer.list.update(|items| pool.release_all(items.drain(..)));
        self.stats = RenderStats::default();
        tracing::debug!(pooled = self.pool.available(), "draw list cleared");
    }

    fn fill(&mut self, tree: &NodeTree, objects: &[WorldObject], view: &ViewBounds) {
        let len = self.visible.len() + self.paint.len();
        let pool = &mut self.pool;
        let visible = &self.visible;
        let paint = &self.paint;

        self.consumer.list.update(|items| {
            resize(items, len, pool);

            let (world_items, node_items) = items.split_at_mut(visible.len());
            for (entry, &index) in world_items.iter_mut().zip(visible) {
                let object = &objects[index];
                entry.set(
                    Arc::clone(&object.image),
                    object.rotation,
                    view.to_screen(object.position),
                );
            }
            for (entry, painted) in node_items.iter_mut().zip(paint) {
                let position = tree.screen_position(painted.node).unwrap_or(Vec2::ZERO);
                entry.set(Arc::clone(&painted.image), 0.0, position);
            }
        });
    }

    fn placeholder_image(&mut self, tree: &NodeTree) -> ImageRef {
        if let Some(image) = &self.placeholder {
            return Arc::clone(image);
        }
        let image = tree
            .backend()
            .solid(self.viewport, Color::PLACEHOLDER)
            .unwrap_or_else(|error| {
                tracing::warn!(%error, "backend failed to build the placeholder");
                Arc::new(SolidImage::new(self.viewport, Color::PLACEHOLDER))
            });
        self.placeholder = Some(Arc::clone(&image));
        image
    }
}

/// Grows `items` from the pool or returns the excess to it.
fn resize(items: &mut Vec<DrawEntry>, len: usize, pool: &mut ObjectPool<DrawEntry>) {
    if items.len() > len {
        pool.release_all(items.drain(len..));
    }
    while items.len() < len {
        items.push(pool.acquire());
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Consumer side of a [`Camera`].
///
/// `Send`, so it can live on a display thread. Clones share the camera's
/// list but each keeps its own copy buffer.
#[derive(Debug)]
pub struct FrameConsumer {
    list: SnapshotList<DrawEntry>,
    background: Arc<RwLock<Color>>,
    prepared: Arc<AtomicU64>,
    buffer: Vec<DrawEntry>,
}

impl FrameConsumer {
    fn new(capacity: usize) -> Self {
        Self {
            list: SnapshotList::with_capacity(capacity),
            background: Arc::new(RwLock::new(Color::BLACK)),
            prepared: Arc::new(AtomicU64::new(0)),
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Frames prepared so far.
    #[must_use]
    pub fn prepared_frames(&self) -> u64 {
        self.prepared.load(Ordering::Acquire)
    }

    /// Snapshots the draw list, then calls `sink` with the copy and the
    /// background color.
    ///
    /// Returns false without calling the sink if nothing was prepared yet.
    pub fn consume<S: DisplaySink + ?Sized>(&mut self, sink: &mut S) -> bool {
        if self.prepared_frames() == 0 {
            return false;
        }
        self.list.snapshot_into(&mut self.buffer);
        let background = *self.background.read();

        sink.draw(&self.buffer, background);
        self.buffer.clear();
        true
    }
}

impl Clone for FrameConsumer {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
            background: Arc::clone(&self.background),
            prepared: Arc::clone(&self.prepared),
            buffer: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use lumen_ui::{Image, Panel};

    use super::*;
    use crate::sink::CountingSink;
    use crate::world::{SpriteWorld, WorldObject};

    fn solid(width: f32, height: f32) -> ImageRef {
        Arc::new(SolidImage::new(Size::new(width, height), Color::WHITE))
    }

    fn world_of(count: usize) -> SpriteWorld {
        let mut world = SpriteWorld::new();
        for i in 0..count {
            #[allow(clippy::cast_precision_loss)]
            let x = i as f32;
            world.push(WorldObject::new(Vec2::new(x, 0.0), solid(4.0, 4.0)));
        }
        world
    }

    fn setup() -> (Camera, NodeTree) {
        let viewport = Size::new(100.0, 100.0);
        (Camera::new(viewport, 4), NodeTree::new(viewport))
    }

    #[test]
    fn test_consume_before_prepare_is_noop() {
        let (mut camera, _tree) = setup();
        let mut sink = CountingSink::default();
        assert!(!camera.consume(&mut sink));
        assert_eq!(sink.frames, 0);
    }

    #[test]
    fn test_no_world_draws_placeholder() {
        let (mut camera, mut tree) = setup();
        tree.add_child(tree.root(), Panel::new(Size::new(10.0, 10.0))).unwrap();

        let stats = camera.prepare(&mut tree, None);
        assert!(stats.placeholder);
        assert_eq!(stats.entries, 1);

        let mut seen = Vec::new();
        let mut sink = |entries: &[DrawEntry], background: Color| {
            seen = entries.to_vec();
            assert_eq!(background, Color::BLACK);
        };
        assert!(camera.consume(&mut sink));
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].position, Vec2::new(50.0, 50.0));
        let image = seen[0].image.as_ref().unwrap();
        assert_eq!(image.size(), Size::new(100.0, 100.0));
    }

    #[test]
    fn test_world_then_nodes() {
        let (mut camera, mut tree) = setup();
        let panel = tree.add_child(tree.root(), Panel::new(Size::new(10.0, 10.0))).unwrap();
        let mut world = SpriteWorld::new();
        world.push(WorldObject::new(Vec2::new(0.0, 0.0), solid(8.0, 8.0)).with_rotation(0.5));
        world.push(WorldObject::new(Vec2::new(500.0, 0.0), solid(8.0, 8.0)));

        let stats = camera.prepare(&mut tree, Some(&world));
        assert_eq!(stats.world_drawn, 1);
        assert_eq!(stats.world_culled, 1);
        assert_eq!(stats.node_entries, 1);
        assert_eq!(stats.entries, 2);

        let mut seen = Vec::new();
        camera.consume(&mut |entries: &[DrawEntry], _: Color| seen = entries.to_vec());

        // World object at the view center lands at the viewport center.
        assert_eq!(seen[0].position, Vec2::new(50.0, 50.0));
        assert!((seen[0].rotation - 0.5).abs() < f32::EPSILON);
        assert_eq!(seen[1].position, tree.screen_position(panel).unwrap());
        assert_eq!(seen[1].image.as_ref().unwrap().size(), Size::new(10.0, 10.0));
    }

    #[test]
    fn test_camera_position_moves_view() {
        let (mut camera, mut tree) = setup();
        let mut world = SpriteWorld::new();
        world.push(WorldObject::new(Vec2::new(200.0, 0.0), solid(8.0, 8.0)));

        assert_eq!(camera.prepare(&mut tree, Some(&world)).world_drawn, 0);
        camera.set_position(Vec2::new(200.0, 0.0));
        assert_eq!(camera.prepare(&mut tree, Some(&world)).world_drawn, 1);
    }

    #[test]
    fn test_list_tracks_drawables_and_pool_reclaims() {
        let (mut camera, mut tree) = setup();

        camera.prepare(&mut tree, Some(&world_of(10)));
        assert_eq!(camera.len(), 10);
        let created = camera.stats().pool_created;
        assert_eq!(created, 10);
        assert_eq!(camera.pooled(), 0);

        camera.prepare(&mut tree, Some(&world_of(3)));
        assert_eq!(camera.len(), 3);
        assert_eq!(camera.pooled(), 7);

        // Growing again reuses parked entries.
        camera.prepare(&mut tree, Some(&world_of(10)));
        assert_eq!(camera.len(), 10);
        assert_eq!(camera.stats().pool_created, created);
    }

    #[test]
    fn test_shrink_releases_images() {
        let (mut camera, mut tree) = setup();
        let image = solid(4.0, 4.0);
        let mut world = SpriteWorld::new();
        world.push(WorldObject::new(Vec2::ZERO, Arc::clone(&image)));

        camera.prepare(&mut tree, Some(&world));
        assert_eq!(Arc::strong_count(&image), 3);

        world.clear();
        camera.prepare(&mut tree, Some(&world));
        assert_eq!(Arc::strong_count(&image), 1);
    }

    #[test]
    fn test_hidden_nodes_are_not_drawn() {
        let (mut camera, mut tree) = setup();
        let panel = tree.add_child(tree.root(), Panel::new(Size::new(10.0, 10.0))).unwrap();
        let world = SpriteWorld::new();

        assert_eq!(camera.prepare(&mut tree, Some(&world)).entries, 1);
        tree.set_visible(panel, false).unwrap();
        assert_eq!(camera.prepare(&mut tree, Some(&world)).entries, 0);
    }

    #[test]
    fn test_clear_returns_everything() {
        let (mut camera, mut tree) = setup();
        camera.prepare(&mut tree, Some(&world_of(6)));
        camera.clear();
        assert!(camera.is_empty());
        assert_eq!(camera.pooled(), 6);
    }

    #[test]
    fn test_background_reaches_consumer() {
        let (mut camera, mut tree) = setup();
        let mut consumer = camera.consumer();
        camera.set_background(Color::WHITE);
        camera.prepare(&mut tree, None);

        let mut background = Color::TRANSPARENT;
        consumer.consume(&mut |_: &[DrawEntry], color: Color| background = color);
        assert_eq!(background, Color::WHITE);
        assert_eq!(consumer.prepared_frames(), 1);
    }

    #[test]
    fn test_concurrent_consume_never_sees_torn_list() {
        // In frame k every entry's image is k pixels wide and the list holds
        // k entries, so a consistent snapshot always has width == len.
        let (mut camera, mut tree) = setup();
        let worlds: Vec<SpriteWorld> = (0..20)
            .map(|k| {
                let mut world = SpriteWorld::new();
                for _ in 0..k {
                    #[allow(clippy::cast_precision_loss)]
                    let width = k as f32;
                    world.push(WorldObject::new(Vec2::ZERO, solid(width, 1.0)));
                }
                world
            })
            .collect();

        camera.prepare(&mut tree, Some(&worlds[0]));
        let mut consumer = camera.consumer();

        let reader = thread::spawn(move || {
            let mut checked = 0;
            for _ in 0..1000 {
                consumer.consume(&mut |entries: &[DrawEntry], _: Color| {
                    #[allow(clippy::cast_precision_loss)]
                    let len = entries.len() as f32;
                    for entry in entries {
                        let width = entry.image.as_ref().map_or(-1.0, |image| image.size().width);
                        assert!((width - len).abs() < f32::EPSILON);
                    }
                });
                checked += 1;
            }
            checked
        });

        for frame in 0..1000 {
            camera.prepare(&mut tree, Some(&worlds[frame % worlds.len()]));
        }

        assert_eq!(reader.join().unwrap(), 1000);
    }
}
