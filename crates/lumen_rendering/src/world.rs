//! Game-object world read by the camera.
//!
//! The world is owned and moved by the physics step; the camera only reads
//! back transformed positions once per frame.

use lumen_core::{Size, Vec2};
use lumen_ui::{Image, ImageRef};

/// A drawable object in world space.
#[derive(Debug, Clone)]
pub struct WorldObject {
    /// World position of the object's center.
    pub position: Vec2,
    /// Rotation in radians, clockwise.
    pub rotation: f32,
    /// Image drawn for the object. Its size is the object's bounds.
    pub image: ImageRef,
}

impl WorldObject {
    /// Creates an unrotated object.
    #[must_use]
    pub fn new(position: Vec2, image: ImageRef) -> Self {
        Self {
            position,
            rotation: 0.0,
            image,
        }
    }

    /// Sets the rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Bounding size, taken from the image.
    #[must_use]
    pub fn size(&self) -> Size {
        self.image.size()
    }
}

/// Source of world objects for a frame.
pub trait World {
    /// Objects in draw order; later objects are drawn on top.
    fn objects(&self) -> &[WorldObject];
}

/// Plain list of objects, for worlds that need nothing smarter.
#[derive(Debug, Clone, Default)]
pub struct SpriteWorld {
    objects: Vec<WorldObject>,
}

impl SpriteWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an object and returns its index.
    pub fn push(&mut self, object: WorldObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Mutable access to one object.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut WorldObject> {
        self.objects.get_mut(index)
    }

    /// Mutable access to every object, for physics.
    pub fn objects_mut(&mut self) -> &mut [WorldObject] {
        &mut self.objects
    }

    /// Removes every object.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the world holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl World for SpriteWorld {
    fn objects(&self) -> &[WorldObject] {
        &self.objects
    }
}
