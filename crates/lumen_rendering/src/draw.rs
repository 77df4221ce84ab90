//! Draw list entries.

use bytemuck::{Pod, Zeroable};
use lumen_core::{Recycle, Vec2};
use lumen_ui::{Image, ImageRef};

/// One drawable item of a frame.
///
/// Entries are pooled by the camera. The image is shared with the node or
/// world object that produced it, never copied.
#[derive(Debug, Clone, Default)]
pub struct DrawEntry {
    /// Image to draw. `None` only while the entry sits in the pool.
    pub image: Option<ImageRef>,
    /// Rotation in radians, clockwise.
    pub rotation: f32,
    /// Screen position of the image center.
    pub position: Vec2,
}

impl DrawEntry {
    /// Overwrites every field.
    #[inline]
    pub fn set(&mut self, image: ImageRef, rotation: f32, position: Vec2) {
        self.image = Some(image);
        self.rotation = rotation;
        self.position = position;
    }

    /// GPU-friendly transform of this entry.
    #[inline]
    #[must_use]
    pub fn transform(&self) -> DrawTransform {
        let (width, height) = self
            .image
            .as_ref()
            .map_or((0.0, 0.0), |image| {
                let size = image.size();
                (size.width, size.height)
            });
        DrawTransform {
            position: self.position.to_array(),
            size: [width, height],
            rotation: self.rotation,
            _padding: [0.0; 3],
        }
    }
}

impl Recycle for DrawEntry {
    fn recycle(&mut self) {
        // Pooled entries must not keep images alive.
        self.image = None;
        self.rotation = 0.0;
        self.position = Vec2::ZERO;
    }
}

/// Per-entry transform in a layout a display sink can upload as-is.
///
/// 32 bytes, 16-byte friendly.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DrawTransform {
    /// Center position (x, y).
    pub position: [f32; 2],
    /// Image size (width, height).
    pub size: [f32; 2],
    /// Rotation in radians.
    pub rotation: f32,
    _padding: [f32; 3],
}

impl DrawTransform {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

/// Packs the transforms of `entries` into `out`, reusing its allocation.
///
/// Returns the packed data as bytes.
pub fn pack_transforms<'a>(entries: &[DrawEntry], out: &'a mut Vec<DrawTransform>) -> &'a [u8] {
    out.clear();
    out.extend(entries.iter().map(DrawEntry::transform));
    bytemuck::cast_slice(out.as_slice())
}
