//! Image handles produced by node content.
//!
//! The tree never looks at pixel contents beyond three questions: how big is
//! it, is it blank, and what is the alpha at a pixel (for pixel-perfect hit
//! testing). Everything else belongs to the [`ImageBackend`].

use std::sync::Arc;

use lumen_core::Size;

use crate::error::GenerateError;
use crate::style::Color;

/// A generated image. Shared between the tree and the display thread.
pub trait Image: Send + Sync + std::fmt::Debug {
    /// Size in pixels.
    fn size(&self) -> Size;

    /// Returns true if drawing the image would produce nothing.
    fn is_blank(&self) -> bool;

    /// Alpha at an image pixel; zero outside the image.
    fn alpha_at(&self, x: u32, y: u32) -> u8;
}

/// Shared image handle.
pub type ImageRef = Arc<dyn Image>;

/// Factory for images, handed to node content during generation.
pub trait ImageBackend {
    /// A rectangle filled with one color.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidSize`] for negative or non-finite sizes.
    fn solid(&self, size: Size, color: Color) -> Result<ImageRef, GenerateError>;

    /// A `width` x `height` image of `color` modulated by a per-pixel alpha
    /// mask in row-major order.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidSize`] if the mask length does not
    /// match the dimensions.
    fn mask(&self, width: u32, height: u32, color: Color, alpha: Vec<u8>) -> Result<ImageRef, GenerateError>;
}

/// Uniformly colored image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidImage {
    size: Size,
    color: Color,
}

impl SolidImage {
    /// Creates a solid image.
    #[must_use]
    pub const fn new(size: Size, color: Color) -> Self {
        Self { size, color }
    }

    /// Fill color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }
}

impl Image for SolidImage {
    fn size(&self) -> Size {
        self.size
    }

    fn is_blank(&self) -> bool {
        self.size.is_empty() || self.color.is_transparent()
    }

    #[allow(clippy::cast_precision_loss)]
    fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if (x as f32) < self.size.width && (y as f32) < self.size.height {
            self.color.alpha_u8()
        } else {
            0
        }
    }
}

/// Image with an explicit alpha mask.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskImage {
    width: u32,
    height: u32,
    color: Color,
    alpha: Vec<u8>,
}

impl MaskImage {
    /// Creates a mask image.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidSize`] if `alpha.len() != width * height`.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(width: u32, height: u32, color: Color, alpha: Vec<u8>) -> Result<Self, GenerateError> {
        if alpha.len() as u64 != u64::from(width) * u64::from(height) {
            return Err(GenerateError::InvalidSize {
                width: width as f32,
                height: height as f32,
            });
        }
        Ok(Self {
            width,
            height,
            color,
            alpha,
        })
    }

    /// Tint color.
    #[must_use]
    pub const fn color(&self) -> Color {
        self.color
    }
}

impl Image for MaskImage {
    #[allow(clippy::cast_precision_loss)]
    fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }

    fn is_blank(&self) -> bool {
        self.color.is_transparent() || self.alpha.iter().all(|&a| a == 0)
    }

    fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let index = y as usize * self.width as usize + x as usize;
        let mask = self.alpha.get(index).copied().unwrap_or(0);
        let scaled = u16::from(mask) * u16::from(self.color.alpha_u8()) / 255;
        u8::try_from(scaled).unwrap_or(u8::MAX)
    }
}

/// In-memory backend producing [`SolidImage`] and [`MaskImage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareBackend;

impl ImageBackend for SoftwareBackend {
    fn solid(&self, size: Size, color: Color) -> Result<ImageRef, GenerateError> {
        let valid = |v: f32| v.is_finite() && v >= 0.0;
        if !valid(size.width) || !valid(size.height) {
            return Err(GenerateError::InvalidSize {
                width: size.width,
                height: size.height,
            });
        }
        Ok(Arc::new(SolidImage::new(size, color)))
    }

    fn mask(&self, width: u32, height: u32, color: Color, alpha: Vec<u8>) -> Result<ImageRef, GenerateError> {
        Ok(Arc::new(MaskImage::new(width, height, color, alpha)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_blankness() {
        let backend = SoftwareBackend;
        let visible = backend.solid(Size::new(4.0, 4.0), Color::WHITE).unwrap();
        let empty = backend.solid(Size::ZERO, Color::WHITE).unwrap();
        let clear = backend.solid(Size::new(4.0, 4.0), Color::TRANSPARENT).unwrap();

        assert!(!visible.is_blank());
        assert!(empty.is_blank());
        assert!(clear.is_blank());
        assert_eq!(visible.alpha_at(3, 3), 255);
        assert_eq!(visible.alpha_at(4, 0), 0);
    }

    #[test]
    fn test_mask_alpha() {
        let image = MaskImage::new(2, 2, Color::WHITE, vec![0, 255, 128, 0]).unwrap();
        assert_eq!(image.alpha_at(0, 0), 0);
        assert_eq!(image.alpha_at(1, 0), 255);
        assert_eq!(image.alpha_at(0, 1), 128);
        assert_eq!(image.alpha_at(9, 9), 0);
        assert!(!image.is_blank());
    }

    #[test]
    fn test_mask_rejects_bad_length() {
        let result = MaskImage::new(3, 3, Color::WHITE, vec![0; 4]);
        assert!(matches!(result, Err(GenerateError::InvalidSize { .. })));
        assert!(SoftwareBackend.solid(Size::new(-1.0, 2.0), Color::WHITE).is_err());
    }
}
