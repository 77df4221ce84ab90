//! Colors and themes.
//!
//! A node without its own theme inherits the nearest ancestor's; the tree
//! holds the fallback for the root.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// RGBA color, components in 0-1.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Solid black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Magenta used for missing content.
    pub const PLACEHOLDER: Self = Self::rgba(1.0, 0.0, 1.0, 1.0);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGB values (0-1) with full alpha.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates a color from a packed `0xRRGGBBAA` value.
    #[must_use]
    pub fn hex(hex: u32) -> Self {
        let channel = |shift: u32| f32::from(((hex >> shift) & 0xFF) as u8) / 255.0;
        Self::rgba(channel(24), channel(16), channel(8), channel(0))
    }

    /// Returns a new color with different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Returns true if the color contributes nothing when drawn.
    #[must_use]
    pub fn is_transparent(self) -> bool {
        self.a <= 0.0
    }

    /// Alpha quantized to a byte.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn alpha_u8(self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// Linearly interpolates between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// Converts to array format.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Palette consulted by theme-aware node content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Backdrop behind everything.
    pub background: Color,
    /// Panels and cards.
    pub surface: Color,
    /// Primary accent.
    pub primary: Color,
    /// Secondary accent.
    pub secondary: Color,
    /// Text color.
    pub text: Color,
    /// Muted text color.
    pub text_muted: Color,
    /// Borders and separators.
    pub border: Color,
    /// Tint for hovered or focused nodes.
    pub highlight: Color,
}

impl Theme {
    /// Dark palette.
    pub const DARK: Self = Self {
        background: Color::rgba(0.02, 0.02, 0.03, 1.0),
        surface: Color::rgba(0.08, 0.08, 0.11, 1.0),
        primary: Color::rgba(0.2, 0.9, 1.0, 1.0),
        secondary: Color::rgba(1.0, 0.2, 0.6, 1.0),
        text: Color::rgba(0.9, 0.9, 0.9, 1.0),
        text_muted: Color::rgba(0.5, 0.5, 0.5, 1.0),
        border: Color::rgba(0.15, 0.2, 0.25, 1.0),
        highlight: Color::rgba(1.0, 1.0, 1.0, 0.15),
    };

    /// Light palette.
    pub const LIGHT: Self = Self {
        background: Color::rgba(0.95, 0.95, 0.96, 1.0),
        surface: Color::rgba(1.0, 1.0, 1.0, 1.0),
        primary: Color::rgba(0.0, 0.45, 0.85, 1.0),
        secondary: Color::rgba(0.85, 0.1, 0.45, 1.0),
        text: Color::rgba(0.1, 0.1, 0.12, 1.0),
        text_muted: Color::rgba(0.45, 0.45, 0.5, 1.0),
        border: Color::rgba(0.8, 0.8, 0.85, 1.0),
        highlight: Color::rgba(0.0, 0.0, 0.0, 0.08),
    };
}

impl Default for Theme {
    fn default() -> Self {
        Self::DARK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_lerp() {
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);

        assert!((mid.r - 0.5).abs() < 0.01);
        assert!((mid.g - 0.5).abs() < 0.01);
        assert!((mid.b - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_color_hex() {
        let color = Color::hex(0xFF00_00FF);
        assert!((color.r - 1.0).abs() < 0.01);
        assert!(color.g.abs() < 0.01);
        assert!((color.a - 1.0).abs() < 0.01);
        assert_eq!(color.alpha_u8(), 255);
    }

    #[test]
    fn test_transparent() {
        assert!(Color::TRANSPARENT.is_transparent());
        assert!(!Color::WHITE.with_alpha(0.01).is_transparent());
    }
}
