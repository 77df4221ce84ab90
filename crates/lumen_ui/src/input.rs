//! Polled pointer input.
//!
//! The host records device events into an [`InputState`]; the node tree
//! reads it once per frame to derive hover, press, click and focus.

use lumen_core::Vec2;

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Right mouse button.
    Right,
    /// Middle mouse button.
    Middle,
}

/// Pointer state for the current frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Pointer position in screen pixels.
    pub pointer: Vec2,
    buttons_pressed: u8,
    buttons_released: u8,
    buttons_down: u8,
}

impl InputState {
    /// Creates a new empty input state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins a new frame, clearing per-frame edges.
    pub fn begin_frame(&mut self) {
        self.buttons_pressed = 0;
        self.buttons_released = 0;
    }

    /// Updates the pointer position.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pointer = Vec2::new(x, y);
    }

    /// Records a button press.
    pub fn press(&mut self, button: MouseButton) {
        let mask = Self::button_mask(button);
        self.buttons_pressed |= mask;
        self.buttons_down |= mask;
    }

    /// Records a button release.
    pub fn release(&mut self, button: MouseButton) {
        let mask = Self::button_mask(button);
        self.buttons_released |= mask;
        self.buttons_down &= !mask;
    }

    /// Returns true if the button went down this frame.
    #[must_use]
    pub fn pressed(&self, button: MouseButton) -> bool {
        (self.buttons_pressed & Self::button_mask(button)) != 0
    }

    /// Returns true if the button went up this frame.
    #[must_use]
    pub fn released(&self, button: MouseButton) -> bool {
        (self.buttons_released & Self::button_mask(button)) != 0
    }

    /// Returns true if the button is currently held.
    #[must_use]
    pub fn is_down(&self, button: MouseButton) -> bool {
        (self.buttons_down & Self::button_mask(button)) != 0
    }

    const fn button_mask(button: MouseButton) -> u8 {
        match button {
            MouseButton::Left => 1,
            MouseButton::Right => 2,
            MouseButton::Middle => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release_edges() {
        let mut input = InputState::new();

        input.press(MouseButton::Left);
        assert!(input.pressed(MouseButton::Left));
        assert!(input.is_down(MouseButton::Left));

        input.begin_frame();
        assert!(!input.pressed(MouseButton::Left));
        assert!(input.is_down(MouseButton::Left));

        input.release(MouseButton::Left);
        assert!(input.released(MouseButton::Left));
        assert!(!input.is_down(MouseButton::Left));
    }

    #[test]
    fn test_buttons_are_independent() {
        let mut input = InputState::new();
        input.press(MouseButton::Right);
        input.set_pointer(3.0, 4.0);

        assert!(input.pressed(MouseButton::Right));
        assert!(!input.pressed(MouseButton::Left));
        assert_eq!(input.pointer, Vec2::new(3.0, 4.0));

        input.begin_frame();
        assert!(input.is_down(MouseButton::Right));
        assert_eq!(input.pointer, Vec2::new(3.0, 4.0));
    }
}
