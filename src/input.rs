//! Pointer input for the chain head.
//!
//! [`Pointer`] turns raw pixel-space pointer events into a [`PointerState`]:
//! normalized coordinates in `[-1, 1]` (Y up) plus a pressed flag. The
//! runner owns the pointer and hands a copy of its state to every frame.
//!
//! ```ignore
//! let mut pointer = Pointer::new(Viewport::new(800, 600));
//! pointer.on_press(400.0, 300.0);
//! assert!(pointer.state().pressed);
//! ```

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};

/// Size of the render surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A viewport with no area cannot normalize anything.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Factor stretching normalized pointer coordinates along the longer
    /// axis so the head follows the cursor on non-square surfaces.
    pub fn pointer_stretch(&self) -> Vec2 {
        if self.is_empty() {
            return Vec2::ONE;
        }
        let (w, h) = (self.width as f32, self.height as f32);
        if h < w {
            Vec2::new(w / h, 1.0)
        } else {
            Vec2::new(1.0, h / w)
        }
    }

    /// Factor squashing clip-space positions along the longer axis so the
    /// chain keeps its proportions. Inverse of [`Viewport::pointer_stretch`].
    pub fn clip_squash(&self) -> Vec2 {
        self.pointer_stretch().recip()
    }
}

/// Latest pointer position and button state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    /// Normalized X in `[-1, 1]`, left to right.
    pub x: f32,
    /// Normalized Y in `[-1, 1]`, bottom to top.
    pub y: f32,
    pub pressed: bool,
}

impl PointerState {
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Packed as `[x, y, pressed, 0]` for the simulation uniform.
    pub fn to_uniform(&self) -> [f32; 4] {
        [self.x, self.y, if self.pressed { 1.0 } else { 0.0 }, 0.0]
    }
}

/// Translates pointer events into [`PointerState`].
#[derive(Debug, Default)]
pub struct Pointer {
    state: PointerState,
    viewport: Viewport,
    // Last cursor position in pixels; button events carry none of their own.
    cursor: Vec2,
}

impl Pointer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Default::default()
        }
    }

    #[inline]
    pub fn state(&self) -> PointerState {
        self.state
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Pointer moved to `(x, y)` pixels.
    pub fn on_move(&mut self, x: f32, y: f32) {
        self.update(x, y, None);
    }

    /// Button went down at `(x, y)` pixels.
    pub fn on_press(&mut self, x: f32, y: f32) {
        self.update(x, y, Some(true));
    }

    /// Button went up at `(x, y)` pixels.
    pub fn on_release(&mut self, x: f32, y: f32) {
        self.update(x, y, Some(false));
    }

    fn update(&mut self, x: f32, y: f32, pressed: Option<bool>) {
        if self.viewport.is_empty() {
            return;
        }
        let w = self.viewport.width as f32;
        let h = self.viewport.height as f32;
        let x = x.clamp(0.0, w);
        let y = y.clamp(0.0, h);

        self.cursor = Vec2::new(x, y);
        self.state.x = x / w * 2.0 - 1.0;
        self.state.y = -(y / h * 2.0 - 1.0);
        if let Some(pressed) = pressed {
            self.state.pressed = pressed;
        }
    }

    /// Process a winit window event. Returns `true` if the pointer used it.
    pub fn handle_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.on_move(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let Vec2 { x, y } = self.cursor;
                match state {
                    ElementState::Pressed => self.on_press(x, y),
                    ElementState::Released => self.on_release(x, y),
                }
                true
            }
            WindowEvent::Resized(size) => {
                self.set_viewport(Viewport::new(size.width, size.height));
                false
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_normalizes_with_y_up() {
        let mut pointer = Pointer::new(Viewport::new(800, 600));

        pointer.on_move(400.0, 300.0);
        assert!(pointer.state().x.abs() < 1e-6);
        assert!(pointer.state().y.abs() < 1e-6);

        pointer.on_move(0.0, 0.0);
        assert_eq!(pointer.state().position(), Vec2::new(-1.0, 1.0));

        pointer.on_move(800.0, 600.0);
        assert_eq!(pointer.state().position(), Vec2::new(1.0, -1.0));
        assert!(!pointer.state().pressed);
    }

    #[test]
    fn test_press_and_release() {
        let mut pointer = Pointer::new(Viewport::new(100, 100));

        pointer.on_press(25.0, 75.0);
        assert!(pointer.state().pressed);
        assert_eq!(pointer.state().position(), Vec2::new(-0.5, -0.5));

        // Moving keeps the button state
        pointer.on_move(50.0, 50.0);
        assert!(pointer.state().pressed);

        pointer.on_release(100.0, 0.0);
        assert!(!pointer.state().pressed);
        assert_eq!(pointer.state().position(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_coordinates_clamped_to_viewport() {
        let mut pointer = Pointer::new(Viewport::new(200, 100));
        pointer.on_move(-50.0, 500.0);
        assert_eq!(pointer.state().position(), Vec2::new(-1.0, -1.0));
    }

    #[test]
    fn test_empty_viewport_is_noop() {
        let mut pointer = Pointer::new(Viewport::new(100, 100));
        pointer.on_press(50.0, 50.0);
        let before = pointer.state();

        pointer.set_viewport(Viewport::new(0, 100));
        pointer.on_release(10.0, 10.0);
        pointer.on_move(90.0, 90.0);

        assert_eq!(pointer.state(), before);
        assert!(pointer.state().x.is_finite());
    }

    #[test]
    fn test_uniform_packing() {
        let state = PointerState {
            x: 0.25,
            y: -0.5,
            pressed: true,
        };
        assert_eq!(state.to_uniform(), [0.25, -0.5, 1.0, 0.0]);
    }

    #[test]
    fn test_aspect_factors() {
        let wide = Viewport::new(1600, 800);
        assert_eq!(wide.pointer_stretch(), Vec2::new(2.0, 1.0));
        assert_eq!(wide.clip_squash(), Vec2::new(0.5, 1.0));

        let tall = Viewport::new(500, 1000);
        assert_eq!(tall.pointer_stretch(), Vec2::new(1.0, 2.0));
        assert_eq!(tall.clip_squash(), Vec2::new(1.0, 0.5));

        assert_eq!(Viewport::new(0, 0).pointer_stretch(), Vec2::ONE);
    }
}
