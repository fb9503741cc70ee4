use crate::action::{Action, Key, KeyBindings, MouseButton};
use glam::{Vec2, Vec3};
use lumen_common::CameraControls;
use std::collections::HashSet;

/// Input accumulated over one frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held_keys: HashSet<Key>,
    pressed_keys: HashSet<Key>,
    held_buttons: HashSet<MouseButton>,
    mouse_delta: Vec2,
    keyboard_captured: bool,
    mouse_captured: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key transition. Repeats of a held key are not new presses.
    pub fn key_event(&mut self, key: Key, pressed: bool) {
        if pressed {
            if self.held_keys.insert(key) {
                self.pressed_keys.insert(key);
            }
        } else {
            self.held_keys.remove(&key);
        }
    }

    pub fn mouse_button_event(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.held_buttons.insert(button);
        } else {
            self.held_buttons.remove(&button);
        }
    }

    /// Accumulate raw mouse motion in pixels.
    pub fn mouse_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta += Vec2::new(dx, dy);
    }

    /// While set, keys read as released.
    pub fn set_keyboard_capture(&mut self, captured: bool) {
        self.keyboard_captured = captured;
    }

    /// While set, mouse buttons read as released.
    pub fn set_mouse_capture(&mut self, captured: bool) {
        self.mouse_captured = captured;
    }

    pub fn keyboard_captured(&self) -> bool {
        self.keyboard_captured
    }

    pub fn mouse_captured(&self) -> bool {
        self.mouse_captured
    }

    pub fn key_down(&self, key: Key) -> bool {
        !self.keyboard_captured && self.held_keys.contains(&key)
    }

    /// Whether `key` went down this frame.
    pub fn key_pressed(&self, key: Key) -> bool {
        !self.keyboard_captured && self.pressed_keys.contains(&key)
    }

    pub fn mouse_down(&self, button: MouseButton) -> bool {
        !self.mouse_captured && self.held_buttons.contains(&button)
    }

    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Actions whose keys went down this frame.
    pub fn actions(&self, bindings: &KeyBindings) -> Vec<Action> {
        if self.keyboard_captured {
            return Vec::new();
        }
        let mut actions: Vec<Action> = self
            .pressed_keys
            .iter()
            .filter_map(|k| bindings.action_for(*k))
            .collect();
        actions.sort_by_key(|a| *a as u8);
        actions.dedup();
        actions
    }

    /// Fly-camera intent: W/S forward and back, A/D strafe, Q/E world up
    /// and down, Shift boost, look while the left button is held.
    pub fn camera_controls(&self) -> CameraControls {
        let axis = |positive: Key, negative: Key| -> f32 {
            (self.key_down(positive) as i32 - self.key_down(negative) as i32) as f32
        };
        CameraControls {
            local: Vec3::new(axis(Key::D, Key::A), 0.0, axis(Key::S, Key::W)),
            vertical: axis(Key::Q, Key::E),
            look_delta: self.mouse_delta,
            looking: self.mouse_down(MouseButton::Left),
            boost: self.key_down(Key::LeftShift) || self.key_down(Key::RightShift),
        }
    }

    /// Clear per-frame state: press edges and mouse motion.
    pub fn end_frame(&mut self) {
        self.pressed_keys.clear();
        self.mouse_delta = Vec2::ZERO;
    }

    /// Forget everything held, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held_keys.clear();
        self.held_buttons.clear();
        self.end_frame();
    }
}
