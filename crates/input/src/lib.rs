//! Input: held keys and buttons, mouse motion, key bindings.
//!
//! # Invariants
//! - While the UI captures the keyboard (or mouse), no key (or button) reads
//!   as held or pressed.
//! - The window system is mapped in the app; nothing here depends on it.

pub mod action;
pub mod state;

pub use action::{Action, Key, KeyBindings, MouseButton};
pub use state::InputState;

pub fn crate_info() -> &'static str {
    "lumen-input v0.1.0"
}
