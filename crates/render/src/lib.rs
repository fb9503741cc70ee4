//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate the scene.
//! - Everything a backend draws in a frame comes from one [`FramePacket`].

mod frame;
mod renderer;

pub use frame::{DrawItem, FrameCamera, FramePacket};
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "lumen-render v0.1.0"
}
