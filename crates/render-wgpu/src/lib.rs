//! wgpu render backend.
//!
//! Draws a [`lumen_render::FramePacket`]: every entity with its material's
//! pipeline, then the sky.
//!
//! # Invariants
//! - Renderer never mutates the scene.
//! - Bind group 0 holds per-frame data, group 1 per-draw data (dynamic
//!   offset), group 2 material textures.

mod gpu;
mod resources;
mod shaders;
mod uniforms;

pub use gpu::WgpuRenderer;
pub use resources::{DEPTH_FORMAT, GpuCubemap, GpuMesh, GpuTexture, sampler_descriptor};
pub use uniforms::{DrawUniforms, FrameUniforms, GpuLight, GpuVertex};
