//! Scene model: what gets drawn and from where.
//!
//! # Invariants
//! - Entities only reference meshes and materials that exist in the scene.
//! - There is always at least one camera; the active index is in range.
//! - Entity iteration order is creation order.

pub mod camera;
pub mod config;
pub mod entity;
pub mod light;
pub mod material;
pub mod scene;

pub use camera::{Camera, Projection};
pub use config::SceneConfig;
pub use entity::{Entity, Sky};
pub use light::{Light, LightKind, MAX_LIGHTS, MIN_SPOT_CONE_GAP};
pub use material::{
    AddressMode, FilterMode, Material, MaterialHandle, SamplerSettings, ShadingModel, TextureSlot,
};
pub use scene::{Scene, SceneError};
