//! Shared types for the lumen renderer.
//!
//! # Invariants
//! - `Transform` matrices are derived state; reading them never changes the
//!   position, rotation or scale a caller observes.
//! - Entity ids are allocated sequentially and never reused within a scene.

pub mod controls;
pub mod transform;
pub mod types;

pub use controls::CameraControls;
pub use transform::Transform;
pub use types::EntityId;
