//! Developer Tooling: scene inspector and frame timing.
//!
//! # Invariants
//! - Tools only read the scene.

pub mod frame_stats;
pub mod inspector;

pub use frame_stats::FrameStats;
pub use inspector::{EntityInfo, LightInfo, MeshStats, SceneInspector, SceneSummary};

pub fn crate_info() -> &'static str {
    "lumen-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
