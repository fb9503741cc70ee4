use glam::{Mat3, Mat4, Vec3, Vec4};
use lumen_assets::MeshHandle;
use lumen_common::EntityId;
use lumen_scene::{Light, MAX_LIGHTS, MaterialHandle, Scene, ShadingModel};

/// Camera matrices for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameCamera {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    /// Projection times the view rotation only, for the sky.
    pub sky_view_projection: Mat4,
    pub position: Vec3,
}

/// One entity to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub entity: EntityId,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
    pub shading: ShadingModel,
    pub world: Mat4,
    pub world_inverse_transpose: Mat4,
}

/// Everything a backend needs to draw one frame, extracted from a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePacket {
    pub camera: FrameCamera,
    pub ambient: Vec3,
    /// At most [`MAX_LIGHTS`], in scene order.
    pub lights: Vec<Light>,
    /// Lights that did not fit.
    pub dropped_lights: usize,
    /// Sorted by shading model, then material, then mesh.
    pub draws: Vec<DrawItem>,
    pub sky: bool,
    pub clear_color: Vec4,
}

impl FramePacket {
    pub fn extract(scene: &Scene) -> Self {
        let cam = scene.active_camera();
        let view = cam.view_matrix();
        let projection = cam.projection_matrix();
        let rotation_only = Mat4::from_mat3(Mat3::from_mat4(view));

        let all_lights = scene.lights();
        let dropped_lights = all_lights.len().saturating_sub(MAX_LIGHTS);
        if dropped_lights > 0 {
            tracing::warn!(
                total = all_lights.len(),
                max = MAX_LIGHTS,
                "too many lights, extra lights are ignored"
            );
        }

        let mut draws: Vec<DrawItem> = scene
            .entities()
            .iter()
            .map(|(id, entity)| DrawItem {
                entity: *id,
                mesh: entity.mesh(),
                material: entity.material(),
                shading: scene
                    .material(entity.material())
                    .map(|m| m.shading())
                    .unwrap_or_default(),
                world: entity.transform.world_matrix(),
                world_inverse_transpose: entity.transform.world_inverse_transpose(),
            })
            .collect();
        draws.sort_by_key(|d| (d.shading, d.material, d.mesh));

        Self {
            camera: FrameCamera {
                view,
                projection,
                view_projection: projection * view,
                sky_view_projection: projection * rotation_only,
                position: cam.position(),
            },
            ambient: scene.ambient(),
            lights: all_lights.iter().take(MAX_LIGHTS).copied().collect(),
            dropped_lights,
            draws,
            sky: scene.sky().is_some(),
            clear_color: scene.clear_color(),
        }
    }
}
