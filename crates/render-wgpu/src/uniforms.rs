use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec4};
use lumen_assets::Vertex;
use lumen_render::FramePacket;
use lumen_scene::{Light, MAX_LIGHTS, Material};

/// Vertex layout shared by every surface pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub tangent: [f32; 3],
}

impl GpuVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GpuVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

impl From<&Vertex> for GpuVertex {
    fn from(v: &Vertex) -> Self {
        Self {
            position: v.position.to_array(),
            normal: v.normal.to_array(),
            uv: v.uv.to_array(),
            tangent: v.tangent.to_array(),
        }
    }
}

/// Matches `struct Light` in the shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GpuLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: [f32; 3],
    pub range: f32,
    pub direction: [f32; 3],
    pub kind: u32,
    pub spot_inner_cos: f32,
    pub spot_outer_cos: f32,
    pub _pad: [f32; 2],
}

impl From<&Light> for GpuLight {
    fn from(light: &Light) -> Self {
        let (inner, outer) = light.spot_cone();
        Self {
            color: light.color.to_array(),
            intensity: light.intensity,
            position: light.position.to_array(),
            range: light.range.max(1e-4),
            direction: light.direction_normalized().to_array(),
            kind: light.kind as u32,
            spot_inner_cos: inner.cos(),
            spot_outer_cos: outer.cos(),
            _pad: [0.0; 2],
        }
    }
}

/// Matches `struct Frame` in the shaders. Bound once per frame in group 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub sky_view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub light_count: u32,
    pub ambient: [f32; 4],
    pub lights: [GpuLight; MAX_LIGHTS],
}

impl FrameUniforms {
    pub fn from_packet(packet: &FramePacket) -> Self {
        let mut uniforms = Self::zeroed();
        uniforms.view_proj = packet.camera.view_projection.to_cols_array_2d();
        uniforms.sky_view_proj = packet.camera.sky_view_projection.to_cols_array_2d();
        uniforms.camera_position = packet.camera.position.to_array();
        uniforms.ambient = packet.ambient.extend(1.0).to_array();
        let count = packet.lights.len().min(MAX_LIGHTS);
        for (slot, light) in uniforms.lights.iter_mut().zip(&packet.lights) {
            *slot = GpuLight::from(light);
        }
        uniforms.light_count = count as u32;
        uniforms
    }
}

/// Matches `struct Draw` in the shaders. One per draw, bound in group 1
/// with a dynamic offset.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub world: [[f32; 4]; 4],
    pub world_inverse_transpose: [[f32; 4]; 4],
    pub tint: [f32; 4],
    /// xy = uv scale, zw = uv offset.
    pub uv_transform: [f32; 4],
    pub roughness: f32,
    pub _pad: [f32; 3],
}

/// Material values that travel with every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MaterialParams {
    pub tint: Vec4,
    pub uv_scale: Vec2,
    pub uv_offset: Vec2,
    pub roughness: f32,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            tint: Vec4::ONE,
            uv_scale: Vec2::ONE,
            uv_offset: Vec2::ZERO,
            roughness: 0.5,
        }
    }
}

impl From<&Material> for MaterialParams {
    fn from(m: &Material) -> Self {
        Self {
            tint: m.color_tint(),
            uv_scale: m.uv_scale(),
            uv_offset: m.uv_offset(),
            roughness: m.roughness(),
        }
    }
}

impl DrawUniforms {
    pub(crate) fn new(world: Mat4, world_inverse_transpose: Mat4, params: &MaterialParams) -> Self {
        Self {
            world: world.to_cols_array_2d(),
            world_inverse_transpose: world_inverse_transpose.to_cols_array_2d(),
            tint: params.tint.to_array(),
            uv_transform: [
                params.uv_scale.x,
                params.uv_scale.y,
                params.uv_offset.x,
                params.uv_offset.y,
            ],
            roughness: params.roughness,
            _pad: [0.0; 3],
        }
    }
}

/// Round `size` up to a multiple of `alignment` (a power of two).
pub(crate) fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use lumen_scene::{LightKind, Scene};

    #[test]
    fn sizes_match_wgsl_layouts() {
        assert_eq!(std::mem::size_of::<GpuVertex>(), 44);
        assert_eq!(std::mem::size_of::<GpuLight>(), 64);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 160 + 64 * MAX_LIGHTS);
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 176);
        // Uniform structs must be a multiple of 16 bytes.
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<DrawUniforms>() % 16, 0);
    }

    #[test]
    fn vertex_attribute_offsets() {
        let offsets: Vec<u64> = GpuVertex::ATTRIBUTES.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 24, 32]);
    }

    #[test]
    fn light_packing() {
        let light = Light::spot(
            2.0,
            Vec3::new(1.0, 0.5, 0.25),
            Vec3::new(0.0, -2.0, 0.0),
            6.0,
            Vec3::new(1.0, 2.0, 3.0),
            0.0,
            std::f32::consts::FRAC_PI_2,
        );
        let gpu = GpuLight::from(&light);
        assert_eq!(gpu.kind, LightKind::Spot as u32);
        assert_eq!(gpu.direction, [0.0, -1.0, 0.0]);
        assert_eq!(gpu.position, [1.0, 2.0, 3.0]);
        assert!((gpu.spot_inner_cos - 1.0).abs() < 1e-6);
        assert!(gpu.spot_outer_cos.abs() < 1e-6);
    }

    #[test]
    fn equal_spot_angles_pack_distinct_cosines() {
        let light = Light::spot(1.0, Vec3::ONE, Vec3::NEG_Y, 5.0, Vec3::ZERO, 0.4, 0.4);
        let gpu = GpuLight::from(&light);
        assert!(gpu.spot_inner_cos > gpu.spot_outer_cos);
    }

    #[test]
    fn frame_uniforms_from_packet() {
        let mut scene = Scene::new();
        scene.add_light(Light::point(1.0, Vec3::ONE, 3.0, Vec3::X));
        scene.add_light(Light::directional(0.5, Vec3::ONE, Vec3::NEG_Y));
        let packet = FramePacket::extract(&scene);
        let u = FrameUniforms::from_packet(&packet);
        assert_eq!(u.light_count, 2);
        assert_eq!(u.camera_position, [0.0, 0.0, 15.0]);
        assert_eq!(u.ambient, [0.25, 0.25, 0.25, 1.0]);
        assert_eq!(u.lights[0].kind, LightKind::Point as u32);
        assert_eq!(u.lights[2], GpuLight::zeroed());
    }

    #[test]
    fn draw_uniforms_carry_uv_transform() {
        let params = MaterialParams {
            uv_scale: Vec2::new(2.0, 3.0),
            uv_offset: Vec2::new(0.5, 0.25),
            ..Default::default()
        };
        let d = DrawUniforms::new(Mat4::IDENTITY, Mat4::IDENTITY, &params);
        assert_eq!(d.uv_transform, [2.0, 3.0, 0.5, 0.25]);
        assert_eq!(d.roughness, 0.5);
    }

    #[test]
    fn stride_alignment() {
        assert_eq!(aligned_stride(176, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(257, 256), 512);
        assert_eq!(aligned_stride(176, 0), 176);
    }
}
