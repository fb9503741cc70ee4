use lumen_scene::{MAX_LIGHTS, ShadingModel};

/// Uniform structs shared by every pipeline. Layouts mirror `uniforms.rs`.
const COMMON: &str = r#"
const LIGHT_DIRECTIONAL: u32 = 0u;
const LIGHT_POINT: u32 = 1u;
const LIGHT_SPOT: u32 = 2u;

struct Light {
    color: vec3<f32>,
    intensity: f32,
    position: vec3<f32>,
    range: f32,
    direction: vec3<f32>,
    kind: u32,
    spot_inner_cos: f32,
    spot_outer_cos: f32,
    _pad: vec2<f32>,
};

struct Frame {
    view_proj: mat4x4<f32>,
    sky_view_proj: mat4x4<f32>,
    camera_position: vec3<f32>,
    light_count: u32,
    ambient: vec4<f32>,
    lights: array<Light, MAX_LIGHTS>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;
"#;

/// Per-draw data, material textures and the shared vertex stage.
const SURFACE: &str = r#"
struct Draw {
    world: mat4x4<f32>,
    world_inverse_transpose: mat4x4<f32>,
    tint: vec4<f32>,
    uv_transform: vec4<f32>,
    roughness: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};

@group(1) @binding(0)
var<uniform> draw: Draw;

@group(2) @binding(0)
var albedo_tex: texture_2d<f32>;
@group(2) @binding(1)
var normal_tex: texture_2d<f32>;
@group(2) @binding(2)
var surface_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) tangent: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) world_tangent: vec3<f32>,
    @location(3) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = draw.world * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_position = world_pos.xyz;
    out.world_normal = (draw.world_inverse_transpose * vec4<f32>(vertex.normal, 0.0)).xyz;
    out.world_tangent = (draw.world * vec4<f32>(vertex.tangent, 0.0)).xyz;
    out.uv = vertex.uv * draw.uv_transform.xy + draw.uv_transform.zw;
    return out;
}
"#;

const LIT: &str = r#"
// Tangent-space normal from the normal map, moved to world space.
fn surface_normal(normal: vec3<f32>, tangent: vec3<f32>, uv: vec2<f32>) -> vec3<f32> {
    let n = normalize(normal);
    let t = normalize(tangent - dot(tangent, n) * n);
    let b = cross(t, n);
    let sampled = textureSample(normal_tex, surface_sampler, uv).xyz * 2.0 - 1.0;
    return normalize(mat3x3<f32>(t, b, n) * sampled);
}

fn range_attenuation(dist: f32, range: f32) -> f32 {
    let falloff = saturate(1.0 - (dist * dist) / (range * range));
    return falloff * falloff;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(albedo_tex, surface_sampler, in.uv) * draw.tint;
    let n = surface_normal(in.world_normal, in.world_tangent, in.uv);
    let to_eye = normalize(frame.camera_position - in.world_position);
    let roughness = saturate(draw.roughness);
    let shininess = mix(256.0, 2.0, roughness);

    var diffuse = frame.ambient.rgb;
    var specular = vec3<f32>(0.0);
    let count = min(frame.light_count, MAX_LIGHTS);
    for (var i = 0u; i < count; i += 1u) {
        let light = frame.lights[i];
        var to_light: vec3<f32>;
        var attenuation = 1.0;
        if light.kind == LIGHT_DIRECTIONAL {
            to_light = -light.direction;
        } else {
            let offset = light.position - in.world_position;
            let dist = length(offset);
            to_light = offset / max(dist, 1e-4);
            attenuation = range_attenuation(dist, light.range);
            if light.kind == LIGHT_SPOT {
                let cos_angle = dot(-to_light, light.direction);
                attenuation *= smoothstep(light.spot_outer_cos, light.spot_inner_cos, cos_angle);
            }
        }

        let n_dot_l = saturate(dot(n, to_light));
        let radiance = light.color * light.intensity * attenuation;
        diffuse += radiance * n_dot_l;
        if n_dot_l > 0.0 {
            let reflected = reflect(-to_light, n);
            let highlight = pow(saturate(dot(reflected, to_eye)), shininess);
            specular += radiance * highlight * (1.0 - roughness);
        }
    }

    return vec4<f32>(albedo.rgb * diffuse + specular, albedo.a);
}
"#;

const UNLIT: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return textureSample(albedo_tex, surface_sampler, in.uv) * draw.tint;
}
"#;

const DEBUG_NORMALS: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(normalize(in.world_normal) * 0.5 + 0.5, 1.0);
}
"#;

const DEBUG_UVS: &str = r#"
@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(fract(in.uv), 0.0, 1.0);
}
"#;

const SKY: &str = r#"
@group(1) @binding(0)
var sky_tex: texture_cube<f32>;
@group(1) @binding(1)
var sky_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> SkyOutput {
    var out: SkyOutput;
    // w for z pins the sky to the far plane.
    out.clip_position = (frame.sky_view_proj * vec4<f32>(position, 1.0)).xyww;
    out.direction = position;
    return out;
}

@fragment
fn fs_main(in: SkyOutput) -> @location(0) vec4<f32> {
    return textureSample(sky_tex, sky_sampler, in.direction);
}
"#;

fn prelude() -> String {
    format!("const MAX_LIGHTS: u32 = {MAX_LIGHTS}u;\n{COMMON}")
}

/// Full WGSL source for a surface pipeline.
pub fn surface_source(shading: ShadingModel) -> String {
    let fragment = match shading {
        ShadingModel::Lit => LIT,
        ShadingModel::Unlit => UNLIT,
        ShadingModel::DebugNormals => DEBUG_NORMALS,
        ShadingModel::DebugUvs => DEBUG_UVS,
    };
    format!("{}{SURFACE}{fragment}", prelude())
}

pub fn sky_source() -> String {
    format!("{}{SKY}", prelude())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_surface_has_both_stages() {
        for shading in ShadingModel::ALL {
            let src = surface_source(shading);
            assert_eq!(src.matches("fn vs_main").count(), 1, "{shading:?}");
            assert_eq!(src.matches("fn fs_main").count(), 1, "{shading:?}");
        }
    }

    #[test]
    fn light_array_length_follows_constant() {
        let src = sky_source();
        assert!(src.starts_with(&format!("const MAX_LIGHTS: u32 = {MAX_LIGHTS}u;")));
        assert!(src.contains("array<Light, MAX_LIGHTS>"));
    }

    #[test]
    fn lit_uses_normal_map_and_all_light_kinds() {
        let src = surface_source(ShadingModel::Lit);
        assert!(src.contains("textureSample(normal_tex"));
        assert!(src.contains("LIGHT_SPOT"));
        assert!(src.contains("range_attenuation"));
    }
}
