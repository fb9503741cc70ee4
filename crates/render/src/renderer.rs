use lumen_scene::Scene;
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads the scene and produces output. It never mutates the
/// scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the given scene from its active camera.
    fn render(&self, scene: &Scene) -> Self::Output;
}

/// Produces a human-readable description of a scene.
///
/// Useful for CLI output, logging, and testing the render interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Scene ({} entities, {} lights, {} materials) ===",
            scene.entity_count(),
            scene.lights().len(),
            scene.material_count()
        );

        for (i, cam) in scene.cameras().iter().enumerate() {
            let p = cam.position();
            let r = cam.transform().rotation();
            let marker = if i == scene.active_camera_index() {
                "*"
            } else {
                " "
            };
            let _ = writeln!(
                out,
                "{marker}Camera {i}: pos=({:.2}, {:.2}, {:.2}) rot=({:.2}, {:.2}, {:.2}) fov={:.0} {:?}",
                p.x,
                p.y,
                p.z,
                r.x,
                r.y,
                r.z,
                cam.fov().to_degrees(),
                cam.projection()
            );
        }

        let a = scene.ambient();
        let _ = writeln!(out, "Ambient: ({:.2}, {:.2}, {:.2})", a.x, a.y, a.z);
        for (i, light) in scene.lights().iter().enumerate() {
            let _ = writeln!(
                out,
                "  Light {i}: {} intensity={:.2} color=({:.2}, {:.2}, {:.2})",
                light.kind.label(),
                light.intensity,
                light.color.x,
                light.color.y,
                light.color.z
            );
        }

        for (handle, material) in scene.materials() {
            let _ = writeln!(
                out,
                "  Material {}: '{}' {} roughness={:.2}",
                handle.0,
                material.name,
                material.shading().label(),
                material.roughness()
            );
        }

        for (id, entity) in scene.entities() {
            let p = entity.transform.position();
            let (mesh_name, tris) = scene
                .assets()
                .mesh(entity.mesh())
                .map(|m| (m.name.as_str(), m.data.triangle_count()))
                .unwrap_or(("?", 0));
            let _ = writeln!(
                out,
                "  [{id}] '{}' pos=({:.2}, {:.2}, {:.2}) mesh={mesh_name} tris={tris}",
                entity.name, p.x, p.y, p.z
            );
        }

        if scene.sky().is_some() {
            out.push_str("Sky: cubemap\n");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};
    use lumen_assets::Primitive;
    use lumen_common::Transform;
    use lumen_scene::{Entity, Light, Material, ShadingModel};

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::new();
        let output = DebugTextRenderer::new().render(&scene);

        assert!(output.contains("0 entities"));
        assert!(output.contains("*Camera 0: pos=(0.00, 0.00, 15.00)"));
        assert!(!output.contains("Sky"));
    }

    #[test]
    fn debug_renderer_with_entities() {
        let mut scene = Scene::new();
        let mesh = scene.assets_mut().add_mesh("cube", Primitive::Cube.build());
        let mat = scene
            .add_material(Material::new("white", Vec4::ONE, ShadingModel::Lit))
            .unwrap();
        scene
            .spawn(Entity::new(
                "box",
                mesh,
                mat,
                Transform::from_position(Vec3::new(1.0, 2.0, 3.0)),
            ))
            .unwrap();
        scene.add_light(Light::point(1.0, Vec3::ONE, 4.0, Vec3::ZERO));

        let output = DebugTextRenderer::new().render(&scene);

        assert!(output.contains("1 entities"));
        assert!(output.contains("pos=(1.00, 2.00, 3.00)"));
        assert!(output.contains("tris=12"));
        assert!(output.contains("Light 0: Point"));
        assert!(output.contains("'white' Lit"));
    }

    #[test]
    fn demo_scene_renders() {
        let scene = Scene::demo().unwrap();
        let output = DebugTextRenderer::new().render(&scene);
        assert!(output.contains("12 entities"));
        assert!(output.contains("Sky: cubemap"));
    }
}
