//! YAML scene documents.
//!
//! Assets are declared by name and referenced by name from materials and
//! entities; [`Scene::from_config`] resolves the names to handles.

use crate::camera::{Camera, Projection};
use crate::entity::{Entity, Sky};
use crate::light::Light;
use crate::material::{Material, SamplerSettings, ShadingModel, TextureSlot};
use crate::scene::{Scene, SceneError};
use glam::{Vec2, Vec3, Vec4};
use lumen_assets::{
    AssetError, ColorSpace, CubemapData, MeshHandle, ObjOptions, Primitive, TextureData,
    TextureHandle,
};
use lumen_common::Transform;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
    #[serde(default = "default_ambient")]
    pub ambient: [f32; 3],
    #[serde(default)]
    pub meshes: Vec<MeshConfig>,
    #[serde(default)]
    pub textures: Vec<TextureConfig>,
    #[serde(default)]
    pub materials: Vec<MaterialConfig>,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
    #[serde(default)]
    pub lights: Vec<LightConfig>,
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sky: Option<SkyConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    pub name: String,
    pub source: MeshSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeshSource {
    Primitive {
        shape: Primitive,
    },
    Obj {
        path: PathBuf,
        #[serde(default)]
        left_handed: bool,
        #[serde(default = "yes")]
        flip_v: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureConfig {
    pub name: String,
    /// Defaults to linear for flat normal maps and sRGB otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_space: Option<ColorSpace>,
    pub source: TextureSource,
}

impl TextureConfig {
    pub fn color_space(&self) -> ColorSpace {
        self.color_space.unwrap_or(match self.source {
            TextureSource::FlatNormal => ColorSpace::Linear,
            _ => ColorSpace::Srgb,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextureSource {
    File {
        path: PathBuf,
    },
    Solid {
        rgba: [u8; 4],
    },
    Checker {
        size: u32,
        cells: u32,
        a: [u8; 4],
        b: [u8; 4],
    },
    FlatNormal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialConfig {
    pub name: String,
    #[serde(default = "default_tint")]
    pub tint: [f32; 4],
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default = "default_uv_scale")]
    pub uv_scale: [f32; 2],
    #[serde(default)]
    pub uv_offset: [f32; 2],
    #[serde(default)]
    pub shading: ShadingModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub albedo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal: Option<String>,
    #[serde(default)]
    pub sampler: SamplerSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub name: String,
    pub mesh: String,
    pub material: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// Pitch, yaw, roll in radians.
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LightConfig {
    Directional {
        #[serde(default = "default_intensity")]
        intensity: f32,
        color: [f32; 3],
        direction: [f32; 3],
    },
    Point {
        #[serde(default = "default_intensity")]
        intensity: f32,
        color: [f32; 3],
        range: f32,
        position: [f32; 3],
    },
    Spot {
        #[serde(default = "default_intensity")]
        intensity: f32,
        color: [f32; 3],
        direction: [f32; 3],
        range: f32,
        position: [f32; 3],
        inner_degrees: f32,
        outer_degrees: f32,
    },
}

impl LightConfig {
    pub fn to_light(&self) -> Light {
        match *self {
            LightConfig::Directional {
                intensity,
                color,
                direction,
            } => Light::directional(intensity, color.into(), direction.into()),
            LightConfig::Point {
                intensity,
                color,
                range,
                position,
            } => Light::point(intensity, color.into(), range, position.into()),
            LightConfig::Spot {
                intensity,
                color,
                direction,
                range,
                position,
                inner_degrees,
                outer_degrees,
            } => Light::spot(
                intensity,
                color.into(),
                direction.into(),
                range,
                position.into(),
                inner_degrees.to_radians(),
                outer_degrees.to_radians(),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_look_speed")]
    pub look_speed: f32,
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default)]
    pub projection: Projection,
}

impl CameraConfig {
    pub fn to_camera(&self, aspect: f32) -> Camera {
        let mut camera = Camera::new(
            self.position.into(),
            self.move_speed,
            self.look_speed,
            self.fov_degrees.to_radians(),
            aspect,
        );
        camera.transform_mut().set_rotation(self.rotation.into());
        camera.set_projection(self.projection);
        camera
    }
}

/// Cubemap source for the sky. Face order is +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkyConfig {
    Faces { faces: [PathBuf; 6] },
    Solid { rgba: [u8; 4] },
    Gradient { size: u32, top: [u8; 4], bottom: [u8; 4] },
}

fn yes() -> bool {
    true
}
fn default_clear_color() -> [f32; 4] {
    [0.05, 0.05, 0.05, 1.0]
}
fn default_ambient() -> [f32; 3] {
    [0.25, 0.25, 0.25]
}
fn default_tint() -> [f32; 4] {
    [1.0; 4]
}
fn default_roughness() -> f32 {
    0.5
}
fn default_uv_scale() -> [f32; 2] {
    [1.0, 1.0]
}
fn default_scale() -> [f32; 3] {
    [1.0; 3]
}
fn default_intensity() -> f32 {
    1.0
}
fn default_move_speed() -> f32 {
    4.0
}
fn default_look_speed() -> f32 {
    0.005
}
fn default_fov() -> f32 {
    45.0
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            clear_color: default_clear_color(),
            ambient: default_ambient(),
            meshes: Vec::new(),
            textures: Vec::new(),
            materials: Vec::new(),
            entities: Vec::new(),
            lights: Vec::new(),
            cameras: Vec::new(),
            sky: None,
        }
    }
}

impl SceneConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SceneError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, SceneError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The built-in showcase: two rows of six shapes, four textured
    /// materials, six lights of all kinds, two cameras and a gradient sky.
    pub fn demo() -> Self {
        let shapes = [
            Primitive::Cube,
            Primitive::Cylinder,
            Primitive::Sphere,
            Primitive::Torus,
            Primitive::QuadDoubleSided,
            Primitive::Quad,
        ];
        let meshes = shapes
            .iter()
            .map(|shape| MeshConfig {
                name: shape.label().to_string(),
                source: MeshSource::Primitive { shape: *shape },
            })
            .collect();

        let textures = vec![
            TextureConfig {
                name: "denim".into(),
                color_space: None,
                source: TextureSource::Checker {
                    size: 256,
                    cells: 16,
                    a: [52, 78, 140, 255],
                    b: [30, 44, 92, 255],
                },
            },
            TextureConfig {
                name: "bricks".into(),
                color_space: None,
                source: TextureSource::Checker {
                    size: 256,
                    cells: 8,
                    a: [150, 62, 44, 255],
                    b: [120, 118, 112, 255],
                },
            },
            TextureConfig {
                name: "flat_normal".into(),
                color_space: None,
                source: TextureSource::FlatNormal,
            },
        ];

        let material = |name: &str, tint: [f32; 4], roughness: f32, albedo: &str| MaterialConfig {
            name: name.into(),
            tint,
            roughness,
            uv_scale: [1.0, 1.0],
            uv_offset: [0.0, 0.0],
            shading: ShadingModel::Lit,
            albedo: Some(albedo.into()),
            normal: Some("flat_normal".into()),
            sampler: SamplerSettings::default(),
        };
        let mut bricks_small = material("Bricks Small", [0.3, 0.6, 0.2, 1.0], 0.5, "bricks");
        bricks_small.uv_scale = [3.0, 3.0];
        let materials = vec![
            material("Denim Normal", [1.0; 4], 0.5, "denim"),
            material("Denim Brown", [0.8, 0.5, 0.0, 1.0], 0.0, "denim"),
            material("Bricks Normal", [1.0; 4], 1.0, "bricks"),
            bricks_small,
        ];

        let mut entities = Vec::new();
        for (row, y, first_material) in [("Top", 2.0, 0), ("Bottom", -2.0, 2)] {
            for (i, shape) in shapes.iter().enumerate() {
                entities.push(EntityConfig {
                    name: format!("{} {row}", shape.label()),
                    mesh: shape.label().to_string(),
                    material: materials[first_material + i % 2].name.clone(),
                    position: [-7.5 + 3.0 * i as f32, y, 0.0],
                    rotation: [0.0; 3],
                    scale: [1.0; 3],
                });
            }
        }

        let mut lights = vec![LightConfig::Directional {
            intensity: 1.0,
            color: [0.9, 0.9, 1.0],
            direction: [1.0, -0.5, -1.0],
        }];
        let point_colors = [
            [1.0, 1.0, 1.0],
            [1.0, 0.2, 0.2],
            [0.2, 1.0, 0.2],
            [0.2, 0.2, 1.0],
        ];
        for (i, color) in point_colors.into_iter().enumerate() {
            lights.push(LightConfig::Point {
                intensity: 1.0,
                color,
                range: 6.0,
                position: [-6.0 + 3.0 * i as f32, 0.0, 2.0],
            });
        }
        lights.push(LightConfig::Spot {
            intensity: 2.0,
            color: [1.0, 0.3, 0.3],
            direction: [0.0, -1.0, 0.0],
            range: 8.0,
            position: [7.5, 5.0, 0.0],
            inner_degrees: 10.0,
            outer_degrees: 20.0,
        });

        let cameras = vec![
            CameraConfig {
                position: [0.0, 0.0, 15.0],
                rotation: [0.0; 3],
                move_speed: default_move_speed(),
                look_speed: default_look_speed(),
                fov_degrees: default_fov(),
                projection: Projection::Perspective,
            },
            CameraConfig {
                position: [0.0, 0.0, 15.0],
                rotation: [0.0; 3],
                move_speed: default_move_speed(),
                look_speed: default_look_speed(),
                fov_degrees: default_fov(),
                projection: Projection::Orthographic { height: 12.0 },
            },
        ];

        Self {
            clear_color: default_clear_color(),
            ambient: default_ambient(),
            meshes,
            textures,
            materials,
            entities,
            lights,
            cameras,
            sky: Some(SkyConfig::Gradient {
                size: 64,
                top: [70, 110, 200, 255],
                bottom: [20, 20, 30, 255],
            }),
        }
    }
}

fn resolve<'a, H: Copy>(
    names: &HashMap<&'a str, H>,
    kind: &'static str,
    name: &str,
    by: &str,
) -> Result<H, SceneError> {
    names
        .get(name)
        .copied()
        .ok_or_else(|| SceneError::UnknownName {
            kind,
            name: name.to_string(),
            by: by.to_string(),
        })
}

fn insert_unique<'a, H>(
    names: &mut HashMap<&'a str, H>,
    kind: &'static str,
    name: &'a str,
    handle: H,
) -> Result<(), SceneError> {
    if names.insert(name, handle).is_some() {
        return Err(SceneError::DuplicateName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

impl Scene {
    /// Build a scene from a configuration. Relative file paths resolve
    /// against `base_dir`.
    pub fn from_config(config: &SceneConfig, base_dir: &Path) -> Result<Self, SceneError> {
        let mut scene = Scene::new();
        scene.set_clear_color(Vec4::from(config.clear_color));
        scene.set_ambient(Vec3::from(config.ambient));

        let mut meshes: HashMap<&str, MeshHandle> = HashMap::new();
        for mesh in &config.meshes {
            let handle = match &mesh.source {
                MeshSource::Primitive { shape } => {
                    scene.assets_mut().add_mesh(&mesh.name, shape.build())
                }
                MeshSource::Obj {
                    path,
                    left_handed,
                    flip_v,
                } => {
                    let options = ObjOptions {
                        flip_v: *flip_v,
                        to_left_handed: *left_handed,
                    };
                    scene
                        .assets_mut()
                        .load_mesh(&mesh.name, base_dir.join(path), &options)?
                }
            };
            insert_unique(&mut meshes, "mesh", &mesh.name, handle)?;
        }

        let mut textures: HashMap<&str, TextureHandle> = HashMap::new();
        for texture in &config.textures {
            let color_space = texture.color_space();
            let handle = match &texture.source {
                TextureSource::File { path } => {
                    scene
                        .assets_mut()
                        .load_texture(&texture.name, base_dir.join(path), color_space)?
                }
                TextureSource::Solid { rgba } => scene.assets_mut().add_texture(
                    &texture.name,
                    TextureData::solid(*rgba),
                    color_space,
                ),
                TextureSource::Checker { size, cells, a, b } => {
                    let data = TextureData::checker(*size, *cells, *a, *b).map_err(|source| {
                        AssetError::Texture {
                            name: texture.name.clone(),
                            source,
                        }
                    })?;
                    scene
                        .assets_mut()
                        .add_texture(&texture.name, data, color_space)
                }
                TextureSource::FlatNormal => scene.assets_mut().add_texture(
                    &texture.name,
                    TextureData::flat_normal(),
                    color_space,
                ),
            };
            insert_unique(&mut textures, "texture", &texture.name, handle)?;
        }

        let mut materials = HashMap::new();
        for cfg in &config.materials {
            let mut material = Material::new(&cfg.name, Vec4::from(cfg.tint), cfg.shading)
                .with_roughness(cfg.roughness)
                .with_uv_transform(Vec2::from(cfg.uv_scale), Vec2::from(cfg.uv_offset))
                .with_sampler(cfg.sampler);
            for (slot, name) in [
                (TextureSlot::Albedo, &cfg.albedo),
                (TextureSlot::Normal, &cfg.normal),
            ] {
                if let Some(name) = name {
                    let handle = resolve(&textures, "texture", name, &cfg.name)?;
                    material.set_texture(slot, Some(handle));
                }
            }
            let handle = scene.add_material(material)?;
            insert_unique(&mut materials, "material", &cfg.name, handle)?;
        }

        for cfg in &config.entities {
            let mesh = resolve(&meshes, "mesh", &cfg.mesh, &cfg.name)?;
            let material = resolve(&materials, "material", &cfg.material, &cfg.name)?;
            let mut transform = Transform::from_position(Vec3::from(cfg.position));
            transform.set_rotation(Vec3::from(cfg.rotation));
            transform.set_scale(Vec3::from(cfg.scale));
            scene.spawn(Entity::new(&cfg.name, mesh, material, transform))?;
        }

        for light in &config.lights {
            scene.add_light(light.to_light());
        }

        let aspect = scene.active_camera().aspect();
        scene.set_cameras(config.cameras.iter().map(|c| c.to_camera(aspect)).collect());

        if let Some(sky) = &config.sky {
            let cubemap = match sky {
                SkyConfig::Faces { faces } => {
                    let paths = faces.clone().map(|p| base_dir.join(p));
                    CubemapData::load(&paths)?
                }
                SkyConfig::Solid { rgba } => CubemapData::solid(*rgba),
                SkyConfig::Gradient { size, top, bottom } => {
                    CubemapData::gradient(*size, *top, *bottom)?
                }
            };
            let mesh = scene
                .assets_mut()
                .add_mesh("Sky Cube", Primitive::Cube.build());
            scene.set_sky(Some(Sky { mesh, cubemap }))?;
        }

        tracing::info!(
            meshes = scene.assets().mesh_count(),
            textures = scene.assets().texture_count(),
            materials = scene.material_count(),
            entities = scene.entity_count(),
            lights = scene.lights().len(),
            cameras = scene.cameras().len(),
            "scene built"
        );
        Ok(scene)
    }

    /// Load a YAML scene file, resolving paths next to it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let config = SceneConfig::load(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        tracing::info!(path = %path.display(), "loading scene");
        Self::from_config(&config, base_dir)
    }

    /// The built-in demo scene.
    pub fn demo() -> Result<Self, SceneError> {
        Self::from_config(&SceneConfig::demo(), Path::new("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::LightKind;
    use std::io::Write;

    #[test]
    fn demo_layout() {
        let scene = Scene::demo().unwrap();
        assert_eq!(scene.entity_count(), 12);
        assert_eq!(scene.material_count(), 4);
        assert_eq!(scene.cameras().len(), 2);
        assert!(scene.sky().is_some());

        let kinds: Vec<_> = scene.lights().iter().map(|l| l.kind).collect();
        assert_eq!(kinds.iter().filter(|k| **k == LightKind::Directional).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == LightKind::Point).count(), 4);
        assert_eq!(kinds.iter().filter(|k| **k == LightKind::Spot).count(), 1);

        let xs: Vec<f32> = scene
            .entities()
            .values()
            .filter(|e| e.transform.position().y == 2.0)
            .map(|e| e.transform.position().x)
            .collect();
        assert_eq!(xs, vec![-7.5, -4.5, -1.5, 1.5, 4.5, 7.5]);
        for camera in scene.cameras() {
            assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 15.0));
        }
    }

    #[test]
    fn demo_flat_normal_is_linear() {
        let scene = Scene::demo().unwrap();
        let handle = scene.assets().texture_by_name("flat_normal").unwrap();
        assert_eq!(
            scene.assets().texture(handle).unwrap().color_space,
            ColorSpace::Linear
        );
    }

    #[test]
    fn yaml_round_trip_of_demo() {
        let demo = SceneConfig::demo();
        let text = demo.to_yaml_string().unwrap();
        assert_eq!(SceneConfig::from_yaml_str(&text).unwrap(), demo);
    }

    #[test]
    fn shipped_demo_file_builds() {
        let text = include_str!("../../../scenes/demo.yaml");
        let config = SceneConfig::from_yaml_str(text).unwrap();
        let scene = Scene::from_config(&config, Path::new(".")).unwrap();
        assert_eq!(scene.entity_count(), 12);
    }

    #[test]
    fn minimal_document_uses_defaults() {
        let config = SceneConfig::from_yaml_str(
            r#"
meshes:
  - name: box
    source: { kind: primitive, shape: cube }
materials:
  - name: plain
entities:
  - name: b
    mesh: box
    material: plain
"#,
        )
        .unwrap();
        let scene = Scene::from_config(&config, Path::new(".")).unwrap();
        assert_eq!(scene.ambient(), Vec3::splat(0.25));
        assert_eq!(scene.cameras().len(), 1);
        let (_, material) = scene.materials().next().unwrap();
        assert_eq!(material.roughness(), 0.5);
        assert_eq!(material.shading(), ShadingModel::Lit);
        let entity = scene.entities().values().next().unwrap();
        assert_eq!(entity.transform.scale(), Vec3::ONE);
    }

    #[test]
    fn unknown_material_is_reported() {
        let config = SceneConfig::from_yaml_str(
            r#"
meshes:
  - name: box
    source: { kind: primitive, shape: cube }
entities:
  - name: b
    mesh: box
    material: missing
"#,
        )
        .unwrap();
        let err = Scene::from_config(&config, Path::new(".")).unwrap_err();
        match err {
            SceneError::UnknownName { kind, name, by } => {
                assert_eq!(kind, "material");
                assert_eq!(name, "missing");
                assert_eq!(by, "b");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let config = SceneConfig::from_yaml_str(
            r#"
materials:
  - name: a
  - name: a
"#,
        )
        .unwrap();
        assert!(matches!(
            Scene::from_config(&config, Path::new(".")),
            Err(SceneError::DuplicateName { kind: "material", .. })
        ));
    }

    #[test]
    fn oversized_checker_is_an_asset_error() {
        let config = SceneConfig::from_yaml_str(
            r#"
textures:
  - name: huge
    source: { kind: checker, size: 40000, cells: 8, a: [0, 0, 0, 255], b: [255, 255, 255, 255] }
"#,
        )
        .unwrap();
        match Scene::from_config(&config, Path::new(".")) {
            Err(SceneError::Asset(AssetError::Texture { name, .. })) => assert_eq!(name, "huge"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn oversized_gradient_sky_is_rejected() {
        let config = SceneConfig::from_yaml_str(
            "sky: { kind: gradient, size: 70000, top: [0, 0, 0, 255], bottom: [0, 0, 0, 255] }",
        )
        .unwrap();
        assert!(matches!(
            Scene::from_config(&config, Path::new(".")),
            Err(SceneError::Sky(_))
        ));
    }

    #[test]
    fn demo_sky_cube_is_reachable_by_name() {
        let scene = Scene::demo().unwrap();
        let sky = scene.sky().unwrap();
        assert_eq!(scene.assets().mesh_by_name("Sky Cube"), Some(sky.mesh));
    }

    #[test]
    fn bad_yaml_is_a_config_error() {
        assert!(matches!(
            SceneConfig::from_yaml_str("meshes: [ { name: 3"),
            Err(SceneError::Config(_))
        ));
    }

    #[test]
    fn obj_paths_resolve_next_to_the_scene_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut obj = std::fs::File::create(dir.path().join("tri.obj")).unwrap();
        writeln!(obj, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3").unwrap();

        let scene_path = dir.path().join("scene.yaml");
        std::fs::write(
            &scene_path,
            r#"
meshes:
  - name: tri
    source: { kind: obj, path: tri.obj }
lights:
  - { kind: point, color: [1, 1, 1], range: 4, position: [0, 1, 0] }
sky: { kind: solid, rgba: [10, 20, 30, 255] }
"#,
        )
        .unwrap();

        let scene = Scene::load(&scene_path).unwrap();
        let handle = scene.assets().mesh_by_name("tri").unwrap();
        assert_eq!(scene.assets().mesh(handle).unwrap().data.triangle_count(), 1);
        assert_eq!(scene.lights()[0].intensity, 1.0);
        assert!(scene.sky().is_some());
    }

    #[test]
    fn missing_obj_is_an_asset_error() {
        let config = SceneConfig::from_yaml_str(
            r#"
meshes:
  - name: gone
    source: { kind: obj, path: does/not/exist.obj }
"#,
        )
        .unwrap();
        assert!(matches!(
            Scene::from_config(&config, Path::new(".")),
            Err(SceneError::Asset(_))
        ));
    }

    #[test]
    fn spot_angles_are_degrees_in_yaml() {
        let light = LightConfig::Spot {
            intensity: 1.0,
            color: [1.0; 3],
            direction: [0.0, -1.0, 0.0],
            range: 5.0,
            position: [0.0; 3],
            inner_degrees: 90.0,
            outer_degrees: 180.0,
        }
        .to_light();
        assert!((light.spot_inner_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
        assert!((light.spot_outer_angle - std::f32::consts::PI).abs() < 1e-6);
    }
}
