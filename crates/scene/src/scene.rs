use crate::camera::Camera;
use crate::entity::{Entity, Sky};
use crate::light::Light;
use crate::material::{Material, MaterialHandle};
use glam::{Vec3, Vec4};
use lumen_assets::{AssetError, AssetStore, MeshHandle, TextureError, TextureHandle};
use lumen_common::{CameraControls, EntityId};
use std::collections::BTreeMap;

/// Errors from scene mutation and scene loading.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("mesh {0:?} is not registered")]
    InvalidMesh(MeshHandle),
    #[error("material {0:?} is not registered")]
    InvalidMaterial(MaterialHandle),
    #[error("texture {0:?} is not registered")]
    InvalidTexture(TextureHandle),
    #[error("entity {0} does not exist")]
    UnknownEntity(EntityId),
    #[error("camera index {index} out of range ({count} cameras)")]
    CameraIndex { index: usize, count: usize },
    #[error("{kind} '{name}' referenced by '{by}' is not defined")]
    UnknownName {
        kind: &'static str,
        name: String,
        by: String,
    },
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("sky: {0}")]
    Sky(#[from] TextureError),
    #[error("scene config: {0}")]
    Config(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything that is drawn: assets, materials, entities, lights, cameras
/// and the sky.
///
/// All mutations go through explicit operations that keep handles valid:
/// an entity can only be spawned with a mesh and material that exist, and
/// there is always at least one camera.
#[derive(Debug, Clone)]
pub struct Scene {
    assets: AssetStore,
    materials: Vec<Material>,
    entities: BTreeMap<EntityId, Entity>,
    next_entity: EntityId,
    lights: Vec<Light>,
    ambient: Vec3,
    cameras: Vec<Camera>,
    active_camera: usize,
    sky: Option<Sky>,
    clear_color: Vec4,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            assets: AssetStore::new(),
            materials: Vec::new(),
            entities: BTreeMap::new(),
            next_entity: EntityId(0),
            lights: Vec::new(),
            ambient: Vec3::splat(0.25),
            cameras: vec![Camera::default()],
            active_camera: 0,
            sky: None,
            clear_color: Vec4::new(0.05, 0.05, 0.05, 1.0),
        }
    }
}

impl Scene {
    /// An empty scene with a single default camera.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetStore {
        &mut self.assets
    }

    // -- materials --

    /// Register a material. Texture handles must already be in the asset store.
    pub fn add_material(&mut self, material: Material) -> Result<MaterialHandle, SceneError> {
        for (_, texture) in material.textures() {
            if self.assets.texture(texture).is_none() {
                return Err(SceneError::InvalidTexture(texture));
            }
        }
        let handle = MaterialHandle(self.materials.len() as u32);
        tracing::debug!(name = %material.name, ?handle, "material added");
        self.materials.push(material);
        Ok(handle)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&Material> {
        self.materials.get(handle.0 as usize)
    }

    pub fn material_mut(&mut self, handle: MaterialHandle) -> Option<&mut Material> {
        self.materials.get_mut(handle.0 as usize)
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialHandle, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialHandle(i as u32), m))
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    // -- entities --

    /// Add an entity. Fails if its mesh or material is unknown.
    pub fn spawn(&mut self, entity: Entity) -> Result<EntityId, SceneError> {
        self.check_mesh(entity.mesh())?;
        self.check_material(entity.material())?;
        let id = self.next_entity;
        self.next_entity = id.next();
        tracing::debug!(%id, name = %entity.name, "entity spawned");
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Remove an entity. Returns it if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Point an entity at another registered mesh.
    pub fn set_entity_mesh(&mut self, id: EntityId, mesh: MeshHandle) -> Result<(), SceneError> {
        self.check_mesh(mesh)?;
        self.entities
            .get_mut(&id)
            .ok_or(SceneError::UnknownEntity(id))?
            .set_mesh(mesh);
        Ok(())
    }

    /// Give an entity another registered material.
    pub fn set_entity_material(
        &mut self,
        id: EntityId,
        material: MaterialHandle,
    ) -> Result<(), SceneError> {
        self.check_material(material)?;
        self.entities
            .get_mut(&id)
            .ok_or(SceneError::UnknownEntity(id))?
            .set_material(material);
        Ok(())
    }

    fn check_mesh(&self, mesh: MeshHandle) -> Result<(), SceneError> {
        match self.assets.mesh(mesh) {
            Some(_) => Ok(()),
            None => Err(SceneError::InvalidMesh(mesh)),
        }
    }

    fn check_material(&self, material: MaterialHandle) -> Result<(), SceneError> {
        match self.material(material) {
            Some(_) => Ok(()),
            None => Err(SceneError::InvalidMaterial(material)),
        }
    }

    /// All entities in creation order.
    pub fn entities(&self) -> &BTreeMap<EntityId, Entity> {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Entity)> {
        self.entities.iter_mut().map(|(id, e)| (*id, e))
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // -- lights --

    pub fn add_light(&mut self, light: Light) -> usize {
        self.lights.push(light);
        self.lights.len() - 1
    }

    pub fn remove_light(&mut self, index: usize) -> Option<Light> {
        (index < self.lights.len()).then(|| self.lights.remove(index))
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut [Light] {
        &mut self.lights
    }

    pub fn ambient(&self) -> Vec3 {
        self.ambient
    }

    pub fn set_ambient(&mut self, ambient: Vec3) {
        self.ambient = ambient;
    }

    // -- cameras --

    pub fn add_camera(&mut self, camera: Camera) -> usize {
        self.cameras.push(camera);
        self.cameras.len() - 1
    }

    /// Replace every camera. An empty list leaves a single default camera.
    pub fn set_cameras(&mut self, cameras: Vec<Camera>) {
        self.cameras = if cameras.is_empty() {
            vec![Camera::default()]
        } else {
            cameras
        };
        self.active_camera = 0;
    }

    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }

    pub fn cameras_mut(&mut self) -> &mut [Camera] {
        &mut self.cameras
    }

    pub fn active_camera_index(&self) -> usize {
        self.active_camera
    }

    pub fn active_camera(&self) -> &Camera {
        &self.cameras[self.active_camera]
    }

    pub fn active_camera_mut(&mut self) -> &mut Camera {
        &mut self.cameras[self.active_camera]
    }

    pub fn set_active_camera(&mut self, index: usize) -> Result<(), SceneError> {
        if index >= self.cameras.len() {
            return Err(SceneError::CameraIndex {
                index,
                count: self.cameras.len(),
            });
        }
        self.active_camera = index;
        Ok(())
    }

    /// Make the next camera active, wrapping around. Returns the new index.
    pub fn cycle_camera(&mut self) -> usize {
        self.active_camera = (self.active_camera + 1) % self.cameras.len();
        tracing::info!(camera = self.active_camera, "active camera changed");
        self.active_camera
    }

    /// Propagate a new viewport aspect ratio to every camera.
    pub fn set_aspect(&mut self, aspect: f32) {
        for camera in &mut self.cameras {
            camera.set_aspect(aspect);
        }
    }

    // -- sky / background --

    /// Set or clear the sky. The sky mesh must be registered.
    pub fn set_sky(&mut self, sky: Option<Sky>) -> Result<(), SceneError> {
        if let Some(sky) = &sky {
            if self.assets.mesh(sky.mesh).is_none() {
                return Err(SceneError::InvalidMesh(sky.mesh));
            }
        }
        self.sky = sky;
        Ok(())
    }

    pub fn sky(&self) -> Option<&Sky> {
        self.sky.as_ref()
    }

    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
    }

    /// Advance one frame: the active camera responds to the controls.
    pub fn update(&mut self, dt: f32, controls: &CameraControls) {
        self.active_camera_mut().update(dt, controls);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{ShadingModel, TextureSlot};
    use lumen_assets::{ColorSpace, CubemapData, Primitive, TextureData};
    use lumen_common::Transform;

    fn scene_with_cube() -> (Scene, MeshHandle, MaterialHandle) {
        let mut scene = Scene::new();
        let mesh = scene.assets_mut().add_mesh("cube", Primitive::Cube.build());
        let mat = scene
            .add_material(Material::new("white", Vec4::ONE, ShadingModel::Lit))
            .unwrap();
        (scene, mesh, mat)
    }

    #[test]
    fn new_scene_has_one_camera() {
        let scene = Scene::new();
        assert_eq!(scene.cameras().len(), 1);
        assert_eq!(scene.active_camera_index(), 0);
        assert_eq!(scene.ambient(), Vec3::splat(0.25));
    }

    #[test]
    fn spawn_and_despawn() {
        let (mut scene, mesh, mat) = scene_with_cube();
        let a = scene
            .spawn(Entity::new("a", mesh, mat, Transform::new()))
            .unwrap();
        let b = scene
            .spawn(Entity::new("b", mesh, mat, Transform::new()))
            .unwrap();
        assert!(a < b);
        assert_eq!(scene.entity_count(), 2);

        let removed = scene.despawn(a).unwrap();
        assert_eq!(removed.name, "a");
        assert!(scene.entity(a).is_none());
        assert!(scene.despawn(a).is_none());

        // Ids are never reused.
        let c = scene
            .spawn(Entity::new("c", mesh, mat, Transform::new()))
            .unwrap();
        assert!(c > b);
    }

    #[test]
    fn spawn_rejects_unknown_handles() {
        let (mut scene, mesh, mat) = scene_with_cube();
        let err = scene
            .spawn(Entity::new("x", MeshHandle(9), mat, Transform::new()))
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidMesh(MeshHandle(9))));

        let err = scene
            .spawn(Entity::new("x", mesh, MaterialHandle(4), Transform::new()))
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidMaterial(MaterialHandle(4))));
        assert_eq!(scene.entity_count(), 0);
    }

    #[test]
    fn material_rejects_unknown_texture() {
        let mut scene = Scene::new();
        let err = scene
            .add_material(
                Material::new("m", Vec4::ONE, ShadingModel::Lit)
                    .with_texture(TextureSlot::Albedo, TextureHandle(0)),
            )
            .unwrap_err();
        assert!(matches!(err, SceneError::InvalidTexture(_)));

        let tex = scene.assets_mut().add_texture(
            "white",
            TextureData::solid([255; 4]),
            ColorSpace::Srgb,
        );
        let handle = scene
            .add_material(
                Material::new("m", Vec4::ONE, ShadingModel::Lit)
                    .with_texture(TextureSlot::Albedo, tex),
            )
            .unwrap();
        assert_eq!(scene.material(handle).unwrap().name, "m");
    }

    #[test]
    fn entity_edits_are_visible() {
        let (mut scene, mesh, mat) = scene_with_cube();
        let id = scene
            .spawn(Entity::new("a", mesh, mat, Transform::new()))
            .unwrap();
        scene
            .entity_mut(id)
            .unwrap()
            .transform
            .set_position(Vec3::new(1.0, 2.0, 3.0));
        let world = scene.entity(id).unwrap().transform.world_matrix();
        assert_eq!(world.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn reassigning_mesh_and_material_is_validated() {
        let (mut scene, mesh, mat) = scene_with_cube();
        let id = scene
            .spawn(Entity::new("a", mesh, mat, Transform::new()))
            .unwrap();

        assert!(matches!(
            scene.set_entity_mesh(id, MeshHandle(7)),
            Err(SceneError::InvalidMesh(MeshHandle(7)))
        ));
        assert!(matches!(
            scene.set_entity_material(id, MaterialHandle(3)),
            Err(SceneError::InvalidMaterial(MaterialHandle(3)))
        ));
        assert_eq!(scene.entity(id).unwrap().mesh(), mesh);
        assert_eq!(scene.entity(id).unwrap().material(), mat);

        let sphere = scene
            .assets_mut()
            .add_mesh("sphere", Primitive::Sphere.build());
        let red = scene
            .add_material(Material::new("red", Vec4::X, ShadingModel::Unlit))
            .unwrap();
        scene.set_entity_mesh(id, sphere).unwrap();
        scene.set_entity_material(id, red).unwrap();
        assert_eq!(scene.entity(id).unwrap().mesh(), sphere);
        assert_eq!(scene.entity(id).unwrap().material(), red);

        scene.despawn(id);
        assert!(matches!(
            scene.set_entity_mesh(id, sphere),
            Err(SceneError::UnknownEntity(_))
        ));
    }

    #[test]
    fn camera_cycling_wraps() {
        let mut scene = Scene::new();
        scene.add_camera(Camera::default());
        scene.add_camera(Camera::default());
        assert_eq!(scene.cycle_camera(), 1);
        assert_eq!(scene.cycle_camera(), 2);
        assert_eq!(scene.cycle_camera(), 0);
    }

    #[test]
    fn set_active_camera_validates() {
        let mut scene = Scene::new();
        assert!(matches!(
            scene.set_active_camera(3),
            Err(SceneError::CameraIndex { index: 3, count: 1 })
        ));
        scene.add_camera(Camera::default());
        scene.set_active_camera(1).unwrap();
        assert_eq!(scene.active_camera_index(), 1);
    }

    #[test]
    fn empty_camera_list_keeps_default() {
        let mut scene = Scene::new();
        scene.set_cameras(Vec::new());
        assert_eq!(scene.cameras().len(), 1);
    }

    #[test]
    fn aspect_reaches_every_camera() {
        let mut scene = Scene::new();
        scene.add_camera(Camera::default());
        scene.set_aspect(1.25);
        assert!(scene.cameras().iter().all(|c| c.aspect() == 1.25));
    }

    #[test]
    fn update_moves_only_active_camera() {
        let mut scene = Scene::new();
        scene.add_camera(Camera::default());
        scene.set_active_camera(1).unwrap();
        let controls = CameraControls {
            local: Vec3::X,
            ..Default::default()
        };
        scene.update(1.0, &controls);
        assert_eq!(scene.cameras()[0].position(), Vec3::new(0.0, 0.0, 15.0));
        assert!(scene.cameras()[1].position().x > 0.0);
    }

    #[test]
    fn sky_requires_registered_mesh() {
        let mut scene = Scene::new();
        let sky = Sky {
            mesh: MeshHandle(0),
            cubemap: CubemapData::solid([0, 0, 0, 255]),
        };
        assert!(scene.set_sky(Some(sky.clone())).is_err());
        let mesh = scene.assets_mut().add_mesh("cube", Primitive::Cube.build());
        scene
            .set_sky(Some(Sky { mesh, ..sky }))
            .unwrap();
        assert!(scene.sky().is_some());
        scene.set_sky(None).unwrap();
        assert!(scene.sky().is_none());
    }

    #[test]
    fn light_list_edits() {
        let mut scene = Scene::new();
        let i = scene.add_light(Light::point(1.0, Vec3::ONE, 5.0, Vec3::ZERO));
        scene.lights_mut()[i].intensity = 2.0;
        assert_eq!(scene.lights()[0].intensity, 2.0);
        assert!(scene.remove_light(5).is_none());
        assert!(scene.remove_light(0).is_some());
        assert!(scene.lights().is_empty());
    }
}
