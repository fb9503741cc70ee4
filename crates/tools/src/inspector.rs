use lumen_common::EntityId;
use lumen_scene::Scene;
use serde::Serialize;

/// Scene inspector for developer tooling.
///
/// Read-only queries against a scene for debugging, the CLI and the editor
/// UI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene.
    pub fn summary(scene: &Scene) -> SceneSummary {
        let total_triangles = scene
            .entities()
            .values()
            .filter_map(|e| scene.assets().mesh(e.mesh()))
            .map(|m| m.data.triangle_count())
            .sum();
        SceneSummary {
            entity_count: scene.entity_count(),
            material_count: scene.material_count(),
            mesh_count: scene.assets().mesh_count(),
            texture_count: scene.assets().texture_count(),
            light_count: scene.lights().len(),
            camera_count: scene.cameras().len(),
            active_camera: scene.active_camera_index(),
            total_triangles,
            has_sky: scene.sky().is_some(),
        }
    }

    /// Details of one entity.
    pub fn inspect_entity(scene: &Scene, id: EntityId) -> Option<EntityInfo> {
        scene.entity(id).map(|e| {
            let t = &e.transform;
            EntityInfo {
                id,
                name: e.name.clone(),
                position: t.position().to_array(),
                rotation: t.rotation().to_array(),
                scale: t.scale().to_array(),
                mesh: scene
                    .assets()
                    .mesh(e.mesh())
                    .map(|m| m.name.clone())
                    .unwrap_or_default(),
                material: scene
                    .material(e.material())
                    .map(|m| m.name.clone())
                    .unwrap_or_default(),
            }
        })
    }

    /// All entity ids in creation order.
    pub fn list_entities(scene: &Scene) -> Vec<EntityId> {
        scene.entities().keys().copied().collect()
    }

    /// Size of every registered mesh.
    pub fn mesh_stats(scene: &Scene) -> Vec<MeshStats> {
        scene
            .assets()
            .meshes()
            .map(|(handle, mesh)| MeshStats {
                handle: handle.0,
                name: mesh.name.clone(),
                vertices: mesh.data.vertex_count(),
                indices: mesh.data.index_count(),
                triangles: mesh.data.triangle_count(),
            })
            .collect()
    }

    pub fn lights(scene: &Scene) -> Vec<LightInfo> {
        scene
            .lights()
            .iter()
            .enumerate()
            .map(|(index, light)| LightInfo {
                index,
                kind: light.kind.label(),
                intensity: light.intensity,
                color: light.color.to_array(),
                position: light.kind.uses_position().then(|| light.position.to_array()),
                direction: light.kind.uses_direction().then(|| light.direction.to_array()),
                range: light.kind.uses_position().then_some(light.range),
            })
            .collect()
    }
}

/// Summary of scene contents for the inspector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    pub entity_count: usize,
    pub material_count: usize,
    pub mesh_count: usize,
    pub texture_count: usize,
    pub light_count: usize,
    pub camera_count: usize,
    pub active_camera: usize,
    /// Triangles drawn per frame, summed over entities.
    pub total_triangles: usize,
    pub has_sky: bool,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: entities={} materials={} meshes={} textures={} lights={} cameras={} (active {}) tris={} sky={}",
            self.entity_count,
            self.material_count,
            self.mesh_count,
            self.texture_count,
            self.light_count,
            self.camera_count,
            self.active_camera,
            self.total_triangles,
            if self.has_sky { "yes" } else { "no" }
        )
    }
}

/// Detailed info about a single entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: String,
    pub position: [f32; 3],
    /// Pitch, yaw, roll in radians.
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
    pub mesh: String,
    pub material: String,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entity {} '{}' pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2}) mesh={} material={}",
            self.id,
            self.name,
            self.position[0],
            self.position[1],
            self.position[2],
            self.scale[0],
            self.scale[1],
            self.scale[2],
            self.mesh,
            self.material,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeshStats {
    pub handle: u32,
    pub name: String,
    pub vertices: usize,
    pub indices: usize,
    pub triangles: usize,
}

impl std::fmt::Display for MeshStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: tris={} verts={} indices={}",
            self.name, self.triangles, self.vertices, self.indices
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightInfo {
    pub index: usize,
    pub kind: &'static str,
    pub intensity: f32,
    pub color: [f32; 3],
    pub position: Option<[f32; 3]>,
    pub direction: Option<[f32; 3]>,
    pub range: Option<f32>,
}
