use crate::material::MaterialHandle;
use lumen_assets::{CubemapData, MeshHandle};
use lumen_common::Transform;

/// A drawable object: a mesh, a material and a placement.
///
/// Mesh and material are only changed through [`Scene`](crate::Scene), which
/// checks that the handles exist.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    mesh: MeshHandle,
    material: MaterialHandle,
    pub transform: Transform,
}

impl Entity {
    pub fn new(
        name: impl Into<String>,
        mesh: MeshHandle,
        material: MaterialHandle,
        transform: Transform,
    ) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            transform,
        }
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    pub fn material(&self) -> MaterialHandle {
        self.material
    }

    pub(crate) fn set_mesh(&mut self, mesh: MeshHandle) {
        self.mesh = mesh;
    }

    pub(crate) fn set_material(&mut self, material: MaterialHandle) {
        self.material = material;
    }
}

/// Background drawn behind everything: a cube mesh sampled with a cubemap.
#[derive(Debug, Clone)]
pub struct Sky {
    pub mesh: MeshHandle,
    pub cubemap: CubemapData,
}
