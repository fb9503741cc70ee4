//! Asset pipeline: OBJ meshes with tangents, procedural primitives, decoded
//! textures, and a content-addressed registry.
//!
//! Consumers refer to assets by handle, never by file path. Registering the
//! same content twice yields the same handle.

pub mod mesh;
pub mod obj;
pub mod primitives;
pub mod tangent;
pub mod texture;

pub use mesh::{MeshData, Vertex};
pub use obj::{ObjError, ObjOptions, load_obj, parse_obj, parse_obj_str};
pub use primitives::Primitive;
pub use texture::{ColorSpace, CubemapData, MAX_GENERATED_SIZE, TextureData, TextureError};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

/// Handle to a mesh registered in an [`AssetStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

/// Handle to a texture registered in an [`AssetStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("mesh '{name}': {source}")]
    Mesh {
        name: String,
        #[source]
        source: ObjError,
    },
    #[error("texture '{name}': {source}")]
    Texture {
        name: String,
        #[source]
        source: TextureError,
    },
}

#[derive(Debug, Clone)]
pub struct MeshAsset {
    pub name: String,
    pub hash: u64,
    pub data: MeshData,
}

#[derive(Debug, Clone)]
pub struct TextureAsset {
    pub name: String,
    pub hash: u64,
    pub color_space: ColorSpace,
    pub data: TextureData,
}

/// Serializable listing of a store's contents, for tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetManifest {
    pub meshes: Vec<MeshEntry>,
    pub textures: Vec<TextureEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshEntry {
    pub handle: MeshHandle,
    pub name: String,
    pub hash: String,
    pub vertices: usize,
    pub indices: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextureEntry {
    pub handle: TextureHandle,
    pub name: String,
    pub hash: String,
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
}

/// Content-addressed registry of meshes and textures.
///
/// Handles index registration order, which is also iteration order.
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    meshes: Vec<MeshAsset>,
    textures: Vec<TextureAsset>,
    mesh_hashes: HashMap<u64, MeshHandle>,
    texture_hashes: HashMap<u64, TextureHandle>,
    mesh_names: HashMap<String, MeshHandle>,
    texture_names: HashMap<String, TextureHandle>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register mesh data. Identical geometry returns the existing handle,
    /// and `name` becomes an alias for it.
    ///
    /// A name already in use keeps pointing at its first asset.
    pub fn add_mesh(&mut self, name: impl Into<String>, data: MeshData) -> MeshHandle {
        let name = name.into();
        let hash = mesh_hash(&data);
        if let Some(&existing) = self.mesh_hashes.get(&hash) {
            tracing::debug!(name = %name, existing = existing.0, "mesh content already registered");
            self.mesh_names.entry(name).or_insert(existing);
            return existing;
        }
        let handle = MeshHandle(self.meshes.len() as u32);
        self.mesh_names.entry(name.clone()).or_insert(handle);
        self.meshes.push(MeshAsset { name, hash, data });
        self.mesh_hashes.insert(hash, handle);
        handle
    }

    /// Register texture data. Identical texels in the same colour space
    /// return the existing handle, and `name` becomes an alias for it.
    pub fn add_texture(
        &mut self,
        name: impl Into<String>,
        data: TextureData,
        color_space: ColorSpace,
    ) -> TextureHandle {
        let name = name.into();
        let hash = texture_hash(&data, color_space);
        if let Some(&existing) = self.texture_hashes.get(&hash) {
            tracing::debug!(name = %name, existing = existing.0, "texture content already registered");
            self.texture_names.entry(name).or_insert(existing);
            return existing;
        }
        let handle = TextureHandle(self.textures.len() as u32);
        self.texture_names.entry(name.clone()).or_insert(handle);
        self.textures.push(TextureAsset {
            name,
            hash,
            color_space,
            data,
        });
        self.texture_hashes.insert(hash, handle);
        handle
    }

    /// Load and register an OBJ file.
    pub fn load_mesh(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
        options: &ObjOptions,
    ) -> Result<MeshHandle, AssetError> {
        let data = load_obj(path, options).map_err(|source| AssetError::Mesh {
            name: name.to_string(),
            source,
        })?;
        Ok(self.add_mesh(name, data))
    }

    /// Load and register an image file.
    pub fn load_texture(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
        color_space: ColorSpace,
    ) -> Result<TextureHandle, AssetError> {
        let data = TextureData::load(path).map_err(|source| AssetError::Texture {
            name: name.to_string(),
            source,
        })?;
        Ok(self.add_texture(name, data, color_space))
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshAsset> {
        self.meshes.get(handle.0 as usize)
    }

    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureAsset> {
        self.textures.get(handle.0 as usize)
    }

    /// Look up a mesh by any name it was registered under.
    pub fn mesh_by_name(&self, name: &str) -> Option<MeshHandle> {
        self.mesh_names.get(name).copied()
    }

    pub fn texture_by_name(&self, name: &str) -> Option<TextureHandle> {
        self.texture_names.get(name).copied()
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshHandle, &MeshAsset)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, m)| (MeshHandle(i as u32), m))
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureHandle, &TextureAsset)> {
        self.textures
            .iter()
            .enumerate()
            .map(|(i, t)| (TextureHandle(i as u32), t))
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty() && self.textures.is_empty()
    }

    pub fn manifest(&self) -> AssetManifest {
        AssetManifest {
            meshes: self
                .meshes()
                .map(|(handle, m)| MeshEntry {
                    handle,
                    name: m.name.clone(),
                    hash: format!("{:016x}", m.hash),
                    vertices: m.data.vertex_count(),
                    indices: m.data.index_count(),
                })
                .collect(),
            textures: self
                .textures()
                .map(|(handle, t)| TextureEntry {
                    handle,
                    name: t.name.clone(),
                    hash: format!("{:016x}", t.hash),
                    width: t.data.width,
                    height: t.data.height,
                    color_space: t.color_space,
                })
                .collect(),
        }
    }
}

fn truncate_digest(hasher: Sha256) -> u64 {
    let result = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&result[..8]);
    u64::from_le_bytes(bytes)
}

fn mesh_hash(data: &MeshData) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(b"mesh");
    for v in &data.vertices {
        for f in v
            .position
            .to_array()
            .into_iter()
            .chain(v.normal.to_array())
            .chain(v.uv.to_array())
        {
            hasher.update(f.to_le_bytes());
        }
    }
    for i in &data.indices {
        hasher.update(i.to_le_bytes());
    }
    truncate_digest(hasher)
}

fn texture_hash(data: &TextureData, color_space: ColorSpace) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(b"texture");
    hasher.update([color_space as u8]);
    hasher.update(data.width.to_le_bytes());
    hasher.update(data.height.to_le_bytes());
    hasher.update(&data.rgba);
    truncate_digest(hasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_mesh() {
        let mut store = AssetStore::new();
        let id = store.add_mesh("cube", primitives::cube(1.0));
        assert_eq!(store.mesh(id).unwrap().name, "cube");
        assert_eq!(store.mesh_count(), 1);
        assert_eq!(store.mesh_by_name("cube"), Some(id));
    }

    #[test]
    fn content_addressed_dedup() {
        let mut store = AssetStore::new();
        let a = store.add_mesh("cube", primitives::cube(1.0));
        let b = store.add_mesh("cube again", primitives::cube(1.0));
        let c = store.add_mesh("big cube", primitives::cube(2.0));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(store.mesh_count(), 2);
    }

    #[test]
    fn deduplicated_names_still_resolve() {
        let mut store = AssetStore::new();
        let cube = store.add_mesh("Cube", primitives::cube(0.5));
        let sky = store.add_mesh("Sky Cube", primitives::cube(0.5));
        assert_eq!(cube, sky);
        assert_eq!(store.mesh_by_name("Sky Cube"), Some(cube));
        assert_eq!(store.mesh_by_name("Cube"), Some(cube));

        let white = store.add_texture("white", TextureData::solid([255; 4]), ColorSpace::Srgb);
        store.add_texture("blank", TextureData::solid([255; 4]), ColorSpace::Srgb);
        assert_eq!(store.texture_by_name("blank"), Some(white));
    }

    #[test]
    fn reused_name_keeps_first_asset() {
        let mut store = AssetStore::new();
        let small = store.add_mesh("cube", primitives::cube(1.0));
        store.add_mesh("cube", primitives::cube(2.0));
        assert_eq!(store.mesh_by_name("cube"), Some(small));
    }

    #[test]
    fn texture_dedup_respects_color_space() {
        let mut store = AssetStore::new();
        let srgb = store.add_texture("white", TextureData::solid([255; 4]), ColorSpace::Srgb);
        let again = store.add_texture("white2", TextureData::solid([255; 4]), ColorSpace::Srgb);
        let linear = store.add_texture("white_lin", TextureData::solid([255; 4]), ColorSpace::Linear);
        assert_eq!(srgb, again);
        assert_ne!(srgb, linear);
        assert_eq!(store.texture_count(), 2);
        assert_eq!(store.texture(linear).unwrap().color_space, ColorSpace::Linear);
    }

    #[test]
    fn iteration_follows_registration_order() {
        let mut store = AssetStore::new();
        for p in Primitive::ALL {
            store.add_mesh(p.label(), p.build());
        }
        let names: Vec<_> = store.meshes().map(|(_, m)| m.name.as_str()).collect();
        let expected: Vec<_> = Primitive::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn load_mesh_reports_name_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AssetStore::new();
        let err = store
            .load_mesh("helix", dir.path().join("helix.obj"), &ObjOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("helix"));
        assert!(store.is_empty());
    }

    #[test]
    fn manifest_lists_everything() {
        let mut store = AssetStore::new();
        store.add_mesh("quad", primitives::quad(1.0, false));
        store.add_texture("normal", TextureData::flat_normal(), ColorSpace::Linear);
        let manifest = store.manifest();
        assert_eq!(manifest.meshes.len(), 1);
        assert_eq!(manifest.meshes[0].vertices, 4);
        assert_eq!(manifest.textures[0].width, 1);
        assert_eq!(manifest.meshes[0].hash.len(), 16);

        let json = serde_json::to_string(&manifest).unwrap();
        assert!(json.contains("\"linear\""));
    }
}
