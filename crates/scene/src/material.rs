use glam::{Vec2, Vec4};
use lumen_assets::TextureHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Handle to a material registered in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialHandle(pub u32);

/// Which shader pair a material is drawn with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ShadingModel {
    #[default]
    Lit,
    Unlit,
    DebugNormals,
    DebugUvs,
}

impl ShadingModel {
    pub const ALL: [ShadingModel; 4] = [
        ShadingModel::Lit,
        ShadingModel::Unlit,
        ShadingModel::DebugNormals,
        ShadingModel::DebugUvs,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ShadingModel::Lit => "Lit",
            ShadingModel::Unlit => "Unlit",
            ShadingModel::DebugNormals => "Debug Normals",
            ShadingModel::DebugUvs => "Debug UVs",
        }
    }
}

/// Named texture slots a material can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureSlot {
    Albedo,
    Normal,
}

impl TextureSlot {
    pub fn label(self) -> &'static str {
        match self {
            TextureSlot::Albedo => "Albedo",
            TextureSlot::Normal => "Normal Map",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressMode {
    #[default]
    Wrap,
    Clamp,
    Mirror,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    Linear,
    Nearest,
}

/// Sampler description. Backends create one sampler per distinct value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerSettings {
    pub address: AddressMode,
    pub filter: FilterMode,
    /// 1 disables anisotropic filtering.
    pub anisotropy: u16,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            address: AddressMode::Wrap,
            filter: FilterMode::Linear,
            anisotropy: 16,
        }
    }
}

/// Surface description: shading model, tint, textures and UV transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    color_tint: Vec4,
    roughness: f32,
    uv_scale: Vec2,
    uv_offset: Vec2,
    shading: ShadingModel,
    textures: BTreeMap<TextureSlot, TextureHandle>,
    sampler: SamplerSettings,
}

impl Material {
    pub fn new(name: impl Into<String>, color_tint: Vec4, shading: ShadingModel) -> Self {
        Self {
            name: name.into(),
            color_tint,
            roughness: 0.5,
            uv_scale: Vec2::ONE,
            uv_offset: Vec2::ZERO,
            shading,
            textures: BTreeMap::new(),
            sampler: SamplerSettings::default(),
        }
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.set_roughness(roughness);
        self
    }

    pub fn with_texture(mut self, slot: TextureSlot, texture: TextureHandle) -> Self {
        self.textures.insert(slot, texture);
        self
    }

    pub fn with_uv_transform(mut self, scale: Vec2, offset: Vec2) -> Self {
        self.uv_scale = scale;
        self.uv_offset = offset;
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerSettings) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn color_tint(&self) -> Vec4 {
        self.color_tint
    }

    pub fn set_color_tint(&mut self, tint: Vec4) {
        self.color_tint = tint;
    }

    /// Replace the tint's colour, keeping its alpha.
    pub fn set_tint_rgb(&mut self, rgb: glam::Vec3) {
        self.color_tint = rgb.extend(self.color_tint.w);
    }

    pub fn roughness(&self) -> f32 {
        self.roughness
    }

    /// Roughness is kept in 0..=1.
    pub fn set_roughness(&mut self, roughness: f32) {
        self.roughness = if roughness.is_nan() {
            0.0
        } else {
            roughness.clamp(0.0, 1.0)
        };
    }

    pub fn uv_scale(&self) -> Vec2 {
        self.uv_scale
    }

    pub fn set_uv_scale(&mut self, scale: Vec2) {
        self.uv_scale = scale;
    }

    pub fn uv_offset(&self) -> Vec2 {
        self.uv_offset
    }

    pub fn set_uv_offset(&mut self, offset: Vec2) {
        self.uv_offset = offset;
    }

    pub fn shading(&self) -> ShadingModel {
        self.shading
    }

    pub fn set_shading(&mut self, shading: ShadingModel) {
        self.shading = shading;
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<TextureHandle> {
        self.textures.get(&slot).copied()
    }

    pub fn set_texture(&mut self, slot: TextureSlot, texture: Option<TextureHandle>) {
        match texture {
            Some(t) => {
                self.textures.insert(slot, t);
            }
            None => {
                self.textures.remove(&slot);
            }
        }
    }

    pub fn textures(&self) -> impl Iterator<Item = (TextureSlot, TextureHandle)> + '_ {
        self.textures.iter().map(|(slot, tex)| (*slot, *tex))
    }

    pub fn sampler(&self) -> SamplerSettings {
        self.sampler
    }

    pub fn set_sampler(&mut self, sampler: SamplerSettings) {
        self.sampler = sampler;
    }
}
