use crate::uniforms::GpuVertex;
use lumen_assets::{ColorSpace, CubemapData, MeshData, TextureData};
use lumen_scene::{AddressMode, FilterMode, SamplerSettings};
use wgpu::util::DeviceExt;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertex and index buffers for one mesh.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, name: &str, mesh: &MeshData) -> Self {
        let vertices: Vec<GpuVertex> = mesh.vertices.iter().map(GpuVertex::from).collect();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name}_vertex_buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{name}_index_buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

pub(crate) fn texture_format(color_space: ColorSpace) -> wgpu::TextureFormat {
    match color_space {
        ColorSpace::Srgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => wgpu::TextureFormat::Rgba8Unorm,
    }
}

fn write_rgba_layer(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    layer: u32,
    data: &TextureData,
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        &data.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * data.width),
            rows_per_image: Some(data.height),
        },
        wgpu::Extent3d {
            width: data.width,
            height: data.height,
            depth_or_array_layers: 1,
        },
    );
}

/// A 2D RGBA8 texture and its default view.
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        data: &TextureData,
        color_space: ColorSpace,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(name),
            size: wgpu::Extent3d {
                width: data.width,
                height: data.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(color_space),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_rgba_layer(queue, &texture, 0, data);
        let view = texture.create_view(&Default::default());
        Self { texture, view }
    }
}

/// Six-layer sRGB texture viewed as a cube.
pub struct GpuCubemap {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuCubemap {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, cubemap: &CubemapData) -> Self {
        let size = cubemap.size();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("sky_cubemap"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: texture_format(ColorSpace::Srgb),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (layer, face) in cubemap.faces().iter().enumerate() {
            write_rgba_layer(queue, &texture, layer as u32, face);
        }
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("sky_cubemap_view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        Self { texture, view }
    }
}

fn address_mode(mode: AddressMode) -> wgpu::AddressMode {
    match mode {
        AddressMode::Wrap => wgpu::AddressMode::Repeat,
        AddressMode::Clamp => wgpu::AddressMode::ClampToEdge,
        AddressMode::Mirror => wgpu::AddressMode::MirrorRepeat,
    }
}

/// Translate sampler settings. Anisotropy only applies to fully linear
/// filtering, so nearest filtering forces it off.
pub fn sampler_descriptor(settings: &SamplerSettings) -> wgpu::SamplerDescriptor<'static> {
    let address = address_mode(settings.address);
    let filter = match settings.filter {
        FilterMode::Linear => wgpu::FilterMode::Linear,
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
    };
    let anisotropy_clamp = match settings.filter {
        FilterMode::Linear => settings.anisotropy.clamp(1, 16),
        FilterMode::Nearest => 1,
    };
    wgpu::SamplerDescriptor {
        label: Some("material_sampler"),
        address_mode_u: address,
        address_mode_v: address,
        address_mode_w: address,
        mag_filter: filter,
        min_filter: filter,
        mipmap_filter: filter,
        anisotropy_clamp,
        ..Default::default()
    }
}

pub(crate) fn create_depth_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sampler_is_anisotropic_repeat() {
        let desc = sampler_descriptor(&SamplerSettings::default());
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::Repeat);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.anisotropy_clamp, 16);
    }

    #[test]
    fn nearest_disables_anisotropy() {
        let desc = sampler_descriptor(&SamplerSettings {
            address: AddressMode::Mirror,
            filter: FilterMode::Nearest,
            anisotropy: 16,
        });
        assert_eq!(desc.anisotropy_clamp, 1);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::MirrorRepeat);
    }

    #[test]
    fn anisotropy_zero_is_clamped_to_one() {
        let desc = sampler_descriptor(&SamplerSettings {
            anisotropy: 0,
            ..Default::default()
        });
        assert_eq!(desc.anisotropy_clamp, 1);
    }

    #[test]
    fn formats_follow_color_space() {
        assert!(texture_format(ColorSpace::Srgb).is_srgb());
        assert!(!texture_format(ColorSpace::Linear).is_srgb());
    }
}
