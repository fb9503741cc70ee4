use crate::resources::{
    DEPTH_FORMAT, GpuCubemap, GpuMesh, GpuTexture, create_depth_texture, sampler_descriptor,
};
use crate::shaders;
use crate::uniforms::{DrawUniforms, FrameUniforms, GpuVertex, MaterialParams, aligned_stride};
use lumen_assets::{ColorSpace, MeshHandle, TextureData, TextureHandle};
use lumen_render::FramePacket;
use lumen_scene::{Material, MaterialHandle, SamplerSettings, Scene, ShadingModel, TextureSlot};
use std::collections::{BTreeMap, HashMap};
use wgpu::util::DeviceExt;

/// What a material's bind group was built from. A change means rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MaterialKey {
    albedo: Option<TextureHandle>,
    normal: Option<TextureHandle>,
    sampler: SamplerSettings,
}

impl From<&Material> for MaterialKey {
    fn from(m: &Material) -> Self {
        Self {
            albedo: m.texture(TextureSlot::Albedo),
            normal: m.texture(TextureSlot::Normal),
            sampler: m.sampler(),
        }
    }
}

struct GpuMaterial {
    key: MaterialKey,
    params: MaterialParams,
    bind_group: wgpu::BindGroup,
}

struct GpuSky {
    mesh: MeshHandle,
    bind_group: wgpu::BindGroup,
    // Keeps the cube texture alive for the bind group.
    _cubemap: GpuCubemap,
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    pipelines: BTreeMap<ShadingModel, wgpu::RenderPipeline>,
    sky_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_capacity: usize,
    draw_stride: u64,
    material_layout: wgpu::BindGroupLayout,
    sky_layout: wgpu::BindGroupLayout,
    meshes: BTreeMap<MeshHandle, GpuMesh>,
    textures: BTreeMap<TextureHandle, GpuTexture>,
    samplers: HashMap<SamplerSettings, wgpu::Sampler>,
    materials: Vec<GpuMaterial>,
    default_albedo: GpuTexture,
    default_normal: GpuTexture,
    sky: Option<GpuSky>,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

fn texture_entry(binding: u32, view_dimension: wgpu::TextureViewDimension) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension,
            multisampled: false,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn uniform_entry(binding: u32, dynamic: bool, size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: wgpu::BufferSize::new(size),
        },
        count: None,
    }
}

struct PipelineDesc<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    source: String,
    format: wgpu::TextureFormat,
    cull_mode: wgpu::Face,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
}

fn create_pipeline(device: &wgpu::Device, desc: PipelineDesc<'_>) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(desc.label),
        source: wgpu::ShaderSource::Wgsl(desc.source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[GpuVertex::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(desc.cull_mode),
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: desc.depth_write,
            depth_compare: desc.depth_compare,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

impl WgpuRenderer {
    /// Create pipelines and upload every asset, material and the sky of
    /// `scene`.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: &Scene,
    ) -> Self {
        let frame_size = std::mem::size_of::<FrameUniforms>() as u64;
        let draw_size = std::mem::size_of::<DrawUniforms>() as u64;

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bind_group_layout"),
            entries: &[uniform_entry(0, false, frame_size)],
        });
        let draw_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_bind_group_layout"),
            entries: &[uniform_entry(0, true, draw_size)],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material_bind_group_layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::D2),
                texture_entry(1, wgpu::TextureViewDimension::D2),
                sampler_entry(2),
            ],
        });
        let sky_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sky_bind_group_layout"),
            entries: &[
                texture_entry(0, wgpu::TextureViewDimension::Cube),
                sampler_entry(1),
            ],
        });

        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame_uniform_buffer"),
            contents: bytemuck::bytes_of(&<FrameUniforms as bytemuck::Zeroable>::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let draw_stride = aligned_stride(
            draw_size,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let draw_capacity = scene.entity_count().max(64);
        let (draw_buffer, draw_bind_group) =
            Self::create_draw_buffer(device, &draw_layout, draw_capacity, draw_stride);

        let surface_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("surface_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let pipelines = ShadingModel::ALL
            .into_iter()
            .map(|shading| {
                let pipeline = create_pipeline(
                    device,
                    PipelineDesc {
                        label: shading.label(),
                        layout: &surface_layout,
                        source: shaders::surface_source(shading),
                        format: surface_format,
                        cull_mode: wgpu::Face::Back,
                        depth_write: true,
                        depth_compare: wgpu::CompareFunction::Less,
                    },
                );
                (shading, pipeline)
            })
            .collect();

        let sky_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sky_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &sky_layout],
            push_constant_ranges: &[],
        });
        // Seen from inside the cube, so front faces are culled.
        let sky_pipeline = create_pipeline(
            device,
            PipelineDesc {
                label: "sky",
                layout: &sky_pipeline_layout,
                source: shaders::sky_source(),
                format: surface_format,
                cull_mode: wgpu::Face::Front,
                depth_write: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
            },
        );

        let default_albedo = GpuTexture::new(
            device,
            queue,
            "default_albedo",
            &TextureData::solid([255; 4]),
            ColorSpace::Srgb,
        );
        let default_normal = GpuTexture::new(
            device,
            queue,
            "default_normal",
            &TextureData::flat_normal(),
            ColorSpace::Linear,
        );

        let mut renderer = Self {
            pipelines,
            sky_pipeline,
            frame_buffer,
            frame_bind_group,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_capacity,
            draw_stride,
            material_layout,
            sky_layout,
            meshes: BTreeMap::new(),
            textures: BTreeMap::new(),
            samplers: HashMap::new(),
            materials: Vec::new(),
            default_albedo,
            default_normal,
            sky: None,
            depth_texture: create_depth_texture(device, width, height),
            surface_format,
        };
        renderer.sync_assets(device, queue, scene);
        renderer.sync_materials(device, scene);
        renderer.upload_sky(device, queue, scene);

        tracing::info!(
            meshes = renderer.meshes.len(),
            textures = renderer.textures.len(),
            materials = renderer.materials.len(),
            sky = renderer.sky.is_some(),
            "wgpu renderer ready"
        );
        renderer
    }

    fn create_draw_buffer(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: usize,
        stride: u64,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw_uniform_buffer"),
            size: capacity as u64 * stride,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_bind_group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    /// Upload meshes and textures registered since the last call.
    pub fn sync_assets(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) {
        for (handle, mesh) in scene.assets().meshes() {
            self.meshes
                .entry(handle)
                .or_insert_with(|| GpuMesh::new(device, &mesh.name, &mesh.data));
        }
        for (handle, texture) in scene.assets().textures() {
            self.textures.entry(handle).or_insert_with(|| {
                GpuTexture::new(device, queue, &texture.name, &texture.data, texture.color_space)
            });
        }
    }

    /// Refresh per-material parameters and rebuild bind groups whose
    /// textures or sampler changed. Cheap enough to call every frame.
    pub fn sync_materials(&mut self, device: &wgpu::Device, scene: &Scene) {
        for (handle, material) in scene.materials() {
            let key = MaterialKey::from(material);
            let params = MaterialParams::from(material);
            let index = handle.0 as usize;
            if let Some(gpu) = self.materials.get_mut(index) {
                if gpu.key == key {
                    gpu.params = params;
                    continue;
                }
            }
            let bind_group = self.create_material_bind_group(device, &material.name, key);
            let gpu = GpuMaterial {
                key,
                params,
                bind_group,
            };
            if index < self.materials.len() {
                self.materials[index] = gpu;
            } else {
                self.materials.push(gpu);
            }
        }
    }

    fn create_material_bind_group(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        key: MaterialKey,
    ) -> wgpu::BindGroup {
        tracing::debug!(material = %name, ?key, "building material bind group");
        let sampler = self
            .samplers
            .entry(key.sampler)
            .or_insert_with(|| device.create_sampler(&sampler_descriptor(&key.sampler)));
        let albedo = key
            .albedo
            .and_then(|h| self.textures.get(&h))
            .unwrap_or(&self.default_albedo);
        let normal = key
            .normal
            .and_then(|h| self.textures.get(&h))
            .unwrap_or(&self.default_normal);

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(name),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&albedo.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }

    fn upload_sky(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, scene: &Scene) {
        let Some(sky) = scene.sky() else {
            self.sky = None;
            return;
        };
        let cubemap = GpuCubemap::new(device, queue, &sky.cubemap);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sky_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sky_bind_group"),
            layout: &self.sky_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&cubemap.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });
        self.sky = Some(GpuSky {
            mesh: sky.mesh,
            bind_group,
            _cubemap: cubemap,
        });
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// View of an uploaded texture, for editor previews.
    pub fn texture_view(&self, handle: TextureHandle) -> Option<&wgpu::TextureView> {
        self.textures.get(&handle).map(|t| &t.view)
    }

    fn material_params(&self, handle: MaterialHandle) -> MaterialParams {
        self.materials
            .get(handle.0 as usize)
            .map(|m| m.params)
            .unwrap_or_default()
    }

    /// Render one frame: entities grouped by pipeline, then the sky.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        packet: &FramePacket,
    ) {
        queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameUniforms::from_packet(packet)),
        );

        if packet.draws.len() > self.draw_capacity {
            self.draw_capacity = packet.draws.len().next_power_of_two();
            let (buffer, bind_group) = Self::create_draw_buffer(
                device,
                &self.draw_layout,
                self.draw_capacity,
                self.draw_stride,
            );
            self.draw_buffer = buffer;
            self.draw_bind_group = bind_group;
            tracing::debug!(capacity = self.draw_capacity, "grew draw uniform buffer");
        }

        let stride = self.draw_stride as usize;
        if !packet.draws.is_empty() {
            let mut bytes = vec![0u8; packet.draws.len() * stride];
            for (i, draw) in packet.draws.iter().enumerate() {
                let uniforms = DrawUniforms::new(
                    draw.world,
                    draw.world_inverse_transpose,
                    &self.material_params(draw.material),
                );
                let raw = bytemuck::bytes_of(&uniforms);
                bytes[i * stride..i * stride + raw.len()].copy_from_slice(raw);
            }
            queue.write_buffer(&self.draw_buffer, 0, &bytes);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let c = packet.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: c.x as f64,
                            g: c.y as f64,
                            b: c.z as f64,
                            a: c.w as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.frame_bind_group, &[]);

            let mut bound_shading = None;
            let mut bound_material = None;
            for (i, draw) in packet.draws.iter().enumerate() {
                let (Some(mesh), Some(material), Some(pipeline)) = (
                    self.meshes.get(&draw.mesh),
                    self.materials.get(draw.material.0 as usize),
                    self.pipelines.get(&draw.shading),
                ) else {
                    continue;
                };
                if bound_shading != Some(draw.shading) {
                    pass.set_pipeline(pipeline);
                    bound_shading = Some(draw.shading);
                }
                if bound_material != Some(draw.material) {
                    pass.set_bind_group(2, &material.bind_group, &[]);
                    bound_material = Some(draw.material);
                }
                pass.set_bind_group(1, &self.draw_bind_group, &[(i * stride) as u32]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }

            if packet.sky {
                if let Some(sky) = &self.sky {
                    if let Some(mesh) = self.meshes.get(&sky.mesh) {
                        pass.set_pipeline(&self.sky_pipeline);
                        pass.set_bind_group(1, &sky.bind_group, &[]);
                        pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                        pass.set_index_buffer(
                            mesh.index_buffer.slice(..),
                            wgpu::IndexFormat::Uint32,
                        );
                        pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                    }
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}
