use std::collections::{BTreeMap, HashMap};

use anyhow::{Result, bail};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::coords::ColorRgba;

use super::backend::{
    Backend, BufferId, MAX_UNIFORM_SLOTS, ProgramId, ShaderSource, TextureId, VertexArrayId,
};
use super::Gpu;
use super::surface::{Acquired, SurfaceFrame};

const UNIFORM_SLOT_BYTES: u64 = 16;

/// `Backend` implementation on top of wgpu.
///
/// GL-style bind state is tracked on the CPU and resolved when a draw is
/// issued: each draw records its own render pass (load, not clear) into the
/// current frame's encoder. Pipelines are built lazily per program and vertex
/// layout.
pub struct WgpuBackend {
    gpu: Gpu,
    next_id: u32,

    sampler: wgpu::Sampler,

    /// Compiled modules keyed by `ShaderSource::label`.
    modules: HashMap<String, wgpu::ShaderModule>,
    programs: HashMap<ProgramId, ProgramState>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    vertex_arrays: HashMap<VertexArrayId, BTreeMap<u32, Attribute>>,
    textures: HashMap<TextureId, wgpu::TextureView>,

    bound: Bound,
    frame: Option<SurfaceFrame>,
    lost: bool,
}

#[derive(Debug, Copy, Clone)]
struct Attribute {
    buffer: BufferId,
    dimension: u32,
}

#[derive(Debug, Default, Copy, Clone)]
struct Bound {
    program: Option<ProgramId>,
    vertex_array: Option<VertexArrayId>,
    texture: Option<TextureId>,
}

/// Vertex layout key: `(shader location, dimension)` sorted by location.
type LayoutKey = Vec<(u32, u32)>;

struct ProgramState {
    vertex_module: String,
    fragment_module: String,
    uniforms: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<LayoutKey, wgpu::RenderPipeline>,
    bind_groups: HashMap<TextureId, wgpu::BindGroup>,
}

impl WgpuBackend {
    pub fn new(gpu: Gpu) -> Self {
        let sampler = gpu.device().create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprite sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            gpu,
            next_id: 1,
            sampler,
            modules: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            bound: Bound::default(),
            frame: None,
            lost: false,
        }
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.gpu.size()
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.gpu.resize(new_size);
    }

    /// True once the surface reported a fatal error.
    pub fn is_lost(&self) -> bool {
        self.lost
    }

    /// Submits and presents the current frame, if one was started.
    pub fn present(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.gpu.present(frame);
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn ensure_module(&mut self, source: &ShaderSource) -> Result<()> {
        if self.modules.contains_key(&source.label) {
            log::debug!("reusing compiled shader {}", source.label);
            return Ok(());
        }
        if source.code.trim().is_empty() {
            bail!("shader {} is empty", source.label);
        }

        let module = self
            .gpu
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&source.label),
                source: wgpu::ShaderSource::Wgsl(source.code.as_str().into()),
            });
        self.modules.insert(source.label.clone(), module);
        Ok(())
    }

    fn layout_key(&self, vertex_array: VertexArrayId) -> LayoutKey {
        self.vertex_arrays
            .get(&vertex_array)
            .map(|attrs| attrs.iter().map(|(loc, a)| (*loc, a.dimension)).collect())
            .unwrap_or_default()
    }

    fn ensure_pipeline(&mut self, program: ProgramId, key: &LayoutKey) {
        let surface_format = self.gpu.surface_format();
        let device = self.gpu.device();
        let Some(state) = self.programs.get_mut(&program) else { return };
        if state.pipelines.contains_key(key) {
            return;
        }
        let (Some(vs), Some(fs)) = (
            self.modules.get(&state.vertex_module),
            self.modules.get(&state.fragment_module),
        ) else {
            return;
        };

        let attributes: Vec<[wgpu::VertexAttribute; 1]> = key
            .iter()
            .map(|&(location, dimension)| {
                [wgpu::VertexAttribute {
                    format: attribute_format(dimension),
                    offset: 0,
                    shader_location: location,
                }]
            })
            .collect();
        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = key
            .iter()
            .zip(&attributes)
            .map(|(&(_, dimension), attrs)| wgpu::VertexBufferLayout {
                array_stride: u64::from(dimension) * 4,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite pipeline"),
            layout: Some(&state.pipeline_layout),
            vertex: wgpu::VertexState {
                module: vs,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: fs,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("built pipeline for program {} with layout {key:?}", program.0);
        state.pipelines.insert(key.clone(), pipeline);
    }

    fn ensure_bind_group(&mut self, program: ProgramId, texture: TextureId) {
        let device = self.gpu.device();
        let Some(state) = self.programs.get_mut(&program) else { return };
        if state.bind_groups.contains_key(&texture) {
            return;
        }
        let Some(view) = self.textures.get(&texture) else { return };

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("sprite bind group"),
            layout: &state.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: state.uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        state.bind_groups.insert(texture, bind_group);
    }
}

impl Backend for WgpuBackend {
    fn create_vertex_array(&mut self) -> VertexArrayId {
        let id = VertexArrayId(self.next_id());
        self.vertex_arrays.insert(id, BTreeMap::new());
        id
    }

    fn bind_vertex_array(&mut self, id: VertexArrayId) {
        self.bound.vertex_array = Some(id);
    }

    fn delete_vertex_array(&mut self, id: VertexArrayId) {
        self.vertex_arrays.remove(&id);
        if self.bound.vertex_array == Some(id) {
            self.bound.vertex_array = None;
        }
    }

    fn create_buffer(&mut self, contents: &[f32]) -> BufferId {
        let id = BufferId(self.next_id());
        let buffer = self
            .gpu
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sprite vertex buffer"),
                contents: bytemuck::cast_slice(contents),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        self.buffers.insert(id, buffer);
        id
    }

    fn write_buffer(&mut self, id: BufferId, offset: usize, contents: &[f32]) {
        if contents.is_empty() {
            return;
        }
        let Some(buffer) = self.buffers.get(&id) else {
            panic!("write to unknown buffer {}", id.0);
        };
        let byte_offset = (offset * std::mem::size_of::<f32>()) as u64;
        self.gpu
            .queue()
            .write_buffer(buffer, byte_offset, bytemuck::cast_slice(contents));
    }

    fn delete_buffer(&mut self, id: BufferId) {
        if let Some(buffer) = self.buffers.remove(&id) {
            buffer.destroy();
        }
        for attrs in self.vertex_arrays.values_mut() {
            attrs.retain(|_, a| a.buffer != id);
        }
    }

    fn vertex_attribute(&mut self, location: u32, buffer: BufferId, dimension: u32) {
        let Some(vertex_array) = self.bound.vertex_array else {
            panic!("vertex attribute {location} set with no vertex array bound");
        };
        if let Some(attrs) = self.vertex_arrays.get_mut(&vertex_array) {
            attrs.insert(location, Attribute { buffer, dimension });
        }
    }

    fn compile_program(
        &mut self,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<ProgramId> {
        self.ensure_module(vertex)?;
        self.ensure_module(fragment)?;

        let device = self.gpu.device();
        let uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sprite uniforms"),
            size: u64::from(MAX_UNIFORM_SLOTS) * UNIFORM_SLOT_BYTES,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("sprite bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let id = ProgramId(self.next_id());
        self.programs.insert(
            id,
            ProgramState {
                vertex_module: vertex.label.clone(),
                fragment_module: fragment.label.clone(),
                uniforms,
                bind_group_layout,
                pipeline_layout,
                pipelines: HashMap::new(),
                bind_groups: HashMap::new(),
            },
        );
        Ok(id)
    }

    fn use_program(&mut self, id: ProgramId) {
        self.bound.program = Some(id);
    }

    fn write_uniform(&mut self, program: ProgramId, slot: u32, value: [f32; 4]) {
        assert!(slot < MAX_UNIFORM_SLOTS, "uniform slot {slot} out of range");
        let Some(state) = self.programs.get(&program) else {
            panic!("uniform write to unknown program {}", program.0);
        };
        self.gpu.queue().write_buffer(
            &state.uniforms,
            u64::from(slot) * UNIFORM_SLOT_BYTES,
            bytemuck::bytes_of(&value),
        );
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> TextureId {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("sprite texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.gpu.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let id = TextureId(self.next_id());
        self.textures
            .insert(id, texture.create_view(&wgpu::TextureViewDescriptor::default()));
        id
    }

    fn bind_texture(&mut self, id: TextureId) {
        self.bound.texture = Some(id);
    }

    fn clear(&mut self, color: ColorRgba) {
        if self.frame.is_none() {
            match self.gpu.acquire() {
                Acquired::Frame(frame) => self.frame = Some(frame),
                Acquired::Skip => return,
                Acquired::Lost => {
                    self.lost = true;
                    return;
                }
            }
        }

        let Some(frame) = self.frame.as_mut() else { return };
        let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sprite clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        if vertex_count == 0 || self.frame.is_none() {
            return;
        }
        let Bound {
            program: Some(program),
            vertex_array: Some(vertex_array),
            texture: Some(texture),
        } = self.bound
        else {
            panic!("draw issued without program, vertex array and texture bound");
        };

        let key = self.layout_key(vertex_array);
        self.ensure_pipeline(program, &key);
        self.ensure_bind_group(program, texture);

        let Self {
            frame,
            programs,
            buffers,
            vertex_arrays,
            ..
        } = self;
        let Some(frame) = frame.as_mut() else { return };
        let Some(state) = programs.get(&program) else { return };
        let (Some(pipeline), Some(bind_group)) =
            (state.pipelines.get(&key), state.bind_groups.get(&texture))
        else {
            return;
        };
        let Some(attrs) = vertex_arrays.get(&vertex_array) else { return };

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sprite pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        for (slot, attr) in attrs.values().enumerate() {
            let Some(buffer) = buffers.get(&attr.buffer) else {
                panic!("vertex array {} references deleted buffer", vertex_array.0);
            };
            rpass.set_vertex_buffer(slot as u32, buffer.slice(..));
        }
        rpass.draw(0..vertex_count, 0..1);
    }
}

fn attribute_format(dimension: u32) -> wgpu::VertexFormat {
    match dimension {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        4 => wgpu::VertexFormat::Float32x4,
        other => panic!("unsupported vertex attribute dimension {other}"),
    }
}
