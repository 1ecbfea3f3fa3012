//! Scene rendering system

use crate::camera::{Camera, SceneUniform};
use crate::geometry::{build_sphere_mesh, LineVertex, PhotonInstance, SphereVertex};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SPHERE_RINGS: u32 = 32;
const SPHERE_SEGMENTS: u32 = 64;

/// Everything the renderer needs from one simulation frame
pub struct SceneFrame<'a> {
    pub lines: &'a [LineVertex],
    pub photons: &'a [PhotonInstance],
    /// Accumulated scene rotation about Y, radians
    pub scene_rotation: f32,
    pub photon_size: f32,
    pub sphere_opacity: f32,
}

/// Vertex buffer that is rewritten every frame and grows on demand
struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    label: &'static str,
}

impl DynamicBuffer {
    const INITIAL_CAPACITY: u64 = 64 * 1024;

    fn new(device: &wgpu::Device, label: &'static str) -> Self {
        Self {
            buffer: Self::allocate(device, label, Self::INITIAL_CAPACITY),
            capacity: Self::INITIAL_CAPACITY,
            label,
        }
    }

    fn allocate(device: &wgpu::Device, label: &'static str, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        let needed = bytes.len() as u64;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            log::debug!("Growing {} to {} bytes", self.label, self.capacity);
            self.buffer = Self::allocate(device, self.label, self.capacity);
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
    }
}

pub struct SceneRenderer {
    line_pipeline: wgpu::RenderPipeline,
    photon_pipeline: wgpu::RenderPipeline,
    sphere_pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    line_buffer: DynamicBuffer,
    photon_buffer: DynamicBuffer,
    sphere_vertices: wgpu::Buffer,
    sphere_indices: wgpu::Buffer,
    sphere_index_count: u32,
    pub depth_texture: wgpu::TextureView,
    surface_config: wgpu::SurfaceConfiguration,
}

impl SceneRenderer {
    pub fn new(device: &wgpu::Device, surface_config: &wgpu::SurfaceConfiguration) -> Self {
        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, surface_config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[
                // Scene (Uniform) - Binding 0
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
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Translucent lines: depth-tested but never occlude each other
        let line_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_config.format,
            PipelineSpec {
                label: "Line Render Pipeline",
                vs_entry: "vs_line",
                fs_entry: "fs_line",
                buffers: &[LineVertex::layout()],
                topology: wgpu::PrimitiveTopology::LineList,
                depth_write: false,
            },
        );

        let photon_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_config.format,
            PipelineSpec {
                label: "Photon Render Pipeline",
                vs_entry: "vs_photon",
                fs_entry: "fs_photon",
                buffers: &[PhotonInstance::layout()],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_write: true,
            },
        );

        // Drawn last so everything inside shows through
        let sphere_pipeline = Self::create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_config.format,
            PipelineSpec {
                label: "Sphere Render Pipeline",
                vs_entry: "vs_sphere",
                fs_entry: "fs_sphere",
                buffers: &[SphereVertex::layout()],
                topology: wgpu::PrimitiveTopology::TriangleList,
                depth_write: false,
            },
        );

        let (sphere_mesh_vertices, sphere_mesh_indices) =
            build_sphere_mesh(SPHERE_RINGS, SPHERE_SEGMENTS);
        let sphere_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Vertex Buffer"),
            contents: bytemuck::cast_slice(&sphere_mesh_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sphere_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sphere Index Buffer"),
            contents: bytemuck::cast_slice(&sphere_mesh_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::info!("✓ Scene pipelines created");

        Self {
            line_pipeline,
            photon_pipeline,
            sphere_pipeline,
            scene_buffer,
            bind_group,
            line_buffer: DynamicBuffer::new(device, "Line Vertex Buffer"),
            photon_buffer: DynamicBuffer::new(device, "Photon Instance Buffer"),
            sphere_vertices,
            sphere_indices,
            sphere_index_count: sphere_mesh_indices.len() as u32,
            depth_texture,
            surface_config: surface_config.clone(),
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        spec: PipelineSpec<'_>,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(spec.label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some(spec.vs_entry),
                buffers: spec.buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some(spec.fs_entry),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: spec.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: spec.depth_write,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
    ) -> wgpu::TextureView {
        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, device: &wgpu::Device, new_config: &wgpu::SurfaceConfiguration) {
        self.surface_config = new_config.clone();
        self.depth_texture = Self::create_depth_texture(device, new_config);
    }

    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_view: &wgpu::TextureView,
        camera: &Camera,
        frame: &SceneFrame<'_>,
    ) {
        let viewport = [
            self.surface_config.width as f32,
            self.surface_config.height as f32,
        ];
        queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::cast_slice(&[camera.to_uniform(
                frame.scene_rotation,
                viewport,
                frame.photon_size,
                frame.sphere_opacity,
            )]),
        );

        self.line_buffer
            .write(device, queue, bytemuck::cast_slice(frame.lines));
        self.photon_buffer
            .write(device, queue, bytemuck::cast_slice(frame.photons));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            // Catppuccin Mocha crust #11111b in linear
                            r: 0.00561,
                            g: 0.00561,
                            b: 0.01096,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.bind_group, &[]);

            if !frame.photons.is_empty() {
                render_pass.set_pipeline(&self.photon_pipeline);
                render_pass.set_vertex_buffer(0, self.photon_buffer.buffer.slice(..));
                render_pass.draw(0..6, 0..frame.photons.len() as u32);
            }

            if !frame.lines.is_empty() {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.line_buffer.buffer.slice(..));
                render_pass.draw(0..frame.lines.len() as u32, 0..1);
            }

            if frame.sphere_opacity > 0.0 {
                render_pass.set_pipeline(&self.sphere_pipeline);
                render_pass.set_vertex_buffer(0, self.sphere_vertices.slice(..));
                render_pass.set_index_buffer(self.sphere_indices.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..self.sphere_index_count, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// The parts that differ between the three scene pipelines
struct PipelineSpec<'a> {
    label: &'static str,
    vs_entry: &'static str,
    fs_entry: &'static str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    topology: wgpu::PrimitiveTopology,
    depth_write: bool,
}
