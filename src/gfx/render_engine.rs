//! WGPU-based render engine.
//!
//! Owns the surface, device, queue and depth buffer, and the two fixed
//! shader programs the library needs: a per-vertex-color program (uniform
//! and gradient triangles, and all lines) and a textured program (sampled
//! 2D texture at interpolated UVs). Shapes are "compiled" against these
//! programs: compilation picks the pipeline matching the shape's coloring
//! mode, uploads its cached vertex streams, and allocates its MVP uniform.
//!
//! Shader compile failures are reported as a boolean plus diagnostic log
//! output; affected shapes stay uncompiled and are skipped at draw time,
//! never fatal to the surface.

use std::collections::HashMap;
use std::iter;
use std::ops::Range;
use std::sync::Mutex;

use cgmath::Matrix4;
use wgpu::util::DeviceExt;
use wgpu::{DepthStencilState, TextureFormat};

use crate::gfx::primitive::TextureHandle;
use crate::gfx::shape::{Shape, ShapeColoring};

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x4];
const UV_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x2];

fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (3 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRS,
    }
}

fn color_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (4 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &COLOR_ATTRS,
    }
}

fn uv_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (2 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &UV_ATTRS,
    }
}

/// The fixed programs, with their shared bind group layouts. A pipeline is
/// `None` when its shader failed to compile; shapes needing it stay
/// uncompiled.
struct Pipelines {
    mvp_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    color_triangles: Option<wgpu::RenderPipeline>,
    color_lines: Option<wgpu::RenderPipeline>,
    textured_triangles: Option<wgpu::RenderPipeline>,
}

/// A compiled shape: its pipeline choice, uploaded vertex streams, and MVP
/// uniform. All wgpu resources are internally reference-counted, so the
/// clone a draw takes out of the shape lock is cheap.
#[derive(Clone)]
pub(crate) struct ShapeGpu {
    mvp_buffer: wgpu::Buffer,
    mvp_bind_group: wgpu::BindGroup,
    triangles: Option<TriangleDraw>,
    lines: Option<LineDraw>,
}

#[derive(Clone)]
struct TriangleDraw {
    pipeline: wgpu::RenderPipeline,
    positions: wgpu::Buffer,
    /// Colors or UVs, matching the pipeline.
    attributes: wgpu::Buffer,
    batches: Vec<TriangleBatch>,
}

#[derive(Clone)]
struct TriangleBatch {
    texture: Option<wgpu::BindGroup>,
    range: Range<u32>,
}

/// Line lists render at hairline width on backends without wide-line
/// support; the shape's line width is advisory there.
#[derive(Clone)]
struct LineDraw {
    pipeline: wgpu::RenderPipeline,
    positions: wgpu::Buffer,
    colors: wgpu::Buffer,
    count: u32,
}

impl ShapeGpu {
    /// Writes the MVP uniform and records this shape's draw calls:
    /// triangles in one call per texture run (a single call for
    /// vertex-colored shapes), then lines.
    pub(crate) fn draw(
        &self,
        queue: &wgpu::Queue,
        pass: &mut wgpu::RenderPass<'_>,
        mvp: Matrix4<f32>,
    ) {
        let mvp_data: [[f32; 4]; 4] = mvp.into();
        queue.write_buffer(&self.mvp_buffer, 0, bytemuck::cast_slice(&mvp_data));

        if let Some(triangles) = &self.triangles {
            pass.set_pipeline(&triangles.pipeline);
            pass.set_bind_group(0, &self.mvp_bind_group, &[]);
            pass.set_vertex_buffer(0, triangles.positions.slice(..));
            pass.set_vertex_buffer(1, triangles.attributes.slice(..));
            for batch in &triangles.batches {
                if let Some(texture) = &batch.texture {
                    pass.set_bind_group(1, texture, &[]);
                }
                pass.draw(batch.range.clone(), 0..1);
            }
        }

        if let Some(lines) = &self.lines {
            pass.set_pipeline(&lines.pipeline);
            pass.set_bind_group(0, &self.mvp_bind_group, &[]);
            pass.set_vertex_buffer(0, lines.positions.slice(..));
            pass.set_vertex_buffer(1, lines.colors.slice(..));
            pass.draw(0..lines.count, 0..1);
        }
    }
}

/// Core rendering boundary: surface/device/queue ownership, pipeline
/// management, shape compilation and per-frame drawing.
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    format: TextureFormat,
    pipelines: Pipelines,
    textures: Mutex<HashMap<TextureHandle, wgpu::BindGroup>>,
}

impl RenderEngine {
    /// Creates the engine for a window surface.
    ///
    /// # Panics
    /// Panics if no wgpu adapter or device is available; there is nothing
    /// to render with in that case.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> RenderEngine {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .expect("Failed to create wgpu surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to request adapter!");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .expect("Failed to request a device!");

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: surface_capabilities.present_modes[0],
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);
        let pipelines = Pipelines::new(&device, format);

        RenderEngine {
            surface,
            device,
            queue,
            config,
            depth_view,
            format,
            pipelines,
            textures: Mutex::new(HashMap::new()),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> TextureFormat {
        self.format
    }

    /// Reconfigures the surface and depth buffer for a new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, &self.config);
    }

    /// Registers a host-decoded RGBA8 bitmap under `handle` so textured
    /// triangles can reference it. Returns false (with a logged
    /// diagnostic) on a size mismatch.
    pub fn register_texture(
        &self,
        handle: TextureHandle,
        rgba: &[u8],
        width: u32,
        height: u32,
    ) -> bool {
        if rgba.len() as u64 != u64::from(width) * u64::from(height) * 4 {
            log::error!(
                "texture {handle:?}: got {} bytes, expected {}x{}x4",
                rgba.len(),
                width,
                height
            );
            return false;
        }

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shape Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
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

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = self.device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shape Texture Bind Group"),
            layout: &self.pipelines.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        self.textures
            .lock()
            .expect("texture registry lock poisoned")
            .insert(handle, bind_group);
        true
    }

    /// Compiles a shape against the fixed programs: picks the pipeline for
    /// its coloring mode, uploads its cached vertex streams, and allocates
    /// its MVP uniform. A no-op for an up-to-date shape; re-uploads when
    /// the primitive set changed since the last compile.
    ///
    /// Returns the shape's compiled status. Failure (missing pipeline or
    /// unregistered texture) is logged and leaves the shape uncompiled.
    pub fn compile_shape(&self, shape: &Shape) -> bool {
        let mut state = shape.state();
        let state = &mut *state;
        if state.gpu.is_some() && !state.gpu_dirty {
            return true;
        }
        let buffers = &state.buffers;

        let triangles = if buffers.triangle_vertex_count() > 0 {
            let vertex_count = buffers.triangle_vertex_count();
            let (pipeline, attribute_data, batches) = match buffers.coloring() {
                ShapeColoring::VertexColor => {
                    let Some(pipeline) = self.pipelines.color_triangles.clone() else {
                        log::warn!("shape '{}': color program unavailable", shape.id());
                        return false;
                    };
                    let batches = vec![TriangleBatch {
                        texture: None,
                        range: 0..vertex_count,
                    }];
                    (pipeline, buffers.triangle_colors.as_slice(), batches)
                }
                ShapeColoring::Textured => {
                    let Some(pipeline) = self.pipelines.textured_triangles.clone() else {
                        log::warn!("shape '{}': textured program unavailable", shape.id());
                        return false;
                    };
                    let textures = self.textures.lock().expect("texture registry lock poisoned");
                    let mut batches = Vec::with_capacity(buffers.texture_runs.len());
                    let mut cursor = 0;
                    for (handle, count) in &buffers.texture_runs {
                        let Some(bind_group) = textures.get(handle) else {
                            log::error!(
                                "shape '{}' references unregistered texture {handle:?}",
                                shape.id()
                            );
                            return false;
                        };
                        batches.push(TriangleBatch {
                            texture: Some(bind_group.clone()),
                            range: cursor..cursor + count,
                        });
                        cursor += count;
                    }
                    (pipeline, buffers.triangle_uvs.as_slice(), batches)
                }
            };
            Some(TriangleDraw {
                pipeline,
                positions: self.vertex_buffer("Triangle Positions", &buffers.triangle_positions),
                attributes: self.vertex_buffer("Triangle Attributes", attribute_data),
                batches,
            })
        } else {
            None
        };

        let lines = if buffers.line_vertex_count() > 0 {
            let Some(pipeline) = self.pipelines.color_lines.clone() else {
                log::warn!("shape '{}': line program unavailable", shape.id());
                return false;
            };
            Some(LineDraw {
                pipeline,
                positions: self.vertex_buffer("Line Positions", &buffers.line_positions),
                colors: self.vertex_buffer("Line Colors", &buffers.line_colors),
                count: buffers.line_vertex_count(),
            })
        } else {
            None
        };

        let mvp_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("MVP Uniform Buffer"),
            contents: bytemuck::cast_slice(&[[0.0f32; 4]; 4]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let mvp_bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("MVP Bind Group"),
            layout: &self.pipelines.mvp_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: mvp_buffer.as_entire_binding(),
            }],
        });

        log::debug!("compiled shape '{}'", shape.id());
        state.gpu = Some(ShapeGpu {
            mvp_buffer,
            mvp_bind_group,
            triangles,
            lines,
        });
        state.gpu_dirty = false;
        true
    }

    fn vertex_buffer(&self, label: &str, data: &[f32]) -> wgpu::Buffer {
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::VERTEX,
        })
    }

    /// Acquires the next frame, runs `record` inside a cleared render
    /// pass, then submits and presents. Recoverable surface losses
    /// reconfigure and skip the frame.
    pub fn render_frame<F>(&self, record: F) -> anyhow::Result<()>
    where
        F: FnOnce(&wgpu::Queue, &mut wgpu::RenderPass<'_>),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::debug!("surface frame timed out; skipping");
                return Ok(());
            }
            Err(err) => return Err(anyhow::anyhow!("failed to acquire frame: {err}")),
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.1,
                            g: 0.2,
                            b: 0.3,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            record(&self.queue, &mut pass);
        }

        self.queue.submit(iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

impl Pipelines {
    fn new(device: &wgpu::Device, format: TextureFormat) -> Self {
        let mvp_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("MVP Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let color_shader = compile_program(device, "color", include_str!("color.wgsl"));
        let textured_shader = compile_program(device, "textured", include_str!("textured.wgsl"));

        let color_triangles = color_shader.as_ref().map(|shader| {
            build_pipeline(
                device,
                "Color Triangle Pipeline",
                shader,
                &[&mvp_layout],
                wgpu::PrimitiveTopology::TriangleList,
                &[position_layout(), color_layout()],
                format,
            )
        });
        let color_lines = color_shader.as_ref().map(|shader| {
            build_pipeline(
                device,
                "Color Line Pipeline",
                shader,
                &[&mvp_layout],
                wgpu::PrimitiveTopology::LineList,
                &[position_layout(), color_layout()],
                format,
            )
        });
        let textured_triangles = textured_shader.as_ref().map(|shader| {
            build_pipeline(
                device,
                "Textured Triangle Pipeline",
                shader,
                &[&mvp_layout, &texture_layout],
                wgpu::PrimitiveTopology::TriangleList,
                &[position_layout(), uv_layout()],
                format,
            )
        });

        Self {
            mvp_layout,
            texture_layout,
            color_triangles,
            color_lines,
            textured_triangles,
        }
    }
}

/// Compiles a WGSL module, reporting success as `Some` and failure as
/// `None` plus a logged diagnostic.
fn compile_program(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> Option<wgpu::ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });
    if let Some(error) = pollster::block_on(device.pop_error_scope()) {
        log::error!("shader '{label}' failed to compile: {error}");
        return None;
    }
    Some(module)
}

fn build_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    topology: wgpu::PrimitiveTopology,
    vertex_buffers: &[wgpu::VertexBufferLayout<'_>],
    format: TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: vertex_buffers,
            compilation_options: Default::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
            unclipped_depth: false,
        },
        depth_stencil: Some(DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        multiview: None,
        cache: None,
    })
}

fn create_depth_view(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
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
        view_formats: &[DEPTH_FORMAT],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
