//! Rendering of posed meshes with simple directional lighting

use crate::device::GpuContext;
use crate::overlay::{ScreenLabel, TextOverlay};
use bytemuck::{Pod, Zeroable};
use nalgebra::{Matrix4, Point3, Vector3};
use rotview_core::{BackendError, BackendResult, ObjectId, TriangleMesh};
use std::collections::BTreeMap;
use std::sync::Arc;
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Vertex data for mesh rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl MeshVertex {
    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Color
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Camera uniform data
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 3],
    pub _padding: f32,
}

/// Directional light parameters
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LightingParams {
    pub direction: [f32; 3],
    pub ambient: f32,
    pub color: [f32; 3],
    pub _padding: f32,
}

impl Default for LightingParams {
    fn default() -> Self {
        Self {
            direction: [-0.4, -1.0, -0.6],
            ambient: 0.3,
            color: [1.0, 1.0, 1.0],
            _padding: 0.0,
        }
    }
}

/// Per-object model matrix
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ModelUniform {
    model: [[f32; 4]; 4],
}

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub lighting: LightingParams,
    pub background_color: [f64; 4],
    pub enable_backface_culling: bool,
    pub vsync: bool,
    /// Color used for meshes that carry no vertex colors
    pub default_color: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            lighting: LightingParams::default(),
            background_color: [0.55, 0.65, 0.8, 1.0],
            enable_backface_culling: true,
            vsync: true,
            default_color: [0.95, 0.8, 0.2],
        }
    }
}

/// Convert a triangle mesh into vertex and index data
pub fn mesh_to_vertices(mesh: &TriangleMesh, default_color: [f32; 3]) -> (Vec<MeshVertex>, Vec<u32>) {
    let computed;
    let normals = match &mesh.normals {
        Some(normals) => normals,
        None => {
            computed = mesh.calculate_vertex_normals();
            &computed
        }
    };

    let vertices = mesh
        .vertices
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let normal = normals.get(i).map(|n| [n.x, n.y, n.z]).unwrap_or([0.0, 0.0, 1.0]);
            let color = mesh
                .colors
                .as_ref()
                .and_then(|c| c.get(i))
                .map(|c| [c[0] as f32 / 255.0, c[1] as f32 / 255.0, c[2] as f32 / 255.0])
                .unwrap_or(default_color);
            MeshVertex {
                position: [v.x, v.y, v.z],
                normal,
                color,
            }
        })
        .collect();

    let indices = mesh
        .faces
        .iter()
        .flat_map(|f| [f[0] as u32, f[1] as u32, f[2] as u32])
        .collect();

    (vertices, indices)
}

/// Project a world point to physical pixel coordinates.
///
/// Returns `None` for points behind the camera.
pub fn project_to_screen(view_proj: &Matrix4<f32>, point: &Point3<f32>, size: [u32; 2]) -> Option<[f32; 2]> {
    let clip = view_proj * point.to_homogeneous();
    if clip.w <= f32::EPSILON {
        return None;
    }
    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    Some([
        (ndc_x + 1.0) * 0.5 * size[0] as f32,
        (1.0 - ndc_y) * 0.5 * size[1] as f32,
    ])
}

struct GpuObject {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
}

/// Text anchored at a world position
#[derive(Debug, Clone, PartialEq)]
pub struct WorldLabel {
    pub text: String,
    pub position: Point3<f32>,
    pub color: [f32; 3],
    /// Font height in physical pixels
    pub size: f32,
}

/// Renders every uploaded object at its current model matrix
pub struct SceneRenderer {
    pub gpu_context: GpuContext,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub config: RenderConfig,
    pipeline: wgpu::RenderPipeline,
    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    model_layout: wgpu::BindGroupLayout,
    depth_view: wgpu::TextureView,
    view_proj: Matrix4<f32>,
    objects: BTreeMap<ObjectId, GpuObject>,
    overlay: TextOverlay,
}

impl SceneRenderer {
    /// Create a renderer presenting to `window`
    pub async fn new(window: Arc<Window>, config: RenderConfig) -> BackendResult<Self> {
        let size = window.inner_size();
        let (gpu_context, surface) = GpuContext::with_surface(window).await?;

        let surface_caps = surface.get_capabilities(&gpu_context.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| BackendError::Gpu("Surface reports no supported formats".to_string()))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu_context.device, &surface_config);

        let camera_uniform = CameraUniform {
            view_proj: Matrix4::identity().into(),
            view_pos: [0.0, 0.0, 0.0],
            _padding: 0.0,
        };
        let camera_buffer = gpu_context.create_buffer_init(
            "Camera Buffer",
            &[camera_uniform],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let lighting_buffer = gpu_context.create_buffer_init(
            "Lighting Buffer",
            &[config.lighting],
            wgpu::BufferUsages::UNIFORM,
        );

        let device = &gpu_context.device;
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_globals_layout"),
            entries: &[
                GpuContext::uniform_layout_entry(0),
                GpuContext::uniform_layout_entry(1),
            ],
        });
        let model_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("scene_model_layout"),
            entries: &[GpuContext::uniform_layout_entry(0)],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_globals_bind_group"),
            layout: &globals_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: lighting_buffer.as_entire_binding(),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });
        let pipeline = Self::create_render_pipeline(
            device,
            &[&globals_layout, &model_layout],
            &shader,
            surface_format,
            &config,
        );

        let depth_view = Self::create_depth_view(device, surface_config.width, surface_config.height);
        let overlay = TextOverlay::new(device, surface_format);

        Ok(Self {
            gpu_context,
            surface,
            surface_config,
            config,
            pipeline,
            camera_uniform,
            camera_buffer,
            globals_bind_group,
            model_layout,
            depth_view,
            view_proj: Matrix4::identity(),
            objects: BTreeMap::new(),
            overlay,
        })
    }

    fn create_render_pipeline(
        device: &wgpu::Device,
        layouts: &[&wgpu::BindGroupLayout],
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        config: &RenderConfig,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Render Pipeline Layout"),
            bind_group_layouts: layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Render Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[MeshVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: if config.enable_backface_culling {
                    Some(wgpu::Face::Back)
                } else {
                    None
                },
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Current surface size in physical pixels
    pub fn size(&self) -> [u32; 2] {
        [self.surface_config.width, self.surface_config.height]
    }

    /// Width over height of the surface
    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height as f32
    }

    /// Update camera matrices and position
    pub fn update_camera(&mut self, view_matrix: Matrix4<f32>, proj_matrix: Matrix4<f32>, camera_pos: Vector3<f32>) {
        self.view_proj = proj_matrix * view_matrix;
        self.camera_uniform.view_proj = self.view_proj.into();
        self.camera_uniform.view_pos = camera_pos.into();

        self.gpu_context.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&self.camera_uniform),
        );
    }

    /// Resize renderer
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface.configure(&self.gpu_context.device, &self.surface_config);
            self.depth_view = Self::create_depth_view(&self.gpu_context.device, width, height);
        }
    }

    /// Upload a mesh for `id`, replacing any previous one
    pub fn upload(&mut self, id: ObjectId, mesh: &TriangleMesh, model: Matrix4<f32>) {
        let (vertices, indices) = mesh_to_vertices(mesh, self.config.default_color);
        let ctx = &self.gpu_context;
        let vertex_buffer = ctx.create_buffer_init("Mesh Vertex Buffer", &vertices, wgpu::BufferUsages::VERTEX);
        let index_buffer = ctx.create_buffer_init("Mesh Index Buffer", &indices, wgpu::BufferUsages::INDEX);
        let model_buffer = ctx.create_buffer_init(
            "Model Buffer",
            &[ModelUniform { model: model.into() }],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let model_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("model_bind_group"),
            layout: &self.model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
        });

        self.objects.insert(
            id,
            GpuObject {
                vertex_buffer,
                index_buffer,
                index_count: indices.len() as u32,
                model_buffer,
                model_bind_group,
            },
        );
    }

    /// Move an uploaded object
    pub fn set_model(&mut self, id: ObjectId, model: Matrix4<f32>) -> BackendResult<()> {
        let object = self.objects.get(&id).ok_or(BackendError::UnknownObject(id))?;
        self.gpu_context.queue.write_buffer(
            &object.model_buffer,
            0,
            bytemuck::bytes_of(&ModelUniform { model: model.into() }),
        );
        Ok(())
    }

    /// Render one frame with the given labels on top
    pub fn render(&mut self, labels: &[WorldLabel]) -> BackendResult<()> {
        let output = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                // Reconfigure and skip this frame
                self.surface.configure(&self.gpu_context.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("Surface timed out, skipping frame");
                return Ok(());
            }
            Err(e) => {
                return Err(BackendError::Gpu(format!("Failed to get surface texture: {:?}", e)));
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu_context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Render Encoder"),
            });

        {
            let background = self.config.background_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: background[0],
                            g: background[1],
                            b: background[2],
                            a: background[3],
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
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
            for object in self.objects.values() {
                render_pass.set_bind_group(1, &object.model_bind_group, &[]);
                render_pass.set_vertex_buffer(0, object.vertex_buffer.slice(..));
                render_pass.set_index_buffer(object.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..object.index_count, 0, 0..1);
            }
        }

        let size = self.size();
        let screen_labels: Vec<ScreenLabel> = labels
            .iter()
            .filter_map(|label| {
                project_to_screen(&self.view_proj, &label.position, size).map(|position| ScreenLabel {
                    text: label.text.clone(),
                    position,
                    color: label.color,
                    size: label.size,
                })
            })
            .collect();

        let prepared = self.overlay.draw(
            &self.gpu_context.device,
            &self.gpu_context.queue,
            &mut encoder,
            &view,
            size,
            &screen_labels,
        );

        self.gpu_context
            .queue
            .submit(prepared.into_iter().chain(std::iter::once(encoder.finish())));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rotview_core::Point3f;

    #[test]
    fn vertex_layout_matches_struct_size() {
        assert_eq!(std::mem::size_of::<MeshVertex>(), 36);
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::size_of::<LightingParams>(), 32);
    }

    #[test]
    fn uncolored_mesh_uses_default_color() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );
        let (vertices, indices) = mesh_to_vertices(&mesh, [0.1, 0.2, 0.3]);
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(vertices[2].color, [0.1, 0.2, 0.3]);
        assert_relative_eq!(vertices[0].normal[2], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn projection_maps_ndc_corners_to_pixels() {
        let size = [800, 600];
        let identity = Matrix4::identity();
        let center = project_to_screen(&identity, &Point3::new(0.0, 0.0, 0.5), size).unwrap();
        assert_relative_eq!(center[0], 400.0);
        assert_relative_eq!(center[1], 300.0);
        let top_left = project_to_screen(&identity, &Point3::new(-1.0, 1.0, 0.5), size).unwrap();
        assert_relative_eq!(top_left[0], 0.0);
        assert_relative_eq!(top_left[1], 0.0);
    }

    #[test]
    fn points_behind_the_camera_are_not_projected() {
        let mut flip = Matrix4::identity();
        flip[(3, 3)] = -1.0;
        assert!(project_to_screen(&flip, &Point3::new(0.0, 0.0, 0.0), [100, 100]).is_none());
    }
}
