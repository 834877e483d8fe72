//! WebGPU render pipeline setup
//!
//! One triangle-list pipeline. Scene vertices are mapped to clip space on the
//! CPU and streamed into a reusable vertex buffer that grows on demand.

use super::vertex::{Vertex, colors};
use crate::consts::{VIEW_HEIGHT, VIEW_WIDTH};

/// Initial vertex capacity; a typical frame needs a few thousand
const INITIAL_VERTEX_CAPACITY: usize = 8192;

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    /// Vertices the current buffer can hold
    vertex_capacity: usize,
    /// Reused across frames for the clip-space copy
    staging: Vec<Vertex>,
    /// Viewport size in pixels
    pub size: (u32, u32),
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<Self, wgpu::RequestDeviceError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lidar-vsoc-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipeline = scene_pipeline(&device, format);
        let vertex_buffer = vertex_buffer(&device, INITIAL_VERTEX_CAPACITY);
        let size = (config.width, config.height);
        log::info!("Renderer ready: {:?} {}x{}", format, size.0, size.1);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            vertex_buffer,
            vertex_capacity: INITIAL_VERTEX_CAPACITY,
            staging: Vec::with_capacity(INITIAL_VERTEX_CAPACITY),
            size,
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Map scene vertices to clip space and copy them to the GPU
    fn upload(&mut self, vertices: &[Vertex]) -> u32 {
        let size = self.size;
        self.staging.clear();
        self.staging.extend(vertices.iter().map(|v| {
            let (x, y) = scene_to_ndc(size, v.position[0], v.position[1]);
            Vertex::new(x, y, v.color)
        }));

        let needed = self.staging.len();
        if needed > self.vertex_capacity {
            self.vertex_capacity = grown_capacity(self.vertex_capacity, needed);
            log::debug!("Growing vertex buffer to {} vertices", self.vertex_capacity);
            self.vertex_buffer = vertex_buffer(&self.device, self.vertex_capacity);
        }
        if needed > 0 {
            self.queue
                .write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.staging));
        }
        needed as u32
    }

    /// Draw one frame
    pub fn render(&mut self, vertices: &[Vertex]) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let count = self.upload(vertices);
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear_color(colors::LETTERBOX)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if count > 0 {
                pass.set_pipeline(&self.pipeline);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.draw(0..count, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

fn scene_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("scene_layout"),
        bind_group_layouts: &[],
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                // Overlays and rays are translucent
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("scene_vertices"),
        size: (capacity * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// Next buffer capacity that fits `needed` vertices (doubling)
fn grown_capacity(current: usize, needed: usize) -> usize {
    let mut capacity = current.max(1);
    while capacity < needed {
        capacity *= 2;
    }
    capacity
}

fn clear_color(c: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: c[0] as f64,
        g: c[1] as f64,
        b: c[2] as f64,
        a: c[3] as f64,
    }
}

/// Map scene pixels (y down) into clip space, letterboxed to keep the
/// scene's aspect ratio on any surface size
pub fn scene_to_ndc(size: (u32, u32), x: f32, y: f32) -> (f32, f32) {
    let (w, h) = (size.0.max(1) as f32, size.1.max(1) as f32);
    let surface_aspect = w / h;
    let scene_aspect = VIEW_WIDTH / VIEW_HEIGHT;

    let nx = x / VIEW_WIDTH * 2.0 - 1.0;
    let ny = 1.0 - y / VIEW_HEIGHT * 2.0;

    if surface_aspect > scene_aspect {
        // Wider than the scene: bars left and right
        (nx * scene_aspect / surface_aspect, ny)
    } else {
        (nx, ny * surface_aspect / scene_aspect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_corners_map_to_clip_corners() {
        let size = (800, 400);
        assert_eq!(scene_to_ndc(size, 0.0, 0.0), (-1.0, 1.0));
        assert_eq!(scene_to_ndc(size, VIEW_WIDTH, VIEW_HEIGHT), (1.0, -1.0));
    }

    #[test]
    fn test_letterbox_on_wide_surface() {
        let (x, y) = scene_to_ndc((1600, 400), VIEW_WIDTH, 0.0);
        assert!((x - 0.5).abs() < 1e-6);
        assert!((y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_letterbox_on_tall_surface() {
        let (x, y) = scene_to_ndc((800, 800), 0.0, 0.0);
        assert!((x + 1.0).abs() < 1e-6);
        assert!((y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_vertex_capacity_doubles_until_it_fits() {
        assert_eq!(grown_capacity(8192, 8193), 16384);
        assert_eq!(grown_capacity(8192, 40000), 65536);
        assert_eq!(grown_capacity(0, 3), 4);
    }

    #[test]
    fn test_vertex_stride_keeps_copy_alignment() {
        assert_eq!(
            std::mem::size_of::<Vertex>() as u64 % wgpu::COPY_BUFFER_ALIGNMENT,
            0
        );
    }
}
