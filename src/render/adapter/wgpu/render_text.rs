// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! # WGPU Text Renderer Module
//!
//! Owns the text pipeline, the fixed-size vertex buffer, the uniform
//! buffer and the font texture. Frames are drawn as:
//!
//! ```text
//! clear pass ──► chunk 0: write_buffer + pass(Load) + submit
//!            ──► chunk 1: write_buffer + pass(Load) + submit
//!            ──► ...
//! ```
//!
//! One submit per chunk: `queue.write_buffer` lands at the next submit, so
//! each chunk's upload is ordered after the previous chunk's draw.

use super::shader::WgpuShader;
use super::shader_source;
use super::texture::WgpuFontTexture;
use crate::error::{TextError, TextResult};
use crate::render::atlas::AtlasBitmap;
use crate::render::batch::Vertex;
use crate::render::chunk::ChunkSink;
use crate::render::transform::ViewProjection;
use log::info;

const UNIFORM_SIZE: wgpu::BufferAddress = std::mem::size_of::<[f32; 16]>() as wgpu::BufferAddress;

pub struct WgpuTextRenderer {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    font_texture: WgpuFontTexture,
    /// Vertex buffer size in vertices
    capacity: usize,
}

impl WgpuTextRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        atlas: &AtlasBitmap,
        capacity: usize,
    ) -> TextResult<Self> {
        let font_texture = WgpuFontTexture::from_atlas(device, queue, atlas);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Text Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
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
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
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

        let module = WgpuShader::compile(device, shader_source::TEXT_SHADER, Some("Text Shader"))?;
        let pipeline = WgpuShader::create_pipeline(
            device,
            &module,
            &Vertex::desc(),
            &[&bind_group_layout],
            surface_format,
        )?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Text Uniform Buffer"),
            size: UNIFORM_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let vertex_bytes = (capacity * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress;
        if vertex_bytes > device.limits().max_buffer_size {
            return Err(TextError::Device(format!(
                "vertex buffer of {} bytes exceeds device limit {}",
                vertex_bytes,
                device.limits().max_buffer_size
            )));
        }
        let vertex_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Text Vertex Buffer"),
            size: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Text Bind Group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&font_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&font_texture.sampler),
                },
            ],
        });

        info!(
            "Text renderer ready: {} vertex buffer ({} bytes), atlas {}x{}",
            capacity, vertex_bytes, font_texture.width, font_texture.height
        );

        Ok(Self {
            pipeline,
            vertex_buffer,
            uniform_buffer,
            bind_group,
            font_texture,
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn font_texture(&self) -> &WgpuFontTexture {
        &self.font_texture
    }

    /// Clear the frame's color target
    pub fn clear(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        color: [f32; 4],
    ) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Text Clear Encoder"),
        });
        {
            let _clear_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Text Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: color[0] as f64,
                            g: color[1] as f64,
                            b: color[2] as f64,
                            a: color[3] as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
        }
        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Chunk sink drawing into `target`
    pub fn sink<'a>(
        &'a self,
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        target: &'a wgpu::TextureView,
    ) -> WgpuChunkSink<'a> {
        WgpuChunkSink {
            renderer: self,
            device,
            queue,
            target,
        }
    }
}

/// Draws chunks into one frame's color target
pub struct WgpuChunkSink<'a> {
    renderer: &'a WgpuTextRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    target: &'a wgpu::TextureView,
}

impl ChunkSink for WgpuChunkSink<'_> {
    fn capacity(&self) -> usize {
        self.renderer.capacity
    }

    fn draw_chunk(
        &mut self,
        index: usize,
        vertices: &[Vertex],
        view_projection: &ViewProjection,
    ) -> TextResult<()> {
        if vertices.len() > self.renderer.capacity {
            return Err(TextError::Render(format!(
                "chunk {} has {} vertices, buffer holds {}",
                index,
                vertices.len(),
                self.renderer.capacity
            )));
        }
        if vertices.is_empty() {
            return Ok(());
        }

        let r = self.renderer;
        self.queue
            .write_buffer(&r.uniform_buffer, 0, bytemuck::cast_slice(&view_projection.to_array()));
        self.queue
            .write_buffer(&r.vertex_buffer, 0, bytemuck::cast_slice(vertices));

        let byte_len = std::mem::size_of_val(vertices) as wgpu::BufferAddress;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Text Chunk Encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Text Chunk Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_pipeline(&r.pipeline);
            pass.set_bind_group(0, &r.bind_group, &[]);
            pass.set_vertex_buffer(0, r.vertex_buffer.slice(..byte_len));
            pass.draw(0..vertices.len() as u32, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
