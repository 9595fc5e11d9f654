// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! # WGPU Shader Management Module
//!
//! WGSL compilation and pipeline creation. Both run inside a validation
//! error scope so a broken shader surfaces as a `TextError` at startup
//! instead of a device-lost callback later.

use crate::error::{TextError, TextResult};
use log::error;

pub struct WgpuShader;

impl WgpuShader {
    /// Compile WGSL shader from source
    pub fn compile(
        device: &wgpu::Device,
        source: &str,
        label: Option<&str>,
    ) -> TextResult<wgpu::ShaderModule> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label,
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        match pollster::block_on(device.pop_error_scope()) {
            Some(e) => {
                error!("Shader {:?} failed to compile: {}", label, e);
                Err(TextError::ShaderCompile(e.to_string()))
            }
            None => Ok(module),
        }
    }

    /// Create the alpha blended triangle list pipeline
    pub fn create_pipeline(
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        vertex_layout: &wgpu::VertexBufferLayout,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        surface_format: wgpu::TextureFormat,
    ) -> TextResult<wgpu::RenderPipeline> {
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Text Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Text Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout.clone()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState {
                        color: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::SrcAlpha,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                        alpha: wgpu::BlendComponent {
                            src_factor: wgpu::BlendFactor::One,
                            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                            operation: wgpu::BlendOperation::Add,
                        },
                    }),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        match pollster::block_on(device.pop_error_scope()) {
            Some(e) => {
                error!("Text pipeline creation failed: {}", e);
                Err(TextError::ShaderLink(e.to_string()))
            }
            None => Ok(pipeline),
        }
    }
}
