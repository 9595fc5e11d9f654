// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! # WGPU Texture Management Module
//!
//! GPU copy of the baked font atlas.

use crate::render::atlas::AtlasBitmap;
use log::info;

/// Single channel font texture with its sampler
pub struct WgpuFontTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl WgpuFontTexture {
    /// Upload the atlas as `R8Unorm`, one byte per pixel
    pub fn from_atlas(device: &wgpu::Device, queue: &wgpu::Queue, bitmap: &AtlasBitmap) -> Self {
        let size = wgpu::Extent3d {
            width: bitmap.width,
            height: bitmap.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Font Atlas Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            texture.as_image_copy(),
            &bitmap.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bitmap.width),
                rows_per_image: Some(bitmap.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Font Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        info!("Font texture uploaded: {}x{} R8Unorm", bitmap.width, bitmap.height);

        Self {
            texture,
            view,
            sampler,
            width: bitmap.width,
            height: bitmap.height,
        }
    }
}
