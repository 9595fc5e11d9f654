// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! wgpu side of the text renderer: WGSL pipeline, font texture and the
//! chunk sink that uploads and draws vertex slices.

pub mod render_text;
pub mod shader;
pub mod shader_source;
pub mod texture;

pub use render_text::{WgpuChunkSink, WgpuTextRenderer};
