// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! # Render Module
//!
//! ## Submodules
//! - `atlas`: font atlas baking, glyph metrics and texture rectangles
//! - `batch`: per-frame vertex list built from strings
//! - `chunk`: splits the batch into vertex buffer sized draws
//! - `transform`: orthographic view projection
//! - `adapter`: winit window and wgpu pipeline (feature `wgpu`)

#[cfg(feature = "wgpu")]
pub mod adapter;
pub mod atlas;
pub mod batch;
pub mod chunk;
pub mod transform;

pub use atlas::{AtlasBitmap, AtlasSpec, FontAtlas, GlyphMetrics, GlyphTable, GlyphTextureRect};
pub use batch::{GlyphFallback, TextRun, Vertex, VertexBatch};
pub use chunk::{ChunkPlan, ChunkSink, ChunkedRenderer};
pub use transform::ViewProjection;
