// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! # Vertex Batch Module
//!
//! Expands strings into textured quads. Every glyph becomes two triangles
//! (6 vertices, no index buffer) appended to one growable vertex list that
//! is rebuilt each frame and consumed by the chunked renderer.
//!
//! ```text
//!   TL ─────── TR        emit order: TR TL BL, TR BL BR
//!   │ ╲        │
//!   │   ╲      │         pen.y - (yoff + h) * k  -> BL.y
//!   │     ╲    │         pen.x + xoff * k        -> BL.x
//!   BL ─────── BR
//! ```

use crate::render::atlas::{GlyphMetrics, GlyphTable, GlyphTextureRect};
use log::debug;
use serde::Deserialize;

pub const VERTICES_PER_QUAD: usize = 6;

/// Corner order of the two triangles over [TR, TL, BL, BR]
const QUAD_INDICES: [usize; VERTICES_PER_QUAD] = [0, 1, 2, 0, 2, 3];

/// Text vertex
///
/// `#[repr(C)]` and `Pod` so a slice of vertices uploads to the vertex
/// buffer as raw bytes. Stride is 36 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub tex_coords: [f32; 2],
}

#[cfg(feature = "wgpu")]
impl Vertex {
    /// Vertex buffer layout: position @0, color @1, tex_coords @2
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(Vertex, position) as wgpu::BufferAddress,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(Vertex, color) as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::offset_of!(Vertex, tex_coords) as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// What to draw for a character outside the baked range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlyphFallback {
    /// Drop the character, pen does not move
    #[default]
    Skip,
    /// Draw this glyph instead, if it is baked
    Placeholder(char),
}

/// Outcome of one `append_text` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRun {
    /// Pen position after the last emitted glyph
    pub pen: [f32; 3],
    /// Quads emitted
    pub glyphs: usize,
    /// Characters that had no glyph in the atlas
    pub unsupported: usize,
}

/// Append-only vertex list for one frame
///
/// `begin` resets the length but keeps the allocation, so after the first
/// few frames building the batch does not allocate.
#[derive(Debug, Default, Clone)]
pub struct VertexBatch {
    vertices: Vec<Vertex>,
}

impl VertexBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity_quads(quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(quads * VERTICES_PER_QUAD),
        }
    }

    /// Start a new frame
    pub fn begin(&mut self) {
        self.vertices.clear();
    }

    /// Make room for `quads` more glyphs in one allocation
    pub fn reserve_quads(&mut self, quads: usize) {
        self.vertices.reserve_exact(quads * VERTICES_PER_QUAD);
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    pub fn capacity(&self) -> usize {
        self.vertices.capacity()
    }

    /// Lay out `text` left to right starting at `pen`
    ///
    /// `pixel_scale` converts atlas pixels to world units (`2 / window
    /// height` for a viewport spanning [-1, 1] vertically), `scale` is the
    /// per-string size multiplier.
    #[allow(clippy::too_many_arguments)]
    pub fn append_text(
        &mut self,
        glyphs: &GlyphTable,
        text: &str,
        pen: [f32; 3],
        color: [f32; 4],
        scale: f32,
        pixel_scale: f32,
        fallback: GlyphFallback,
    ) -> TextRun {
        let k = pixel_scale * scale;
        let mut run = TextRun {
            pen,
            glyphs: 0,
            unsupported: 0,
        };

        for ch in text.chars() {
            let glyph = match glyphs.lookup(ch) {
                Ok(g) => g,
                Err(_) => {
                    run.unsupported += 1;
                    match fallback {
                        GlyphFallback::Skip => continue,
                        GlyphFallback::Placeholder(p) => match glyphs.lookup(p) {
                            Ok(g) => g,
                            Err(_) => continue,
                        },
                    }
                }
            };
            self.push_glyph(glyph.0, glyph.1, &mut run.pen, color, k);
            run.glyphs += 1;
        }

        if run.unsupported > 0 {
            debug!(
                "{} unsupported char(s) in {:?}, fallback {:?}",
                run.unsupported, text, fallback
            );
        }
        run
    }

    fn push_glyph(
        &mut self,
        m: &GlyphMetrics,
        r: &GlyphTextureRect,
        pen: &mut [f32; 3],
        color: [f32; 4],
        k: f32,
    ) {
        let h_px = m.height() as f32;
        let w = m.width() as f32 * k;
        let h = h_px * k;
        let x = pen[0] + m.xoff * k;
        let y = pen[1] - (m.yoff + h_px) * k;
        let z = pen[2];

        let quad = [
            Vertex {
                position: [x + w, y + h, z],
                color,
                tex_coords: [r.s1, r.t0],
            },
            Vertex {
                position: [x, y + h, z],
                color,
                tex_coords: [r.s0, r.t0],
            },
            Vertex {
                position: [x, y, z],
                color,
                tex_coords: [r.s0, r.t1],
            },
            Vertex {
                position: [x + w, y, z],
                color,
                tex_coords: [r.s1, r.t1],
            },
        ];
        self.vertices.extend(QUAD_INDICES.iter().map(|&i| quad[i]));

        pen[0] += m.xadvance * k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::atlas::tests::{box_spec, BoxRasterizer, DEJAVU_SANS};
    use crate::render::atlas::{AtlasSpec, FontAtlas};

    const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    fn box_table() -> GlyphTable {
        FontAtlas::bake_with(&BoxRasterizer { w: 6, h: 8 }, &box_spec(32, 95, 256))
            .unwrap()
            .glyphs
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_vertex_layout() {
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
        assert_eq!(std::mem::offset_of!(Vertex, color), 12);
        assert_eq!(std::mem::offset_of!(Vertex, tex_coords), 28);
    }

    #[test]
    fn test_six_vertices_per_glyph() {
        let table = box_table();
        let mut batch = VertexBatch::new();
        let run = batch.append_text(&table, "Hello", [0.0; 3], WHITE, 1.0, 0.01, GlyphFallback::Skip);
        assert_eq!(run.glyphs, 5);
        assert_eq!(batch.len(), 30);
        assert_eq!(batch.quad_count(), 5);
    }

    #[test]
    fn test_batch_grows_monotonically() {
        let table = box_table();
        let mut batch = VertexBatch::new();
        let mut last = 0;
        for s in ["a", "bc", "", "def"] {
            batch.append_text(&table, s, [0.0; 3], WHITE, 1.0, 0.01, GlyphFallback::Skip);
            assert_eq!(batch.len(), last + 6 * s.len());
            last = batch.len();
        }
    }

    #[test]
    fn test_begin_keeps_capacity() {
        let table = box_table();
        let mut batch = VertexBatch::with_capacity_quads(4);
        batch.append_text(&table, "abcdefgh", [0.0; 3], WHITE, 1.0, 0.01, GlyphFallback::Skip);
        let cap = batch.capacity();
        assert!(cap >= 48);
        batch.begin();
        assert!(batch.is_empty());
        assert_eq!(batch.capacity(), cap);
        batch.reserve_quads(100);
        assert!(batch.capacity() >= 600);
    }

    #[test]
    fn test_quad_geometry() {
        let table = box_table();
        let (m, r) = table.lookup('A').unwrap();
        let mut batch = VertexBatch::new();
        let run = batch.append_text(&table, "A", [0.0, 0.0, 0.25], WHITE, 1.0, 0.5, GlyphFallback::Skip);

        // xoff 1, yoff -6, 6x8 box, k = 0.5
        let v = batch.vertices();
        let tr = v[0].position;
        let tl = v[1].position;
        let bl = v[2].position;
        let br = v[5].position;
        assert_eq!(bl, [0.5, -1.0, 0.25]);
        assert_eq!(tl, [0.5, 3.0, 0.25]);
        assert_eq!(tr, [3.5, 3.0, 0.25]);
        assert_eq!(br, [3.5, -1.0, 0.25]);
        assert_eq!(v[3], v[0]);
        assert_eq!(v[4], v[2]);

        assert_eq!(v[0].tex_coords, [r.s1, r.t0]);
        assert_eq!(v[1].tex_coords, [r.s0, r.t0]);
        assert_eq!(v[2].tex_coords, [r.s0, r.t1]);
        assert_eq!(v[5].tex_coords, [r.s1, r.t1]);
        assert!(v.iter().all(|x| x.color == WHITE));

        assert!(approx(run.pen[0], m.xadvance * 0.5));
        assert_eq!(run.pen[1], 0.0);
    }

    #[test]
    fn test_pen_advance_is_additive() {
        let table = box_table();
        let mut batch = VertexBatch::new();
        let whole = batch.append_text(&table, "abc", [-0.3, 0.2, 0.0], WHITE, 0.7, 0.01, GlyphFallback::Skip);
        let mut pen = [-0.3, 0.2, 0.0];
        for s in ["a", "b", "c"] {
            pen = batch.append_text(&table, s, pen, WHITE, 0.7, 0.01, GlyphFallback::Skip).pen;
        }
        assert!(approx(whole.pen[0], pen[0]));
        assert_eq!(&batch.vertices()[..18], &batch.vertices()[18..]);
    }

    #[test]
    fn test_unsupported_chars_are_skipped() {
        let table = box_table();
        let mut batch = VertexBatch::new();
        let run = batch.append_text(&table, "a\nb\u{e9}", [0.0; 3], WHITE, 1.0, 0.1, GlyphFallback::Skip);
        assert_eq!(run.glyphs, 2);
        assert_eq!(run.unsupported, 2);
        assert_eq!(batch.len(), 12);
        // skipped chars do not move the pen
        assert!(approx(run.pen[0], 2.0 * 8.0 * 0.1));
    }

    #[test]
    fn test_placeholder_fallback() {
        let table = box_table();
        let mut batch = VertexBatch::new();
        let run = batch.append_text(&table, "a\u{263a}", [0.0; 3], WHITE, 1.0, 0.1, GlyphFallback::Placeholder('?'));
        assert_eq!(run.glyphs, 2);
        assert_eq!(run.unsupported, 1);
        let (_, q) = table.lookup('?').unwrap();
        assert_eq!(batch.vertices()[6].tex_coords, [q.s1, q.t0]);

        // a placeholder that is itself missing degrades to skip
        batch.begin();
        let run = batch.append_text(&table, "\u{263a}", [0.0; 3], WHITE, 1.0, 0.1, GlyphFallback::Placeholder('\u{2603}'));
        assert_eq!(run.glyphs, 0);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_hi_with_real_font() {
        let atlas = FontAtlas::bake(DEJAVU_SANS, &AtlasSpec::default()).unwrap();
        let pixel_scale = 2.0 / 600.0;
        let mut batch = VertexBatch::new();
        let run = batch.append_text(&atlas.glyphs, "Hi", [-1.0, 0.0, 0.0], WHITE, 0.7, pixel_scale, GlyphFallback::Skip);
        assert_eq!(batch.len(), 12);

        let (h, _) = atlas.glyphs.lookup('H').unwrap();
        let (i, _) = atlas.glyphs.lookup('i').unwrap();
        let k = pixel_scale * 0.7;
        assert!(approx(run.pen[0], -1.0 + (h.xadvance + i.xadvance) * k));

        // 'i' starts where 'H' left the pen
        let i_bl = batch.vertices()[8].position;
        assert!(approx(i_bl[0], -1.0 + h.xadvance * k + i.xoff * k));
        // 'H' sits on the baseline
        let h_bl = batch.vertices()[2].position;
        assert!(h_bl[1].abs() < 2.0 * k);
    }

    #[test]
    fn test_hi_at_origin_unit_scale() {
        let atlas = FontAtlas::bake(DEJAVU_SANS, &AtlasSpec::default()).unwrap();
        let pixel_scale = 2.0 / 600.0;
        let mut batch = VertexBatch::new();
        let run = batch.append_text(&atlas.glyphs, "Hi", [0.0; 3], WHITE, 1.0, pixel_scale, GlyphFallback::Skip);
        assert_eq!(run.glyphs, 2);
        assert_eq!(batch.len(), 12);

        let (h, _) = atlas.glyphs.lookup('H').unwrap();
        let (i, _) = atlas.glyphs.lookup('i').unwrap();
        // second glyph's pen starts at xadvance(H) * pixel_scale
        let i_bl = batch.vertices()[8].position;
        assert!(approx(i_bl[0] - i.xoff * pixel_scale, h.xadvance * pixel_scale));
        assert!(approx(run.pen[0], (h.xadvance + i.xadvance) * pixel_scale));
        assert!(batch.vertices().iter().all(|v| v.position[2] == 0.0));
    }
}
