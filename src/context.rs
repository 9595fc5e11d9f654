// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! RenderContext holds the per-run text render state: the baked glyph
//! table, the frame's vertex batch, the current viewport and the chunked
//! renderer. It is owned by the application and passed explicitly, the GPU
//! side only sees it through a `ChunkSink`.

use crate::config::{RendererConfig, TextLine};
use crate::error::TextResult;
use crate::render::atlas::GlyphTable;
use crate::render::batch::{GlyphFallback, TextRun, VertexBatch};
use crate::render::chunk::{ChunkSink, ChunkedRenderer};
use crate::render::transform::ViewProjection;
use log::{debug, info};

/// Window size and the projection derived from it
///
/// Always replaced as a whole so the matrix and the pixel scale can never
/// disagree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub view_projection: ViewProjection,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            view_projection: ViewProjection::for_window(width, height),
        }
    }

    /// World units per atlas pixel: the viewport spans 2 units vertically
    pub fn pixel_scale(&self) -> f32 {
        2.0 / self.height as f32
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

pub struct RenderContext {
    glyphs: GlyphTable,
    batch: VertexBatch,
    viewport: Viewport,
    fallback: GlyphFallback,
    renderer: ChunkedRenderer,
}

impl RenderContext {
    pub fn new(
        glyphs: GlyphTable,
        width: u32,
        height: u32,
        config: &RendererConfig,
    ) -> TextResult<Self> {
        let renderer = ChunkedRenderer::new(config.chunk_capacity)?;
        info!(
            "RenderContext: {} glyphs, {}x{}, chunk capacity {} vertices",
            glyphs.len(),
            width,
            height,
            renderer.capacity()
        );
        Ok(Self {
            glyphs,
            batch: VertexBatch::new(),
            viewport: Viewport::new(width.max(1), height.max(1)),
            fallback: config.fallback,
            renderer,
        })
    }

    pub fn glyphs(&self) -> &GlyphTable {
        &self.glyphs
    }

    pub fn batch(&self) -> &VertexBatch {
        &self.batch
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn chunk_capacity(&self) -> usize {
        self.renderer.capacity()
    }

    /// Start a frame, the batch keeps its allocation
    pub fn draw_begin(&mut self) {
        self.batch.begin();
    }

    /// Queue `text` at `pen` with the current viewport's pixel scale
    pub fn draw_text(&mut self, text: &str, pen: [f32; 3], color: [f32; 4], scale: f32) -> TextRun {
        self.batch.append_text(
            &self.glyphs,
            text,
            pen,
            color,
            scale,
            self.viewport.pixel_scale(),
            self.fallback,
        )
    }

    pub fn draw_line(&mut self, line: &TextLine) -> TextRun {
        self.draw_text(&line.text, line.pen, line.color, line.scale)
    }

    /// Submit the frame's batch, returns the number of chunks drawn
    pub fn render<S: ChunkSink>(&self, sink: &mut S) -> TextResult<usize> {
        self.renderer
            .render(&self.batch, &self.viewport.view_projection, sink)
    }

    /// Swap in a viewport for the new window size
    ///
    /// Zero sizes (minimized window) are ignored, returns whether the
    /// viewport changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            debug!("Ignoring resize to {}x{}", width, height);
            return false;
        }
        if width == self.viewport.width && height == self.viewport.height {
            return false;
        }
        self.viewport = Viewport::new(width, height);
        debug!("Viewport resized to {}x{}", width, height);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::atlas::tests::{box_spec, BoxRasterizer, DEJAVU_SANS};
    use crate::render::atlas::{AtlasSpec, FontAtlas};
    use crate::render::batch::Vertex;

    fn context(width: u32, height: u32) -> RenderContext {
        let glyphs = FontAtlas::bake_with(&BoxRasterizer { w: 6, h: 8 }, &box_spec(32, 95, 256))
            .unwrap()
            .glyphs;
        RenderContext::new(glyphs, width, height, &RendererConfig::default()).unwrap()
    }

    fn quad_width(v: &[Vertex]) -> f32 {
        v[0].position[0] - v[1].position[0]
    }

    #[test]
    fn test_draw_text_uses_viewport_pixel_scale() {
        let mut ctx = context(800, 600);
        let run = ctx.draw_text("A", [0.0; 3], [1.0; 4], 1.0);
        assert!((quad_width(ctx.batch().vertices()) - 6.0 * 2.0 / 600.0).abs() < 1e-6);
        assert!((run.pen[0] - 8.0 * 2.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_resize_scales_text_by_height_ratio() {
        let mut ctx = context(800, 600);
        ctx.draw_text("W", [0.0; 3], [1.0; 4], 1.0);
        let before = quad_width(ctx.batch().vertices());

        assert!(ctx.resize(800, 300));
        ctx.draw_begin();
        ctx.draw_text("W", [0.0; 3], [1.0; 4], 1.0);
        let after = quad_width(ctx.batch().vertices());

        assert!((after / before - 600.0 / 300.0).abs() < 1e-5);
        assert_eq!(ctx.viewport().height, 300);
        assert_eq!(ctx.viewport().view_projection, ViewProjection::for_window(800, 300));
    }

    #[test]
    fn test_zero_resize_is_ignored() {
        let mut ctx = context(800, 600);
        let before = *ctx.viewport();
        assert!(!ctx.resize(0, 0));
        assert!(!ctx.resize(800, 0));
        assert!(!ctx.resize(800, 600));
        assert_eq!(*ctx.viewport(), before);
    }

    #[test]
    fn test_draw_begin_resets_frame() {
        let mut ctx = context(800, 600);
        ctx.draw_line(&TextLine::new("abc", [0.0; 3], [1.0; 4], 0.5));
        assert_eq!(ctx.batch().len(), 18);
        ctx.draw_begin();
        assert!(ctx.batch().is_empty());
        ctx.draw_text("de", [0.0; 3], [1.0; 4], 0.5);
        assert_eq!(ctx.batch().len(), 12);
    }

    #[test]
    fn test_default_lines_with_real_font() {
        let glyphs = FontAtlas::bake(DEJAVU_SANS, &AtlasSpec::default())
            .unwrap()
            .glyphs;
        let config = crate::config::TextConfig::default();
        let mut ctx = RenderContext::new(glyphs, 800, 600, &config.renderer).unwrap();
        ctx.draw_begin();
        let mut expected = 0;
        for line in &config.lines {
            let run = ctx.draw_line(line);
            assert_eq!(run.unsupported, 0);
            expected += line.text.chars().count() * 6;
        }
        assert_eq!(ctx.batch().len(), expected);
    }
}
