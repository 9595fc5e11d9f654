// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! # Font Atlas Module
//!
//! Bakes a contiguous code-point range of a TrueType font into a single
//! channel bitmap once at startup.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────┐    ┌─────────────────────┐
//! │  font bytes  │───►│  FontRasterizer  │───►│     ShelfPacker     │
//! │  (ttf/otf)   │    │  (fontdue)       │    │  tallest-first rows │
//! └──────────────┘    └──────────────────┘    └─────────────────────┘
//!                                                       │
//!                         ┌─────────────────────────────┴───┐
//!                         ▼                                 ▼
//!                ┌────────────────┐              ┌────────────────────┐
//!                │  AtlasBitmap   │              │    GlyphTable      │
//!                │  W x H, 1 byte │              │  metrics + uv rect │
//!                └────────────────┘              └────────────────────┘
//! ```
//!
//! The bitmap is uploaded to the GPU once and can then be dropped, the
//! glyph table lives on in the render context for the whole run.

use crate::error::{TextError, TextResult};
use fontdue::{Font, FontSettings};
use log::{debug, error, info};
use std::path::Path;

/// ASCII space
pub const DEFAULT_FIRST_CODE_POINT: u32 = 32;

/// Printable ASCII: 32..=126
pub const DEFAULT_GLYPH_COUNT: u32 = 95;

pub const DEFAULT_PIXEL_HEIGHT: f32 = 64.0;

pub const DEFAULT_ATLAS_SIZE: u32 = 512;

/// Blank pixels kept between packed glyphs so linear sampling at quad edges
/// never picks up a neighbour
pub const DEFAULT_GLYPH_PADDING: u32 = 1;

/// Per-glyph layout data produced by the bake pass
///
/// `x0..x1`, `y0..y1` is the glyph's pixel rectangle inside the atlas.
/// `xoff`/`yoff` place the bitmap's top-left corner relative to the pen
/// (y grows downwards, so glyphs above the baseline have a negative `yoff`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphMetrics {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
    pub xoff: f32,
    pub yoff: f32,
    pub xadvance: f32,
}

impl GlyphMetrics {
    pub fn width(&self) -> u16 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u16 {
        self.y1 - self.y0
    }
}

/// Normalized texture rectangle of a glyph inside the atlas
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphTextureRect {
    pub s0: f32,
    pub t0: f32,
    pub s1: f32,
    pub t1: f32,
}

impl GlyphTextureRect {
    /// Divide a pixel rectangle by the atlas dimensions
    pub fn from_pixels(x0: u32, y0: u32, x1: u32, y1: u32, atlas_w: u32, atlas_h: u32) -> Self {
        let iw = 1.0 / atlas_w as f32;
        let ih = 1.0 / atlas_h as f32;
        Self {
            s0: x0 as f32 * iw,
            t0: y0 as f32 * ih,
            s1: x1 as f32 * iw,
            t1: y1 as f32 * ih,
        }
    }
}

/// Bake parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasSpec {
    /// Distance from descender to ascender in pixels
    pub pixel_height: f32,
    pub first_code_point: u32,
    pub glyph_count: u32,
    pub width: u32,
    pub height: u32,
    pub padding: u32,
}

impl Default for AtlasSpec {
    fn default() -> Self {
        Self {
            pixel_height: DEFAULT_PIXEL_HEIGHT,
            first_code_point: DEFAULT_FIRST_CODE_POINT,
            glyph_count: DEFAULT_GLYPH_COUNT,
            width: DEFAULT_ATLAS_SIZE,
            height: DEFAULT_ATLAS_SIZE,
            padding: DEFAULT_GLYPH_PADDING,
        }
    }
}

impl AtlasSpec {
    pub fn validate(&self) -> TextResult<()> {
        if !(self.pixel_height.is_finite() && self.pixel_height > 0.0) {
            return Err(TextError::Config(format!(
                "pixel height must be positive, got {}",
                self.pixel_height
            )));
        }
        if self.glyph_count == 0 {
            return Err(TextError::Config("glyph count must be at least 1".to_string()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(TextError::Config(format!(
                "atlas size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        // glyph rectangles are stored as u16
        if self.width > u16::MAX as u32 || self.height > u16::MAX as u32 {
            return Err(TextError::Config(format!(
                "atlas size {}x{} exceeds {}",
                self.width,
                self.height,
                u16::MAX
            )));
        }
        // at least one blank pixel between glyphs and around the edges
        if self.padding == 0 {
            return Err(TextError::Config("glyph padding must be at least 1".to_string()));
        }
        match self.padding.checked_mul(2) {
            Some(both) if both < self.width && both < self.height => {}
            _ => {
                return Err(TextError::Config(format!(
                    "glyph padding {} leaves no room in a {}x{} atlas",
                    self.padding, self.width, self.height
                )))
            }
        }
        let last = self
            .first_code_point
            .checked_add(self.glyph_count - 1)
            .ok_or_else(|| TextError::Config("code point range overflows".to_string()))?;
        for cp in [self.first_code_point, last] {
            if char::from_u32(cp).is_none() {
                return Err(TextError::Config(format!(
                    "code point range {}..={} is not valid unicode",
                    self.first_code_point, last
                )));
            }
        }
        // the range may straddle the surrogate block
        if self.first_code_point <= 0xDFFF && last >= 0xD800 {
            return Err(TextError::Config(format!(
                "code point range {}..={} crosses the surrogate block",
                self.first_code_point, last
            )));
        }
        Ok(())
    }

    /// Characters of the baked range, in index order
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        (self.first_code_point..self.first_code_point.saturating_add(self.glyph_count))
            .filter_map(char::from_u32)
    }
}

/// Coverage bitmap and placement of one rasterized glyph
#[derive(Debug, Clone, Default)]
pub struct RasterizedGlyph {
    pub width: usize,
    pub height: usize,
    /// Left bearing in pixels
    pub xmin: i32,
    /// Offset from the baseline to the bitmap's bottom edge, y up
    pub ymin: i32,
    pub advance: f32,
    /// Row-major, `width * height` bytes
    pub coverage: Vec<u8>,
}

/// Source of glyph bitmaps for the bake pass
pub trait GlyphRasterizer {
    /// Bitmap width and height of `ch`, without rasterizing it
    fn measure(&self, ch: char, pixel_height: f32) -> (usize, usize);

    fn rasterize(&self, ch: char, pixel_height: f32) -> RasterizedGlyph;
}

/// fontdue backed rasterizer
pub struct FontRasterizer {
    font: Font,
}

impl FontRasterizer {
    pub fn from_bytes(font_data: &[u8]) -> TextResult<Self> {
        let faces = ttf_parser::fonts_in_collection(font_data).unwrap_or(1);
        info!("Font data ({} bytes) has {} face(s)", font_data.len(), faces);

        let font = Font::from_bytes(font_data, FontSettings::default())
            .map_err(|e| TextError::FontParse(e.to_string()))?;
        Ok(Self { font })
    }

    /// Em size that makes ascent - descent span `pixel_height` pixels
    fn em_size(&self, pixel_height: f32) -> f32 {
        match self.font.horizontal_line_metrics(pixel_height) {
            Some(lm) if lm.ascent - lm.descent > 0.0 => {
                pixel_height * pixel_height / (lm.ascent - lm.descent)
            }
            _ => pixel_height,
        }
    }
}

impl GlyphRasterizer for FontRasterizer {
    fn measure(&self, ch: char, pixel_height: f32) -> (usize, usize) {
        let metrics = self.font.metrics(ch, self.em_size(pixel_height));
        (metrics.width, metrics.height)
    }

    fn rasterize(&self, ch: char, pixel_height: f32) -> RasterizedGlyph {
        let (metrics, coverage) = self.font.rasterize(ch, self.em_size(pixel_height));
        RasterizedGlyph {
            width: metrics.width,
            height: metrics.height,
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            advance: metrics.advance_width,
            coverage,
        }
    }
}

/// Row based packer, cursor moves right and wraps to a new shelf
struct ShelfPacker {
    width: u32,
    height: u32,
    padding: u32,
    cursor_x: u32,
    cursor_y: u32,
    shelf_height: u32,
}

impl ShelfPacker {
    fn new(width: u32, height: u32, padding: u32) -> Self {
        Self {
            width,
            height,
            padding,
            cursor_x: padding,
            cursor_y: padding,
            shelf_height: 0,
        }
    }

    fn pack(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        let pad2 = self.padding.checked_mul(2)?;
        if w.checked_add(pad2)? > self.width || h.checked_add(pad2)? > self.height {
            return None;
        }

        // all sums below are bounded by width/height + w/h, which fit in u32
        if self.cursor_x + w + self.padding > self.width {
            self.cursor_y = self
                .cursor_y
                .checked_add(self.shelf_height)?
                .checked_add(self.padding)?;
            self.cursor_x = self.padding;
            self.shelf_height = 0;
        }

        if self.cursor_y.checked_add(h)?.checked_add(self.padding)? > self.height {
            return None;
        }

        let pos = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + self.padding;
        self.shelf_height = self.shelf_height.max(h);
        Some(pos)
    }
}

/// Single channel atlas pixels, one byte of coverage per pixel
#[derive(Debug, Clone)]
pub struct AtlasBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl AtlasBitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; (width * height) as usize],
        }
    }

    /// Copy coverage into the `w` x `h` cell at (x, y), clipped to the cell
    fn blit(&mut self, x: u32, y: u32, w: u32, h: u32, glyph: &RasterizedGlyph) {
        if glyph.width == 0 {
            return;
        }
        let stride = self.width as usize;
        let cols = glyph.width.min(w as usize);
        for (row, src) in glyph
            .coverage
            .chunks_exact(glyph.width)
            .take(glyph.height.min(h as usize))
            .enumerate()
        {
            let start = (y as usize + row) * stride + x as usize;
            self.pixels[start..start + cols].copy_from_slice(&src[..cols]);
        }
    }

    /// Write the bitmap as an 8-bit grayscale PNG for inspection
    #[cfg(feature = "image")]
    pub fn export_png<P: AsRef<Path>>(&self, path: P) -> TextResult<()> {
        image::save_buffer(
            path.as_ref(),
            &self.pixels,
            self.width,
            self.height,
            image::ColorType::L8,
        )?;
        info!("Font atlas written to {:?}", path.as_ref());
        Ok(())
    }
}

/// Bounds checked glyph lookup over the baked range
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphTable {
    first_code_point: u32,
    metrics: Vec<GlyphMetrics>,
    rects: Vec<GlyphTextureRect>,
}

impl GlyphTable {
    pub fn first_code_point(&self) -> u32 {
        self.first_code_point
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn metrics(&self) -> &[GlyphMetrics] {
        &self.metrics
    }

    pub fn texture_rects(&self) -> &[GlyphTextureRect] {
        &self.rects
    }

    pub fn contains(&self, ch: char) -> bool {
        self.index_of(ch).is_some()
    }

    fn index_of(&self, ch: char) -> Option<usize> {
        (ch as u32)
            .checked_sub(self.first_code_point)
            .map(|i| i as usize)
            .filter(|&i| i < self.metrics.len())
    }

    /// Metrics and texture rectangle of `ch`
    pub fn lookup(&self, ch: char) -> TextResult<(&GlyphMetrics, &GlyphTextureRect)> {
        let idx = self.index_of(ch).ok_or(TextError::UnsupportedGlyph(ch))?;
        Ok((&self.metrics[idx], &self.rects[idx]))
    }
}

/// Baked atlas: pixels plus glyph table
#[derive(Debug, Clone)]
pub struct FontAtlas {
    pub bitmap: AtlasBitmap,
    pub glyphs: GlyphTable,
}

impl FontAtlas {
    /// Read a font file fully into memory and bake it
    pub fn load<P: AsRef<Path>>(font_path: P, spec: &AtlasSpec) -> TextResult<Self> {
        let font_data = std::fs::read(font_path.as_ref()).map_err(|e| {
            error!("Failed to read font file {:?}: {}", font_path.as_ref(), e);
            TextError::Io(e)
        })?;
        info!("Font file: {:?}", font_path.as_ref());
        Self::bake(&font_data, spec)
    }

    /// Parse `font_data` with fontdue and bake the requested range
    pub fn bake(font_data: &[u8], spec: &AtlasSpec) -> TextResult<Self> {
        spec.validate()?;
        let rasterizer = FontRasterizer::from_bytes(font_data)?;
        Self::bake_with(&rasterizer, spec)
    }

    /// Bake the requested range with any rasterizer
    pub fn bake_with<R: GlyphRasterizer>(rasterizer: &R, spec: &AtlasSpec) -> TextResult<Self> {
        spec.validate()?;

        // Measure first, rasterize one glyph at a time once its cell is
        // placed. Empty glyphs (space) still get a 1x1 blank cell so their
        // texture rectangle has positive area
        let glyphs: Vec<(char, u32, u32)> = spec
            .chars()
            .map(|ch| {
                let (w, h) = rasterizer.measure(ch, spec.pixel_height);
                let clamp = |v: usize| u32::try_from(v.max(1)).unwrap_or(u32::MAX);
                (ch, clamp(w), clamp(h))
            })
            .collect();

        // Tallest first keeps shelves dense; sort is stable so ties stay
        // in code point order
        let mut order: Vec<usize> = (0..glyphs.len()).collect();
        order.sort_by(|&a, &b| glyphs[b].2.cmp(&glyphs[a].2));

        let mut packer = ShelfPacker::new(spec.width, spec.height, spec.padding);
        let mut bitmap = AtlasBitmap::new(spec.width, spec.height);
        let mut metrics = vec![GlyphMetrics::default(); glyphs.len()];
        let mut rects = vec![GlyphTextureRect::default(); glyphs.len()];

        for idx in order {
            let (ch, w, h) = glyphs[idx];
            let (x, y) = packer.pack(w, h).ok_or(TextError::AtlasOverflow {
                code_point: ch as u32,
                glyph_width: w,
                glyph_height: h,
                atlas_width: spec.width,
                atlas_height: spec.height,
            })?;

            let glyph = rasterizer.rasterize(ch, spec.pixel_height);
            bitmap.blit(x, y, w, h, &glyph);

            metrics[idx] = GlyphMetrics {
                x0: x as u16,
                y0: y as u16,
                x1: (x + w) as u16,
                y1: (y + h) as u16,
                xoff: glyph.xmin as f32,
                yoff: -(glyph.ymin + glyph.height as i32) as f32,
                xadvance: glyph.advance,
            };
            rects[idx] = GlyphTextureRect::from_pixels(x, y, x + w, y + h, spec.width, spec.height);
        }

        debug!(
            "Packed {} glyphs into {}x{}, last shelf ends at y={}",
            glyphs.len(),
            spec.width,
            spec.height,
            packer.cursor_y + packer.shelf_height
        );
        info!(
            "Baked {} glyphs (U+{:04X}..) at {}px into {}x{} atlas",
            glyphs.len(),
            spec.first_code_point,
            spec.pixel_height,
            spec.width,
            spec.height
        );

        Ok(Self {
            bitmap,
            glyphs: GlyphTable {
                first_code_point: spec.first_code_point,
                metrics,
                rects,
            },
        })
    }

    /// Split into the pixels (dropped after GPU upload) and the glyph table
    pub fn into_parts(self) -> (AtlasBitmap, GlyphTable) {
        (self.bitmap, self.glyphs)
    }
}
