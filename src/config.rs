// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Runtime configuration.
//!
//! Read once at startup from an optional `pixel_text.toml` in the project
//! directory. Every field has a default so a missing file or a partial
//! file both work:
//!
//! ```toml
//! [window]
//! width = 1024
//! title = "glyphs"
//!
//! [renderer]
//! fallback = { placeholder = "?" }
//!
//! [[lines]]
//! text = "hello"
//! pen = [-0.5, 0.0, 0.0]
//! ```

use crate::error::{TextError, TextResult};
use crate::render::atlas::AtlasSpec;
use crate::render::batch::GlyphFallback;
use crate::render::chunk::{ChunkPlan, DEFAULT_CHUNK_CAPACITY};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "pixel_text.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub clear_color: [f32; 4],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "pixel_text".to_string(),
            clear_color: [0.2, 0.2, 0.2, 1.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub path: PathBuf,
    pub pixel_height: f32,
    pub first_code_point: u32,
    pub glyph_count: u32,
}

impl Default for FontConfig {
    fn default() -> Self {
        let spec = AtlasSpec::default();
        Self {
            path: PathBuf::from("assets/fonts/DejaVuSans.ttf"),
            pixel_height: spec.pixel_height,
            first_code_point: spec.first_code_point,
            glyph_count: spec.glyph_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    /// Grayscale PNG dump of the baked atlas, skipped when unset
    pub dump_png: Option<PathBuf>,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        let spec = AtlasSpec::default();
        Self {
            width: spec.width,
            height: spec.height,
            padding: spec.padding,
            dump_png: Some(PathBuf::from("fontAtlas.png")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Vertex buffer size in vertices
    pub chunk_capacity: usize,
    pub fallback: GlyphFallback,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            fallback: GlyphFallback::Skip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: "log/pixel_text.log".to_string(),
        }
    }
}

/// One string drawn every frame
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextLine {
    pub text: String,
    pub pen: [f32; 3],
    pub color: [f32; 4],
    pub scale: f32,
}

impl Default for TextLine {
    fn default() -> Self {
        Self {
            text: String::new(),
            pen: [0.0; 3],
            color: [1.0; 4],
            scale: 1.0,
        }
    }
}

impl TextLine {
    pub fn new(text: &str, pen: [f32; 3], color: [f32; 4], scale: f32) -> Self {
        Self {
            text: text.to_string(),
            pen,
            color,
            scale,
        }
    }
}

fn default_lines() -> Vec<TextLine> {
    vec![
        TextLine::new(
            "This is some text rendered in wgpu.",
            [-1.0, 0.0, 0.0],
            [1.0, 1.0, 1.0, 1.0],
            0.7,
        ),
        TextLine::new(
            "The color of text can be changed too!",
            [-0.5, -0.4, 0.0],
            [0.1, 0.5, 1.0, 1.0],
            0.5,
        ),
        TextLine::new(
            "fontdue baked atlas example",
            [-0.8, 0.4, 0.0],
            [0.9, 0.2, 0.3, 1.0],
            1.0,
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub window: WindowConfig,
    pub font: FontConfig,
    pub atlas: AtlasConfig,
    pub renderer: RendererConfig,
    pub log: LogConfig,
    pub lines: Vec<TextLine>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            font: FontConfig::default(),
            atlas: AtlasConfig::default(),
            renderer: RendererConfig::default(),
            log: LogConfig::default(),
            lines: default_lines(),
        }
    }
}

impl TextConfig {
    pub fn from_toml(src: &str) -> TextResult<Self> {
        let config: TextConfig = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    /// Path of `pixel_text.toml` under `project_path`
    pub fn config_file<P: AsRef<Path>>(project_path: P) -> PathBuf {
        project_path.as_ref().join(CONFIG_FILE)
    }

    /// Load `pixel_text.toml` from `project_path`, defaults when absent
    ///
    /// Runs before logging is set up, so the caller reports the source
    /// with `describe_source` once the logger exists.
    pub fn load<P: AsRef<Path>>(project_path: P) -> TextResult<Self> {
        let path = Self::config_file(project_path);
        if !path.exists() {
            return Ok(Self::default());
        }
        let src = std::fs::read_to_string(&path)?;
        Self::from_toml(&src)
    }

    /// One line naming where the config came from
    pub fn describe_source<P: AsRef<Path>>(project_path: P) -> String {
        let path = Self::config_file(project_path);
        if path.exists() {
            format!("Loaded config {:?}", path)
        } else {
            format!("No {:?}, using default config", path)
        }
    }

    pub fn atlas_spec(&self) -> AtlasSpec {
        AtlasSpec {
            pixel_height: self.font.pixel_height,
            first_code_point: self.font.first_code_point,
            glyph_count: self.font.glyph_count,
            width: self.atlas.width,
            height: self.atlas.height,
            padding: self.atlas.padding,
        }
    }

    pub fn validate(&self) -> TextResult<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(TextError::Config(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        self.atlas_spec().validate()?;
        ChunkPlan::new(0, self.renderer.chunk_capacity)?;
        crate::log::parse_level(&self.log.level)?;
        if let Some(line) = self.lines.iter().find(|l| !(l.scale.is_finite() && l.scale > 0.0)) {
            return Err(TextError::Config(format!(
                "text scale must be positive, got {} for {:?}",
                line.scale, line.text
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let c = TextConfig::default();
        c.validate().unwrap();
        assert_eq!((c.window.width, c.window.height), (800, 600));
        assert_eq!(c.atlas_spec(), AtlasSpec::default());
        assert_eq!(c.renderer.chunk_capacity, 600_000);
        assert_eq!(c.lines.len(), 3);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        assert_eq!(TextConfig::from_toml("").unwrap(), TextConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let c = TextConfig::from_toml(
            r#"
            [window]
            width = 1024
            title = "glyphs"

            [font]
            pixel_height = 32.0

            [renderer]
            fallback = { placeholder = "?" }

            [[lines]]
            text = "hello"
            pen = [-0.5, 0.0, 0.0]
            "#,
        )
        .unwrap();
        assert_eq!(c.window.width, 1024);
        assert_eq!(c.window.height, 600);
        assert_eq!(c.window.title, "glyphs");
        assert_eq!(c.atlas_spec().pixel_height, 32.0);
        assert_eq!(c.renderer.fallback, GlyphFallback::Placeholder('?'));
        assert_eq!(c.lines, vec![TextLine::new("hello", [-0.5, 0.0, 0.0], [1.0; 4], 1.0)]);
    }

    #[test]
    fn test_skip_fallback_from_string() {
        let c = TextConfig::from_toml("[renderer]\nfallback = \"skip\"\n").unwrap();
        assert_eq!(c.renderer.fallback, GlyphFallback::Skip);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for src in [
            "[window]\nheight = 0\n",
            "[renderer]\nchunk_capacity = 5\n",
            "[atlas]\nwidth = 0\n",
            "[font]\nglyph_count = 0\n",
            "[log]\nlevel = \"loud\"\n",
            "[[lines]]\ntext = \"x\"\nscale = 0.0\n",
            "[atlas]\npadding = 0\n",
            "[atlas]\npadding = 300\n",
            "[window]\nwidth = \"wide\"\n",
        ] {
            assert!(
                matches!(TextConfig::from_toml(src), Err(TextError::Config(_))),
                "{}",
                src
            );
        }
    }

    #[test]
    fn test_config_source_is_described() {
        let dir = std::env::temp_dir().join(format!("pixel_text_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        assert_eq!(TextConfig::config_file(&dir), dir.join("pixel_text.toml"));
        assert!(TextConfig::describe_source(&dir).starts_with("No "));

        std::fs::write(TextConfig::config_file(&dir), "[window]\nwidth = 640\n").unwrap();
        assert!(TextConfig::describe_source(&dir).starts_with("Loaded config"));
        assert_eq!(TextConfig::load(&dir).unwrap().window.width, 640);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = std::env::temp_dir().join("pixel_text_no_config_here");
        assert_eq!(TextConfig::load(&dir).unwrap(), TextConfig::default());
    }
}
