// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! Error types shared by the atlas packer, the batch builder and the
//! wgpu adapter.

use std::fmt;

/// Result alias used across the crate
pub type TextResult<T> = Result<T, TextError>;

/// Error taxonomy of the text renderer
///
/// Startup errors (font, shader, device, window, config) are fatal for the
/// process run. `UnsupportedGlyph` is per-glyph and is absorbed by the
/// batch builder according to its fallback policy.
#[derive(Debug)]
pub enum TextError {
    /// Font bytes could not be parsed
    FontParse(String),
    /// A glyph did not fit in the atlas at the requested size
    AtlasOverflow {
        code_point: u32,
        glyph_width: u32,
        glyph_height: u32,
        atlas_width: u32,
        atlas_height: u32,
    },
    /// Code point outside the baked range
    UnsupportedGlyph(char),
    /// WGSL shader module failed validation
    ShaderCompile(String),
    /// Render pipeline creation failed
    ShaderLink(String),
    /// GPU adapter, device or surface could not be created
    Device(String),
    /// Window or event loop failure
    Window(String),
    /// Per-frame submission failure
    Render(String),
    /// Invalid configuration value
    Config(String),
    Io(std::io::Error),
    /// Debug atlas export failure
    Image(String),
}

impl fmt::Display for TextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextError::FontParse(msg) => write!(f, "Font parse error: {}", msg),
            TextError::AtlasOverflow {
                code_point,
                glyph_width,
                glyph_height,
                atlas_width,
                atlas_height,
            } => write!(
                f,
                "Atlas overflow: glyph U+{:04X} ({}x{}) does not fit in {}x{} atlas",
                code_point, glyph_width, glyph_height, atlas_width, atlas_height
            ),
            TextError::UnsupportedGlyph(ch) => {
                write!(f, "Unsupported glyph: {:?} (U+{:04X})", ch, *ch as u32)
            }
            TextError::ShaderCompile(msg) => write!(f, "Shader compile error: {}", msg),
            TextError::ShaderLink(msg) => write!(f, "Shader link error: {}", msg),
            TextError::Device(msg) => write!(f, "Device error: {}", msg),
            TextError::Window(msg) => write!(f, "Window error: {}", msg),
            TextError::Render(msg) => write!(f, "Render error: {}", msg),
            TextError::Config(msg) => write!(f, "Config error: {}", msg),
            TextError::Io(e) => write!(f, "IO error: {}", e),
            TextError::Image(msg) => write!(f, "Image error: {}", msg),
        }
    }
}

impl std::error::Error for TextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TextError {
    fn from(err: std::io::Error) -> TextError {
        TextError::Io(err)
    }
}

impl From<toml::de::Error> for TextError {
    fn from(err: toml::de::Error) -> TextError {
        TextError::Config(err.to_string())
    }
}

#[cfg(feature = "image")]
impl From<image::ImageError> for TextError {
    fn from(err: image::ImageError) -> TextError {
        TextError::Image(err.to_string())
    }
}
