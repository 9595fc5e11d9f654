// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! pixel_text is a minimal real-time text renderer.
//!
//! A TrueType font is baked once at startup into a single channel glyph
//! atlas (printable ASCII at 64px into 512x512 by default). Every frame,
//! strings are expanded into textured quads appended to one growable vertex
//! list, which is then drawn through a fixed-size GPU vertex buffer in as
//! many chunks as needed.
//!
//! The atlas packer, batch builder and chunk planner are plain CPU code and
//! build without any GPU dependency. The `wgpu` feature adds the winit
//! window, the WGSL pipeline and the `run` entry point.
//!
//! ```no_run
//! let config = pixel_text::config::TextConfig::load(".")?;
//! pixel_text::log::init_log(log::LevelFilter::Info, "log/pixel_text.log")?;
//! # #[cfg(feature = "wgpu")]
//! pixel_text::run(config)?;
//! # Ok::<(), pixel_text::error::TextError>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod log;
pub mod render;

pub use config::{TextConfig, TextLine};
pub use context::{RenderContext, Viewport};
pub use error::{TextError, TextResult};

#[cfg(feature = "wgpu")]
pub use render::adapter::{run, TextApp};
