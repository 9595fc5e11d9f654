// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! # Render Adapter Module
//!
//! GPU and window collaborators of the text renderer:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                winit_wgpu_adapter                    │
//! │  TextApp (ApplicationHandler) + frame loop           │
//! │        │                                             │
//! │        ▼                                             │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │                    wgpu                        │  │
//! │  │  WgpuTextRenderer: pipeline, vertex buffer,    │  │
//! │  │  font texture, WgpuChunkSink                   │  │
//! │  └────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod wgpu;
pub mod winit_wgpu_adapter;

pub use winit_wgpu_adapter::{run, TextApp};
