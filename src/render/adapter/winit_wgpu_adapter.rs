// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! # Winit + WGPU Text App
//!
//! Window lifecycle and the frame loop.
//!
//! ```text
//! run(config)
//!   ├─ bake atlas (+ optional PNG dump)
//!   ├─ RenderContext::new
//!   └─ loop
//!        ├─ pump_app_events ──► resumed: window, surface, device, pipeline
//!        │                      Resized: reconfigure + RenderContext::resize
//!        │                      CloseRequested / Esc / Q: exit
//!        └─ frame: clear, draw_begin, draw_line xN, chunks, present
//! ```
//!
//! Everything runs on the main thread; `pollster` only blocks on the
//! adapter and device requests during startup.

use crate::config::TextConfig;
use crate::context::RenderContext;
use crate::error::{TextError, TextResult};
use crate::render::adapter::wgpu::WgpuTextRenderer;
use crate::render::atlas::{AtlasBitmap, FontAtlas};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalPosition, PhysicalSize},
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowId},
};

/// GPU objects bound to one window
///
/// Field order matters for drop: the surface goes before the window.
struct WgpuState {
    surface: wgpu::Surface<'static>,
    renderer: WgpuTextRenderer,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_config: wgpu::SurfaceConfiguration,
    window: Arc<Window>,
}

impl WgpuState {
    async fn new(window: Arc<Window>, atlas: &AtlasBitmap, capacity: usize) -> TextResult<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| TextError::Device(format!("create surface: {}", e)))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| TextError::Device(format!("request adapter: {}", e)))?;

        info!("WGPU adapter found: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Text Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await
            .map_err(|e| TextError::Device(format!("request device: {}", e)))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| TextError::Device("surface reports no formats".to_string()))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        info!(
            "WGPU surface configured: {}x{}, format: {:?}",
            surface_config.width, surface_config.height, surface_config.format
        );

        let renderer = WgpuTextRenderer::new(&device, &queue, surface_format, atlas, capacity)?;

        Ok(Self {
            surface,
            renderer,
            device,
            queue,
            surface_config,
            window,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        self.surface_config.width = size.width;
        self.surface_config.height = size.height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.surface_config);
    }
}

/// Place the window in the middle of the primary monitor
fn center_window(window: &Window, event_loop: &ActiveEventLoop) {
    let Some(monitor) = event_loop
        .primary_monitor()
        .or_else(|| window.current_monitor())
    else {
        return;
    };
    let screen = monitor.size();
    let origin = monitor.position();
    let outer = window.outer_size();
    let x = origin.x + (screen.width as i32 - outer.width as i32) / 2;
    let y = origin.y + (screen.height as i32 - outer.height as i32) / 2;
    window.set_outer_position(PhysicalPosition::new(x.max(origin.x), y.max(origin.y)));
}

pub struct TextApp {
    config: TextConfig,
    context: RenderContext,
    /// Held until the GPU copy exists, then dropped
    atlas: Option<AtlasBitmap>,
    gpu: Option<WgpuState>,
    error: Option<TextError>,
    should_exit: bool,
}

impl TextApp {
    pub fn new(config: TextConfig, context: RenderContext, atlas: AtlasBitmap) -> Self {
        Self {
            config,
            context,
            atlas: Some(atlas),
            gpu: None,
            error: None,
            should_exit: false,
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> TextResult<()> {
        let wc = &self.config.window;
        let attributes = Window::default_attributes()
            .with_title(&wc.title)
            .with_inner_size(LogicalSize::new(wc.width, wc.height))
            .with_resizable(true);
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|e| TextError::Window(e.to_string()))?,
        );
        center_window(&window, event_loop);

        let physical = window.inner_size();
        info!(
            "Window created - logical: {}x{}, physical: {}x{}",
            wc.width, wc.height, physical.width, physical.height
        );

        let atlas = self
            .atlas
            .take()
            .ok_or_else(|| TextError::Device("font atlas already uploaded".to_string()))?;
        let gpu = pollster::block_on(WgpuState::new(
            window,
            &atlas,
            self.context.chunk_capacity(),
        ))?;

        self.context.resize(physical.width, physical.height);
        self.gpu = Some(gpu);
        info!("WGPU window & context initialized successfully");
        Ok(())
    }

    /// Draw one frame, surface hiccups skip the frame
    pub fn frame(&mut self) -> TextResult<()> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };

        self.context.draw_begin();
        for line in &self.config.lines {
            self.context.draw_line(line);
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                debug!("Surface lost or outdated, reconfiguring");
                gpu.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(TextError::Render(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer
            .clear(&gpu.device, &gpu.queue, &view, self.config.window.clear_color);
        let mut sink = gpu.renderer.sink(&gpu.device, &gpu.queue, &view);
        self.context.render(&mut sink)?;

        gpu.window.pre_present_notify();
        output.present();
        Ok(())
    }
}

impl ApplicationHandler for TextApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            error!("Startup failed: {}", e);
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested");
                self.should_exit = true;
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && matches!(
                        event.physical_key,
                        PhysicalKey::Code(KeyCode::Escape) | PhysicalKey::Code(KeyCode::KeyQ)
                    )
                {
                    self.should_exit = true;
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(size);
                }
                self.context.resize(size.width, size.height);
            }
            _ => {}
        }
    }
}

/// Bake the atlas, open the window and draw `config.lines` until closed
pub fn run(config: TextConfig) -> TextResult<()> {
    let atlas = FontAtlas::load(&config.font.path, &config.atlas_spec())?;

    #[cfg(feature = "image")]
    if let Some(path) = &config.atlas.dump_png {
        if let Err(e) = atlas.bitmap.export_png(path) {
            warn!("Font atlas dump to {:?} failed: {}", path, e);
        }
    }

    let (bitmap, glyphs) = atlas.into_parts();
    let context = RenderContext::new(
        glyphs,
        config.window.width,
        config.window.height,
        &config.renderer,
    )?;

    let mut event_loop = EventLoop::new().map_err(|e| TextError::Window(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = TextApp::new(config, context, bitmap);
    loop {
        let status = event_loop.pump_app_events(Some(Duration::ZERO), &mut app);

        if let Some(e) = app.error.take() {
            return Err(e);
        }
        if app.should_exit {
            break;
        }
        if let PumpStatus::Exit(code) = status {
            info!("Event loop exited with code {}", code);
            break;
        }
        if let Err(e) = app.frame() {
            error!("Frame failed: {}", e);
        }
    }

    info!("Shutting down");
    Ok(())
}
