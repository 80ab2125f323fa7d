use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window as WinitWindow, WindowId};

use crate::coords::Viewport;
use crate::device::{Backend, Gpu, GpuInit, WgpuBackend};
use crate::input::InputState;
use crate::input::platform::winit::translate_window_event;

use super::Window;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "sprite-engine".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            resizable: true,
        }
    }
}

/// Event handler state. Lives outside the event loop so it can be handed to
/// `pump_app_events` by `&mut`.
struct Handler {
    config: WindowConfig,
    window: Option<Arc<WinitWindow>>,
    create_error: Option<anyhow::Error>,

    input: InputState,
    height: u32,
    pending_resize: Option<PhysicalSize<u32>>,
    close_requested: bool,
}

impl Handler {
    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = WinitWindow::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        self.height = window.inner_size().height;
        self.window = Some(Arc::new(window));
        Ok(())
    }
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            log::error!("failed to create window: {e:#}");
            self.create_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(ev) = translate_window_event(&event, self.height) {
            self.input.apply(ev);
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("window close requested");
                self.close_requested = true;
            }

            WindowEvent::Resized(size) => {
                self.height = size.height;
                self.pending_resize = Some(size);
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.height = size.height;
                    self.pending_resize = Some(size);
                }
            }

            _ => {}
        }
    }
}

/// A winit window with a wgpu backend.
///
/// Must be opened and driven on the main thread on most platforms; that
/// thread becomes the rendering thread.
pub struct DesktopWindow {
    event_loop: EventLoop<()>,
    handler: Handler,
    window: Arc<WinitWindow>,
    backend: WgpuBackend,
}

impl DesktopWindow {
    /// Creates the event loop, the window and the GPU context.
    pub fn open(config: WindowConfig, gpu_init: GpuInit) -> Result<Self> {
        let mut event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut handler = Handler {
            config,
            window: None,
            create_error: None,
            input: InputState::default(),
            height: 0,
            pending_resize: None,
            close_requested: false,
        };

        // Windows can only be created once the loop has resumed.
        let window = loop {
            let status = event_loop.pump_app_events(Some(Duration::from_millis(10)), &mut handler);
            if let Some(err) = handler.create_error.take() {
                return Err(err);
            }
            if let Some(window) = &handler.window {
                break window.clone();
            }
            if let PumpStatus::Exit(code) = status {
                bail!("event loop exited with code {code} before a window was created");
            }
        };

        let gpu = pollster::block_on(Gpu::new(window.clone(), gpu_init))
            .context("GPU initialization failed for window")?;
        log::info!(
            "opened window {:?} ({}x{}, {:?})",
            handler.config.title,
            gpu.size().width,
            gpu.size().height,
            gpu.surface_format()
        );

        Ok(Self {
            event_loop,
            handler,
            window,
            backend: WgpuBackend::new(gpu),
        })
    }

    pub fn winit_window(&self) -> &WinitWindow {
        &self.window
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    /// Asks the loop to stop after the current frame.
    pub fn request_close(&mut self) {
        self.handler.close_requested = true;
    }
}

impl Window for DesktopWindow {
    fn should_close(&self) -> bool {
        self.handler.close_requested || self.backend.is_lost()
    }

    fn poll_input(&mut self) {
        self.handler.input.begin_poll();
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.handler);

        if let Some(size) = self.handler.pending_resize.take() {
            self.backend.resize(size);
        }
        if let PumpStatus::Exit(code) = status {
            log::info!("event loop exited with code {code}");
            self.handler.close_requested = true;
        }
    }

    fn swap_buffers(&mut self) {
        self.window.pre_present_notify();
        self.backend.present();
    }

    fn size(&self) -> Viewport {
        let size = self.backend.size();
        Viewport::new(size.width as f32, size.height as f32)
    }

    fn input(&self) -> &InputState {
        &self.handler.input
    }

    fn gpu(&mut self) -> &mut dyn Backend {
        &mut self.backend
    }
}
