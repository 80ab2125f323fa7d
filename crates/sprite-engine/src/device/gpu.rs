use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::GpuInit;
use super::surface::{Acquired, SurfaceFrame, SwapChain};

/// Device, queue and swap chain of one window.
///
/// The surface holds the window through an `Arc`, so the window always
/// outlives it.
pub struct Gpu {
    /// Kept alive for the lifetime of the surface.
    _instance: wgpu::Instance,
    device: wgpu::Device,
    queue: wgpu::Queue,
    swap_chain: SwapChain,
}

impl Gpu {
    /// Creates a GPU context bound to `window`. Adapter and device requests
    /// are asynchronous under wgpu; block on this with `pollster`.
    pub async fn new(window: Arc<Window>, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter can present to this window")?;
        let info = adapter.get_info();
        log::info!("using adapter {:?} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("sprite-engine device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device")?;

        let swap_chain = SwapChain::new(surface, &adapter, &device, size, &init)?;

        Ok(Self {
            _instance: instance,
            device,
            queue,
            swap_chain,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.swap_chain.format()
    }

    /// Drawable size in physical pixels.
    pub fn size(&self) -> PhysicalSize<u32> {
        self.swap_chain.size()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.swap_chain.resize(&self.device, size);
    }

    pub(crate) fn acquire(&self) -> Acquired {
        self.swap_chain.acquire(&self.device)
    }

    pub(crate) fn present(&self, frame: SurfaceFrame) {
        self.swap_chain.present(&self.queue, frame);
    }
}
