use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;

use super::GpuInit;

/// Surface texture, its view and the encoder recording into it.
///
/// Lives from the first clear of a frame until it is presented. Holding it
/// blocks acquisition of the next surface texture.
pub(crate) struct SurfaceFrame {
    pub texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// Outcome of asking the swap chain for a frame.
pub(crate) enum Acquired {
    Frame(SurfaceFrame),
    /// Nothing to draw into this time round; try again next frame.
    Skip,
    /// The device cannot present anymore.
    Lost,
}

/// A configured window surface.
pub(crate) struct SwapChain {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
}

impl SwapChain {
    pub fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        device: &wgpu::Device,
        size: PhysicalSize<u32>,
        init: &GpuInit,
    ) -> Result<Self> {
        let caps = surface.get_capabilities(adapter);
        let format = pick_format(&caps.formats, init.prefer_srgb)
            .context("surface offers no texture formats")?;
        let alpha_mode = pick_alpha_mode(&caps.alpha_modes, init.transparent);
        log::debug!("swap chain format {format:?}, alpha {alpha_mode:?}");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: init.present_mode(),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: init.max_frame_latency,
        };
        surface.configure(device, &config);

        Ok(Self {
            surface,
            config,
            size,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Records the new size. A minimized window keeps its old configuration
    /// since wgpu rejects zero extents.
    pub fn resize(&mut self, device: &wgpu::Device, size: PhysicalSize<u32>) {
        self.size = size;
        if is_empty(size) {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(device, &self.config);
    }

    /// Acquires the next surface texture, reconfiguring after a lost or
    /// outdated surface.
    pub fn acquire(&self, device: &wgpu::Device) -> Acquired {
        if is_empty(self.size) {
            return Acquired::Skip;
        }
        let texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface outdated, reconfiguring");
                self.surface.configure(device, &self.config);
                return Acquired::Skip;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                return Acquired::Lost;
            }
            Err(err) => {
                log::debug!("skipping frame: {err}");
                return Acquired::Skip;
            }
        };

        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("sprite frame encoder"),
        });
        Acquired::Frame(SurfaceFrame {
            texture,
            view,
            encoder,
        })
    }

    pub fn present(&self, queue: &wgpu::Queue, frame: SurfaceFrame) {
        let SurfaceFrame {
            texture,
            view,
            encoder,
        } = frame;
        queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        texture.present();
    }
}

fn is_empty(size: PhysicalSize<u32>) -> bool {
    size.width == 0 || size.height == 0
}

fn pick_format(formats: &[wgpu::TextureFormat], prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    let srgb = formats.iter().copied().find(|f| f.is_srgb());
    match srgb {
        Some(format) if prefer_srgb => Some(format),
        _ => formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| formats.first().copied()),
    }
}

fn pick_alpha_mode(modes: &[wgpu::CompositeAlphaMode], transparent: bool) -> wgpu::CompositeAlphaMode {
    let wanted = if transparent {
        wgpu::CompositeAlphaMode::PreMultiplied
    } else {
        wgpu::CompositeAlphaMode::Opaque
    };
    if modes.contains(&wanted) {
        wanted
    } else {
        modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto)
    }
}
