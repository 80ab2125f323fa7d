/// How the window's GPU context is set up.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pace presents to the display refresh.
    pub vsync: bool,
    /// Pick an sRGB swap chain format when the surface offers one.
    pub prefer_srgb: bool,
    /// Composite the window with pre-multiplied alpha if supported.
    pub transparent: bool,
    pub power_preference: wgpu::PowerPreference,
    /// Frames the swap chain may queue ahead of the display.
    pub max_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            vsync: true,
            prefer_srgb: true,
            transparent: false,
            power_preference: wgpu::PowerPreference::HighPerformance,
            max_frame_latency: 2,
        }
    }
}

impl GpuInit {
    pub(crate) fn present_mode(&self) -> wgpu::PresentMode {
        if self.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_selects_present_mode() {
        let mut init = GpuInit::default();
        assert_eq!(init.present_mode(), wgpu::PresentMode::AutoVsync);
        init.vsync = false;
        assert_eq!(init.present_mode(), wgpu::PresentMode::AutoNoVsync);
    }
}
