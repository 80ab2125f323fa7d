use crate::coords::ColorRgba;
use crate::jobs::{JOB_QUEUE_CAPACITY, JobReceiver, JobSender, job_queue};
use crate::render::SharedVec2;
use crate::time::{FrameClock, FrameTime};
use crate::window::Window;

use super::{RenderContext, Scene};

/// Renderer configuration.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub clear_color: ColorRgba,
    pub job_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: ColorRgba::black(),
            job_capacity: JOB_QUEUE_CAPACITY,
        }
    }
}

/// Owns the window, the live render objects and the job mailbox, and drives
/// the frame loop on the rendering thread.
///
/// Every frame runs in a fixed order: at most one queued job, clear, each
/// object in registration order, present, poll input.
pub struct Renderer<W: Window> {
    window: W,
    scene: Scene,
    sender: JobSender,
    receiver: JobReceiver,
    config: RendererConfig,
    clock: FrameClock,
    last_frame: Option<FrameTime>,
}

impl<W: Window> Renderer<W> {
    pub fn new(window: W, config: RendererConfig) -> Self {
        let (sender, receiver) = job_queue(config.job_capacity);
        Self {
            window,
            scene: Scene::new(SharedVec2::default()),
            sender,
            receiver,
            config,
            clock: FrameClock::new(),
            last_frame: None,
        }
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// New submitting handle for the job mailbox.
    pub fn jobs(&self) -> JobSender {
        self.sender.clone()
    }

    pub fn pending_jobs(&self) -> usize {
        self.receiver.pending()
    }

    /// Camera cell shared by every transformed object.
    pub fn camera(&self) -> SharedVec2 {
        self.scene.camera().clone()
    }

    /// Timing of the most recent frame.
    pub fn frame_time(&self) -> Option<FrameTime> {
        self.last_frame
    }

    pub fn set_clear_color(&mut self, color: ColorRgba) {
        self.config.clear_color = color;
    }

    /// Direct access to the GPU and scene from the rendering thread.
    pub fn context(&mut self) -> RenderContext<'_> {
        let viewport = self.window.size();
        RenderContext::new(self.window.gpu(), &mut self.scene, viewport)
    }

    /// Runs one frame.
    pub fn frame(&mut self) {
        self.last_frame = Some(self.clock.tick());
        let viewport = self.window.size();

        if let Some(job) = self.receiver.try_next() {
            let mut ctx = RenderContext::new(self.window.gpu(), &mut self.scene, viewport);
            job.run(&mut ctx);
        }

        let gpu = self.window.gpu();
        gpu.clear(self.config.clear_color);
        self.scene.render(gpu, viewport);

        self.window.swap_buffers();
        self.window.poll_input();
    }

    /// Runs frames until the window asks to close.
    pub fn run(&mut self) {
        log::info!("render loop started");
        self.clock.reset();
        while !self.window.should_close() {
            self.frame();
        }
        let frames = self.last_frame.map_or(0, |t| t.frame_index + 1);
        log::info!("render loop stopped after {frames} frames");
    }

    /// Releases the GPU resources of every object. Also runs on drop.
    pub fn shutdown(&mut self) {
        self.scene.delete_all(self.window.gpu());
    }
}

impl<W: Window> Drop for Renderer<W> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
