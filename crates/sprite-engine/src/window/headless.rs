//! Window double for renderer tests.

use crate::coords::Viewport;
use crate::device::Backend;
use crate::device::recording::RecordingBackend;
use crate::input::InputState;

use super::Window;

/// Records presents and polls into the backend call log and closes after a
/// fixed number of polls.
#[derive(Debug)]
pub(crate) struct HeadlessWindow {
    pub gpu: RecordingBackend,
    pub input: InputState,
    pub size: Viewport,
    pub frames_left: usize,
}

impl HeadlessWindow {
    pub fn new(frames: usize) -> Self {
        Self {
            gpu: RecordingBackend::new(),
            input: InputState::default(),
            size: Viewport::new(800.0, 600.0),
            frames_left: frames,
        }
    }
}

impl Window for HeadlessWindow {
    fn should_close(&self) -> bool {
        self.frames_left == 0
    }

    fn poll_input(&mut self) {
        self.input.begin_poll();
        self.frames_left = self.frames_left.saturating_sub(1);
        self.gpu.mark("poll");
    }

    fn swap_buffers(&mut self) {
        self.gpu.mark("present");
    }

    fn size(&self) -> Viewport {
        self.size
    }

    fn input(&self) -> &InputState {
        &self.input
    }

    fn gpu(&mut self) -> &mut dyn Backend {
        &mut self.gpu
    }
}
