use crossbeam_channel::{Receiver, RecvError, Sender, bounded};

/// Creates a wait-gate pair.
///
/// An object holding the [`RenderGate`] blocks the whole render loop each
/// frame until the matching [`GateRelease`] sends a token. The channel has a
/// single slot, so at most one release can be banked ahead of the frame.
pub fn render_gate() -> (RenderGate, GateRelease) {
    let (tx, rx) = bounded(1);
    (RenderGate { rx }, GateRelease { tx })
}

/// Render-thread side of a wait-gate.
#[derive(Debug)]
pub struct RenderGate {
    rx: Receiver<()>,
}

impl RenderGate {
    /// Blocks until released. Returns false once the release side is gone,
    /// after which the gate never blocks again.
    pub(crate) fn wait(&self) -> bool {
        match self.rx.recv() {
            Ok(()) => true,
            Err(RecvError) => false,
        }
    }
}

/// Producer side of a wait-gate. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct GateRelease {
    tx: Sender<()>,
}

impl GateRelease {
    /// Lets one frame through. Blocks while a previous release is still
    /// unconsumed; returns false when the gate has been dropped.
    pub fn release(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banked_release_lets_one_frame_through() {
        let (gate, release) = render_gate();
        assert!(release.release());
        assert!(gate.wait());
        assert!(gate.rx.is_empty());
    }

    #[test]
    fn wait_blocks_until_another_thread_releases() {
        let (gate, release) = render_gate();
        let worker = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            release.release()
        });
        assert!(gate.wait());
        assert!(worker.join().unwrap());
    }

    #[test]
    fn dropped_release_opens_the_gate() {
        let (gate, release) = render_gate();
        drop(release);
        assert!(!gate.wait());
    }

    #[test]
    fn release_after_gate_drop_fails() {
        let (gate, release) = render_gate();
        drop(gate);
        assert!(!release.release());
    }
}
