use std::fmt;

use anyhow::Result;

use crate::device::Backend;
use crate::render::{RenderGate, RenderObject};
use crate::renderer::{ObjectDesc, ObjectHandle, RenderContext};

type JobBody = Box<dyn FnOnce(&mut RenderContext<'_>) + Send>;

/// Deferred work for the rendering thread.
///
/// Jobs are built on any thread and executed by the renderer, one per frame.
/// Parameters are captured by the closure; results go to the optional
/// completion callback, which runs on the rendering thread right after the
/// body. Callbacks must not block.
pub struct RenderJob {
    pub(super) kind: &'static str,
    body: JobBody,
}

impl fmt::Debug for RenderJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderJob").field("kind", &self.kind).finish()
    }
}

impl RenderJob {
    /// Arbitrary work against the render context.
    pub fn new(body: impl FnOnce(&mut RenderContext<'_>) + Send + 'static) -> Self {
        Self {
            kind: "custom",
            body: Box::new(body),
        }
    }

    /// Runs `body`, then hands its result to `callback`.
    pub fn with_callback<T, B, C>(body: B, callback: C) -> Self
    where
        B: FnOnce(&mut RenderContext<'_>) -> T + Send + 'static,
        C: FnOnce(T) + Send + 'static,
    {
        Self {
            kind: "custom",
            body: Box::new(move |ctx: &mut RenderContext<'_>| callback(body(ctx))),
        }
    }

    /// Creates a render object. The callback receives its handle, or the
    /// error if the texture or program failed to load.
    pub fn create_object(
        desc: ObjectDesc,
        callback: impl FnOnce(Result<ObjectHandle>) + Send + 'static,
    ) -> Self {
        Self {
            kind: "create_object",
            body: Box::new(move |ctx: &mut RenderContext<'_>| {
                let result = ctx.create_object(&desc);
                if let Err(e) = &result {
                    log::error!("render object creation failed: {e:#}");
                }
                callback(result);
            }),
        }
    }

    /// Uploads the object's buffers.
    ///
    /// Marks the object async; panics here, on the submitting thread, if it
    /// auto-updates.
    pub fn update_buffers(handle: &ObjectHandle) -> Self {
        let mut job = Self::for_object(handle, |object, gpu| object.update_buffers(gpu));
        job.kind = "update_buffers";
        job
    }

    /// Mutates the object on the rendering thread.
    ///
    /// Marks the object async; panics here, on the submitting thread, if it
    /// auto-updates.
    pub fn for_object(
        handle: &ObjectHandle,
        f: impl FnOnce(&mut RenderObject, &mut dyn Backend) + Send + 'static,
    ) -> Self {
        handle.mark_async();
        let id = handle.id();
        Self {
            kind: "object",
            body: Box::new(move |ctx: &mut RenderContext<'_>| {
                if ctx.with_object(id, f).is_none() {
                    log::warn!("job targets unknown render object {}", id.raw());
                }
            }),
        }
    }

    /// Installs a wait-gate on the object.
    pub fn install_gate(handle: &ObjectHandle, gate: RenderGate) -> Self {
        let id = handle.id();
        Self {
            kind: "install_gate",
            body: Box::new(move |ctx: &mut RenderContext<'_>| ctx.install_gate(id, gate)),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub(crate) fn run(self, ctx: &mut RenderContext<'_>) {
        log::trace!("running {} job", self.kind);
        (self.body)(ctx);
    }
}
