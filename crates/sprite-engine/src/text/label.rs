use std::sync::Arc;

use anyhow::Result;

use crate::coords::{Rect, Vec2};
use crate::jobs::{JobSender, RenderJob};
use crate::render::QUAD_VERTICES;
use crate::renderer::{ObjectDesc, ObjectHandle, RenderContext};

use super::BitmapFont;

const DEFAULT_WRAP: usize = 100;

/// A run of text drawn from a bitmap font.
///
/// Every character slot is allocated up front as an empty quad, so updates
/// only rewrite quads in place. Text longer than the capacity is truncated.
#[derive(Debug, Clone)]
pub struct TextLabel {
    handle: ObjectHandle,
    font: Arc<BitmapFont>,
    capacity: usize,
    wrap: usize,
    text: String,
    origin: Vec2,
}

impl TextLabel {
    /// Builds the label's render object. Rendering thread only.
    pub fn create(ctx: &mut RenderContext<'_>, font: Arc<BitmapFont>, capacity: usize) -> Result<Self> {
        let desc = ObjectDesc::new(font.texture().clone(), capacity);
        let handle = ctx.create_object(&desc)?;
        ctx.with_object(handle.id(), |object, gpu| {
            for _ in 0..capacity {
                object.create_rect(Rect::zero(), Rect::zero());
            }
            object.update_buffers(gpu);
        });
        log::debug!("created text label with {capacity} slots");

        Ok(Self {
            handle,
            font,
            capacity,
            wrap: DEFAULT_WRAP,
            text: String::new(),
            origin: Vec2::ZERO,
        })
    }

    /// Job that creates a label and hands it to `callback`.
    pub fn create_job(
        font: Arc<BitmapFont>,
        capacity: usize,
        callback: impl FnOnce(Result<TextLabel>) + Send + 'static,
    ) -> RenderJob {
        RenderJob::with_callback(move |ctx| Self::create(ctx, font, capacity), callback)
    }

    pub fn handle(&self) -> &ObjectHandle {
        &self.handle
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Characters per line before wrapping.
    pub fn set_wrap(&mut self, wrap: usize) {
        self.wrap = wrap.max(1);
    }

    /// Job that replaces the drawn text and uploads it. The label's own
    /// `text` and `origin` are left alone; `set_text` records them once the
    /// job is queued.
    pub fn text_job(&self, text: &str, origin: Vec2) -> RenderJob {
        let mut quads = self.font.layout(text, origin, self.wrap);
        if quads.len() > self.capacity {
            log::warn!(
                "text of {} glyphs truncated to {} slots",
                quads.len(),
                self.capacity
            );
            quads.truncate(self.capacity);
        }

        let capacity = self.capacity;
        RenderJob::for_object(&self.handle, move |object, gpu| {
            for slot in 0..capacity {
                object.remove_square(slot * QUAD_VERTICES);
            }
            for (slot, quad) in quads.iter().enumerate() {
                object.modify_rect(slot * QUAD_VERTICES, quad.rect, quad.tex);
            }
            object.update_buffers(gpu);
        })
    }

    /// Submits a text change. Returns false, keeping the previous text, if
    /// the queue rejected it.
    pub fn set_text(&mut self, jobs: &JobSender, text: &str, origin: Vec2) -> bool {
        if !jobs.submit(self.text_job(text, origin)) {
            return false;
        }
        self.text = text.to_owned();
        self.origin = origin;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::TextureSource;
    use crate::renderer::{Renderer, RendererConfig};
    use crate::shader::sprite;
    use crate::text::DEFAULT_LETTERS;
    use crate::window::headless::HeadlessWindow;

    fn font() -> Arc<BitmapFont> {
        Arc::new(BitmapFont::new(
            TextureSource::solid(256, 64, [255; 4]),
            DEFAULT_LETTERS,
        ))
    }

    fn renderer() -> Renderer<HeadlessWindow> {
        Renderer::new(HeadlessWindow::new(100), RendererConfig::default())
    }

    fn drawn_glyphs(r: &Renderer<HeadlessWindow>, label: &TextLabel) -> usize {
        let object = r.scene().get(label.handle().id()).unwrap();
        let id = object.vao().buffer(sprite::ATTR_TEXCOORD).id().unwrap();
        r.window()
            .gpu
            .contents(id)
            .chunks(2 * QUAD_VERTICES)
            .filter(|quad| quad.iter().any(|v| *v != 0.0))
            .count()
    }

    #[test]
    fn new_label_is_blank_and_uploaded() {
        let mut r = renderer();
        let label = TextLabel::create(&mut r.context(), font(), 8).unwrap();
        let object = r.scene().get(label.handle().id()).unwrap();
        assert_eq!(object.free_vertex(), 8 * QUAD_VERTICES);
        assert!(!object.vao().is_dirty());
        assert_eq!(drawn_glyphs(&r, &label), 0);
    }

    #[test]
    fn set_text_draws_one_quad_per_glyph() {
        let mut r = renderer();
        let mut label = TextLabel::create(&mut r.context(), font(), 8).unwrap();
        assert!(label.set_text(&r.jobs(), "HELLO", Vec2::new(10.0, 10.0)));
        r.frame();
        assert_eq!(drawn_glyphs(&r, &label), 5);
        assert_eq!(label.text(), "HELLO");
    }

    #[test]
    fn shorter_text_clears_old_glyphs() {
        let mut r = renderer();
        let mut label = TextLabel::create(&mut r.context(), font(), 8).unwrap();
        label.set_text(&r.jobs(), "LONGER", Vec2::ZERO);
        label.set_text(&r.jobs(), "HI", Vec2::ZERO);
        r.frame();
        r.frame();
        assert_eq!(drawn_glyphs(&r, &label), 2);
    }

    #[test]
    fn overflow_is_truncated() {
        let mut r = renderer();
        let mut label = TextLabel::create(&mut r.context(), font(), 3).unwrap();
        label.set_text(&r.jobs(), "ABCDEFG", Vec2::ZERO);
        r.frame();
        assert_eq!(drawn_glyphs(&r, &label), 3);
    }

    #[test]
    fn label_can_be_created_through_the_queue() {
        let mut r = renderer();
        let (tx, rx) = crossbeam_channel::bounded(1);
        r.jobs().submit(TextLabel::create_job(font(), 4, move |label| {
            tx.send(label.map(|l| l.capacity())).unwrap();
        }));
        r.frame();
        assert_eq!(rx.try_recv().unwrap().unwrap(), 4);
        assert_eq!(r.scene().len(), 1);
    }

    #[test]
    fn rejected_text_keeps_previous_text() {
        let mut r = Renderer::new(
            HeadlessWindow::new(100),
            RendererConfig {
                job_capacity: 1,
                ..RendererConfig::default()
            },
        );
        let mut label = TextLabel::create(&mut r.context(), font(), 8).unwrap();
        assert!(label.set_text(&r.jobs(), "OLD", Vec2::new(1.0, 2.0)));
        assert!(!label.set_text(&r.jobs(), "NEW", Vec2::ZERO));
        assert_eq!(label.text(), "OLD");
        assert_eq!(label.origin(), Vec2::new(1.0, 2.0));

        r.frame();
        assert_eq!(drawn_glyphs(&r, &label), 3);
    }
}
