use std::collections::HashMap;

use crate::coords::{Rect, Vec2};
use crate::render::TextureSource;

/// Letters of the stock font sheet, in sheet order.
pub const DEFAULT_LETTERS: &str =
    " !\"#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[\\]^_";

const DEFAULT_GLYPH: f32 = 16.0;
const DEFAULT_COLUMNS: usize = 16;

/// Screen rectangle and texture rectangle of one laid-out character.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphQuad {
    pub rect: Rect,
    pub tex: Rect,
}

/// Monospaced font read from a grid of equally sized glyphs.
///
/// Glyphs are stored left to right, top to bottom, in the order of the
/// letter string.
#[derive(Debug, Clone)]
pub struct BitmapFont {
    texture: TextureSource,
    glyph_size: Vec2,
    glyphs: HashMap<char, Vec2>,
}

impl BitmapFont {
    /// 16x16 glyphs, 16 per row.
    pub fn new(texture: TextureSource, letters: &str) -> Self {
        Self::with_grid(
            texture,
            letters,
            Vec2::new(DEFAULT_GLYPH, DEFAULT_GLYPH),
            DEFAULT_COLUMNS,
        )
    }

    pub fn with_grid(texture: TextureSource, letters: &str, glyph_size: Vec2, columns: usize) -> Self {
        assert!(columns > 0, "font grid needs at least one column");
        let glyphs = letters
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let (col, row) = (i % columns, i / columns);
                (
                    c,
                    Vec2::new(col as f32 * glyph_size.x, row as f32 * glyph_size.y),
                )
            })
            .collect();
        Self {
            texture,
            glyph_size,
            glyphs,
        }
    }

    pub fn texture(&self) -> &TextureSource {
        &self.texture
    }

    pub fn glyph_size(&self) -> Vec2 {
        self.glyph_size
    }

    /// Texture rectangle of `c`, if the sheet has it.
    pub fn glyph(&self, c: char) -> Option<Rect> {
        self.glyphs
            .get(&c)
            .map(|origin| Rect::from_origin_size(*origin, self.glyph_size))
    }

    /// Lays out `text` starting with its first line's bottom-left corner at
    /// `origin`.
    ///
    /// Lines run downwards. A line breaks at `\n` or after `wrap` characters.
    /// Characters missing from the sheet leave a blank cell.
    pub fn layout(&self, text: &str, origin: Vec2, wrap: usize) -> Vec<GlyphQuad> {
        let wrap = wrap.max(1);
        let Vec2 { x: w, y: h } = self.glyph_size;
        let (mut col, mut line) = (0usize, 0usize);
        let mut quads = Vec::with_capacity(text.len());

        for c in text.chars() {
            if c == '\n' {
                col = 0;
                line += 1;
                continue;
            }
            if col == wrap {
                col = 0;
                line += 1;
            }
            match self.glyph(c) {
                Some(tex) => quads.push(GlyphQuad {
                    rect: Rect::new(origin.x + col as f32 * w, origin.y - line as f32 * h, w, h),
                    tex,
                }),
                None => log::trace!("font has no glyph for {c:?}"),
            }
            col += 1;
        }
        quads
    }
}
