//! Bitmap-font text built on render objects.
//!
//! A label owns one render object with a quad per character slot and is
//! only ever changed through the job queue, so text can be set from any
//! thread.

mod font;
mod label;

pub use font::{BitmapFont, DEFAULT_LETTERS, GlyphQuad};
pub use label::TextLabel;
