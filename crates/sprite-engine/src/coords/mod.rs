//! Coordinate and geometry types.
//!
//! Canonical CPU space:
//! - Pixels
//! - Origin bottom-left
//! - +X right, +Y up
//!
//! Texture space is the exception: texture pixel rectangles are measured from
//! the image's top-left corner, matching how sprite sheets are authored.

mod color;
mod rect;
mod vec2;
mod viewport;

pub use color::ColorRgba;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
