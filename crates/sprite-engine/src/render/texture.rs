use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::device::{Backend, TextureId};

/// A sampled RGBA texture with its pixel size.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
}

impl Texture {
    /// Decodes an image file and uploads it.
    pub fn load(gpu: &mut dyn Backend, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("unable to load texture {}", path.display()))?
            .to_rgba8();
        let (width, height) = image.dimensions();
        log::debug!("loaded texture {} ({width}x{height})", path.display());
        Ok(Self::from_rgba(gpu, width, height, image.as_raw()))
    }

    /// Uploads tightly packed RGBA8 pixels (row 0 is the top row).
    pub fn from_rgba(gpu: &mut dyn Backend, width: u32, height: u32, pixels: &[u8]) -> Self {
        assert!(width > 0 && height > 0, "texture must not be empty");
        assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "pixel data does not match {width}x{height} RGBA"
        );
        let id = gpu.create_texture(width, height, pixels);
        Self { id, width, height }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Maps texture pixels to normalized UV (division by the texture size).
    pub fn pixel_to_tex_coord(&self, x: f32, y: f32) -> (f32, f32) {
        (x / self.width as f32, y / self.height as f32)
    }

    pub fn bind(&self, gpu: &mut dyn Backend) {
        gpu.bind_texture(self.id);
    }
}

/// Where a render object's texture comes from.
///
/// This is plain data so object creation can be described on any thread and
/// carried through the job queue.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    File(PathBuf),
    Rgba {
        width: u32,
        height: u32,
        pixels: Vec<u8>,
    },
}

impl TextureSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        TextureSource::File(path.into())
    }

    /// Single-colour texture of the given size.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        TextureSource::Rgba {
            width,
            height,
            pixels,
        }
    }

    pub fn load(&self, gpu: &mut dyn Backend) -> Result<Texture> {
        match self {
            TextureSource::File(path) => Texture::load(gpu, path),
            TextureSource::Rgba {
                width,
                height,
                pixels,
            } => Ok(Texture::from_rgba(gpu, *width, *height, pixels)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::RecordingBackend;

    fn texture(width: u32, height: u32) -> Texture {
        let mut gpu = RecordingBackend::new();
        TextureSource::solid(width, height, [255, 255, 255, 255])
            .load(&mut gpu)
            .unwrap()
    }

    #[test]
    fn origin_maps_to_zero() {
        assert_eq!(texture(64, 32).pixel_to_tex_coord(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn full_size_maps_to_one() {
        assert_eq!(texture(64, 32).pixel_to_tex_coord(64.0, 32.0), (1.0, 1.0));
    }

    #[test]
    fn mapping_is_linear() {
        let t = texture(64, 32);
        assert_eq!(t.pixel_to_tex_coord(16.0, 8.0), (0.25, 0.25));
        assert_eq!(t.pixel_to_tex_coord(48.0, 16.0), (0.75, 0.5));
    }

    #[test]
    fn solid_source_fills_every_pixel() {
        let TextureSource::Rgba { pixels, .. } = TextureSource::solid(2, 3, [1, 2, 3, 4]) else {
            panic!("expected raw pixels");
        };
        assert_eq!(pixels.len(), 24);
        assert!(pixels.chunks(4).all(|p| p == [1, 2, 3, 4]));
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut gpu = RecordingBackend::new();
        let err = Texture::load(&mut gpu, "/no/such/tiles.png").unwrap_err();
        assert!(format!("{err:#}").contains("unable to load texture"));
    }
}
