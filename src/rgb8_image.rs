//! The codec's own RGB8 raster type, independent of the `image` crate.
//!
//! Keeping this separate from `image::RgbImage` means `block_image` and the
//! rest of the core never need to know about the `image` crate at all; only
//! the CLI drivers (and this module's `From`/`TryFrom` impls) touch it.

use image::RgbImage;

/// An immutable RGB8 raster: `width * height` pixels, row-major,
/// R-G-B interleaved, 3 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rgb8Image {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u8>,
}

impl Rgb8Image {
    /// An empty (zero-size) image — the `load_rgb8` failure sentinel.
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Vec::new(),
        }
    }

    /// Whether this is the zero-size sentinel.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Loads an 8-bit RGB image from a PNG (or any format `image` supports),
    /// stripping alpha and narrowing 16-bit channels. Returns the empty
    /// sentinel on any failure, matching the original `LoadPNG`'s contract.
    pub fn load(path: &std::path::Path) -> Self {
        match image::open(path) {
            Ok(dynimg) => {
                let rgb = dynimg.to_rgb8();
                Self {
                    width: rgb.width() as usize,
                    height: rgb.height() as usize,
                    pixels: rgb.into_raw(),
                }
            }
            Err(_) => Self::empty(),
        }
    }

    /// Saves this image as a PNG.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let buf: RgbImage =
            RgbImage::from_raw(self.width as u32, self.height as u32, self.pixels.clone())
                .expect("width/height consistent with pixel buffer length");
        buf.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_empty() {
        assert!(Rgb8Image::empty().is_empty());
    }

    #[test]
    fn load_missing_file_returns_empty() {
        let img = Rgb8Image::load(std::path::Path::new("/nonexistent/path/does-not-exist.png"));
        assert!(img.is_empty());
    }
}
