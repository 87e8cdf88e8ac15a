use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use log::debug;

use super::{PixelFrame, PixelSource, SourceError};

/// `PixelSource` backed by an image file on disk.
///
/// The file is read when opened; decoding happens on `read_pixels`. Any
/// layout the decoder understands is converted to RGBA8.
pub struct PngFileSource {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl PngFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let bytes = fs::read(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the encoded file in bytes.
    pub fn file_len(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl PixelSource for PngFileSource {
    fn read_pixels(&mut self) -> Result<PixelFrame, SourceError> {
        let image = image::load_from_memory(&self.bytes).map_err(|e| SourceError::Image {
            context: "image decode",
            message: e.to_string(),
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        debug!("decoded {} as {width}x{height} RGBA", self.path.display());
        PixelFrame::new(width, height, rgba.into_raw())
    }
}

/// Write `frame` to `path` as a PNG.
///
/// # Errors
/// Returns `SourceError::Image` when encoding or writing fails.
pub fn write_png(path: &Path, frame: &PixelFrame) -> Result<(), SourceError> {
    let image = RgbaImage::from_raw(frame.width(), frame.height(), frame.rgba().to_vec()).ok_or(
        SourceError::InvalidDimensions {
            width: frame.width(),
            height: frame.height(),
            len: frame.rgba().len(),
        },
    )?;
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| SourceError::Image {
            context: "png encode",
            message: e.to_string(),
        })
}
