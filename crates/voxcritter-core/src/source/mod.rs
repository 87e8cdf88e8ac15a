mod png;

pub use png::{PngFileSource, write_png};

use thiserror::Error;

use crate::stego::layout::BYTES_PER_PIXEL;

/// Decoded image as tightly packed RGBA8 rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelFrame {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl PixelFrame {
    /// Wrap an RGBA buffer, checking it holds exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, SourceError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL));
        if expected != Some(rgba.len()) {
            return Err(SourceError::InvalidDimensions {
                width,
                height,
                len: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Opaque frame filled with one color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            rgba: rgba.repeat(pixels),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn rgba_mut(&mut self) -> &mut [u8] {
        &mut self.rgba
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }

    /// Composite every pixel over opaque white, leaving alpha at 255.
    ///
    /// Fully opaque pixels keep their exact channel values.
    pub fn flatten_on_white(&mut self) {
        for pixel in self.rgba.chunks_exact_mut(BYTES_PER_PIXEL) {
            let alpha = u32::from(pixel[3]);
            if alpha == 255 {
                continue;
            }
            for channel in &mut pixel[..3] {
                let blended = u32::from(*channel) * alpha + 255 * (255 - alpha);
                *channel = ((blended + 127) / 255) as u8;
            }
            pixel[3] = 255;
        }
    }
}

/// Capability that yields the pixels of one image.
pub trait PixelSource {
    fn read_pixels(&mut self) -> Result<PixelFrame, SourceError>;
}

impl PixelSource for PixelFrame {
    fn read_pixels(&mut self) -> Result<PixelFrame, SourceError> {
        Ok(self.clone())
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image error ({context}): {message}")]
    Image {
        context: &'static str,
        message: String,
    },
    #[error("invalid frame: {width}x{height} does not match {len} RGBA bytes")]
    InvalidDimensions { width: u32, height: u32, len: usize },
}

#[cfg(test)]
mod tests {
    use super::{PixelFrame, PixelSource, SourceError};

    #[test]
    fn frame_rejects_wrong_length() {
        let err = PixelFrame::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            SourceError::InvalidDimensions {
                width: 2,
                height: 2,
                len: 15
            }
        ));
    }

    #[test]
    fn flatten_on_white_blends_transparent_pixels() {
        let mut frame = PixelFrame::new(3, 1, vec![
            10, 20, 30, 255, // opaque, untouched
            0, 0, 0, 0, // transparent, becomes white
            0, 100, 255, 128, // half transparent
        ])
        .unwrap();
        frame.flatten_on_white();
        assert_eq!(&frame.rgba()[0..4], &[10, 20, 30, 255]);
        assert_eq!(&frame.rgba()[4..8], &[255, 255, 255, 255]);
        assert_eq!(&frame.rgba()[8..12], &[127, 177, 255, 255]);
    }

    #[test]
    fn frame_is_its_own_source() {
        let mut frame = PixelFrame::filled(2, 1, [1, 2, 3, 4]);
        let read = frame.read_pixels().unwrap();
        assert_eq!(read.rgba(), &[1, 2, 3, 4, 1, 2, 3, 4]);
    }
}
