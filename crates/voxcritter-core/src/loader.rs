use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::{CodecError, DecodeOptions, decode_with};
use crate::model::Creature;
use crate::source::{PixelSource, PngFileSource, SourceError};
use crate::stego::{StegoError, StopRule, extract_rgb_payload};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Extraction error: {0}")]
    Stego(#[from] StegoError),
    #[error("Decode error: {0}")]
    Codec(#[from] CodecError),
}

/// Settings for the image → payload → creature pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// How far LSB extraction reads.
    pub stop: StopRule,
    /// Decoder settings.
    pub decode: DecodeOptions,
    /// Composite translucent pixels over white before extraction, as a
    /// browser canvas with a white background does.
    pub flatten_alpha: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            stop: StopRule::default(),
            decode: DecodeOptions::default(),
            flatten_alpha: true,
        }
    }
}

/// Read the pixels of `source` and extract the voxel-painter chunk text.
///
/// Returns `Ok(None)` when the image carries no voxel-painter payload.
pub fn load_payload<S: PixelSource>(
    source: &mut S,
    options: &LoadOptions,
) -> Result<Option<String>, LoadError> {
    let mut frame = source.read_pixels()?;
    if options.flatten_alpha {
        frame.flatten_on_white();
    }
    let payload = extract_rgb_payload(frame.rgba(), options.stop)?;
    match &payload {
        Some(text) => debug!("extracted {} payload chars", text.chars().count()),
        None => debug!(
            "{}x{} image carries no payload",
            frame.width(),
            frame.height()
        ),
    }
    Ok(payload)
}

/// Decode the creature hidden in `source`.
///
/// Returns `Ok(None)` when the image carries no voxel-painter payload.
///
/// # Examples
/// ```
/// use voxcritter_core::{LoadOptions, PixelFrame, StopRule, embed_payload, load_creature};
///
/// let mut frame = PixelFrame::filled(16, 16, [200, 180, 160, 255]);
/// embed_payload(frame.rgba_mut(), "C=ff0000:A=wh", StopRule::default())?;
///
/// let creature = load_creature(frame, &LoadOptions::default())?.expect("payload");
/// assert_eq!(creature.voxels.get([1, 0, 0]), Some(0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
/// Returns `LoadError` when the pixels cannot be read, extraction fails, or
/// the payload does not decode.
pub fn load_creature<S: PixelSource>(
    mut source: S,
    options: &LoadOptions,
) -> Result<Option<Creature>, LoadError> {
    let Some(payload) = load_payload(&mut source, options)? else {
        return Ok(None);
    };
    let creature = decode_with(&payload, &options.decode)?;
    Ok(Some(creature))
}

/// Decode the creature hidden in the image at `path`.
pub fn load_creature_file(
    path: &Path,
    options: &LoadOptions,
) -> Result<Option<Creature>, LoadError> {
    let source = PngFileSource::open(path)?;
    info!("loading creature from {}", path.display());
    load_creature(source, options)
}
