use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::error::StegoError;
use super::layout;
use super::reader::{LsbReader, char_capacity};

/// Where LSB extraction stops.
///
/// The carrier itself carries no length; the embedder and the extractor have
/// to agree on one of these rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopRule {
    /// Stop at the first character equal to this byte (not included).
    Terminator(u8),
    /// Read exactly this many characters.
    Length(usize),
    /// Read every whole character the carrier holds.
    EndOfBuffer,
}

impl Default for StopRule {
    fn default() -> Self {
        StopRule::Terminator(layout::DEFAULT_TERMINATOR)
    }
}

/// Extract the raw text hidden in `pixels`, without the prefix check.
///
/// Each byte becomes one `char` with the same code point. Extraction also
/// stops when `index_map` leaves the buffer; a trailing partial character is
/// dropped. `index_map` should be strictly increasing; at most one bit is
/// read per carrier byte.
///
/// # Errors
/// Returns `StegoError::TooShort` when `StopRule::Length` asks for more
/// characters than the carrier holds.
pub fn extract_text<F>(pixels: &[u8], index_map: F, stop: StopRule) -> Result<String, StegoError>
where
    F: Fn(usize) -> usize,
{
    Ok(read_text(pixels, index_map, stop, None)?.unwrap_or_default())
}

/// Shared extraction loop. With `prefix` set, reading stops (returning
/// `None`) at the first character that departs from it.
fn read_text<F>(
    pixels: &[u8],
    index_map: F,
    stop: StopRule,
    prefix: Option<&str>,
) -> Result<Option<String>, StegoError>
where
    F: Fn(usize) -> usize,
{
    if let StopRule::Length(needed) = stop {
        let actual = char_capacity(pixels.len(), &index_map);
        if actual < needed {
            return Err(StegoError::TooShort { needed, actual });
        }
    }

    let expected = prefix.map(str::as_bytes).unwrap_or_default();
    let mut reader = LsbReader::new(pixels, index_map);
    let mut text = String::new();
    let mut count = 0usize;
    loop {
        if matches!(stop, StopRule::Length(needed) if count >= needed) {
            break;
        }
        let Some(byte) = reader.read_byte() else {
            break;
        };
        if matches!(stop, StopRule::Terminator(terminator) if byte == terminator) {
            break;
        }
        if expected.get(count).is_some_and(|wanted| *wanted != byte) {
            trace!("prefix mismatch at char {count}");
            return Ok(None);
        }
        text.push(char::from(byte));
        count += 1;
    }
    trace!(
        "extracted {count} chars from {} carrier bits",
        reader.bits_read()
    );
    Ok(Some(text))
}

/// Extract a voxel-painter payload from `pixels`.
///
/// Returns `Ok(None)` when the hidden text does not start with
/// `voxel-painter:`; otherwise the chunk text after the prefix and its
/// one-character delimiter.
///
/// # Examples
/// ```
/// use voxcritter_core::stego::{StopRule, embed_payload, extract_payload, rgb_channel_index};
///
/// let mut pixels = vec![0u8; 4 * 200];
/// embed_payload(&mut pixels, "C=ff0000", StopRule::default()).unwrap();
///
/// let payload = extract_payload(&pixels, rgb_channel_index, StopRule::default()).unwrap();
/// assert_eq!(payload.as_deref(), Some("C=ff0000"));
///
/// let blank = vec![0u8; 4 * 200];
/// assert_eq!(extract_payload(&blank, rgb_channel_index, StopRule::default()).unwrap(), None);
/// ```
///
/// # Errors
/// Propagates `StegoError` from [`extract_text`]. Reading stops at the
/// first character that does not match the prefix, so large carriers
/// without a payload are rejected after a few bytes.
pub fn extract_payload<F>(
    pixels: &[u8],
    index_map: F,
    stop: StopRule,
) -> Result<Option<String>, StegoError>
where
    F: Fn(usize) -> usize,
{
    let text = read_text(pixels, index_map, stop, Some(layout::MAGIC_PREFIX))?;
    let payload = text.as_deref().and_then(strip_magic);
    if payload.is_none() {
        debug!("carrier holds no voxel-painter prefix");
    }
    Ok(payload)
}

/// Extract a payload from an RGBA buffer using the R, G, B channel walk.
pub fn extract_rgb_payload(pixels: &[u8], stop: StopRule) -> Result<Option<String>, StegoError> {
    extract_payload(pixels, layout::rgb_channel_index, stop)
}

/// Check the magic prefix and return the text following it.
///
/// # Examples
/// ```
/// use voxcritter_core::stego::strip_magic;
///
/// assert_eq!(strip_magic("voxel-painter:#A=gh").as_deref(), Some("A=gh"));
/// assert_eq!(strip_magic("not-a-payload-prefix"), None);
/// ```
pub fn strip_magic(text: &str) -> Option<String> {
    let prefix_len = layout::MAGIC_PREFIX.chars().count();
    let head: String = text.chars().take(prefix_len).collect();
    if head != layout::MAGIC_PREFIX {
        return None;
    }
    Some(text.chars().skip(layout::PAYLOAD_OFFSET).collect())
}
