use log::debug;

use super::error::StegoError;
use super::layout;
use super::parser::StopRule;
use super::reader::char_capacity;

/// Hide `text` in the least-significant bits of `pixels`.
///
/// Bits are written most-significant first, one per mapped byte, and every
/// other bit of the carrier is left untouched. `StopRule::Terminator` appends
/// its terminator byte; the other rules write `text` alone. Returns the
/// number of carrier bits written. `index_map` must be strictly increasing.
///
/// # Errors
/// - `StegoError::NonLatin1` when a character does not fit in one byte.
/// - `StegoError::CapacityExceeded` when the carrier is too small. The
///   carrier is not modified in either case.
pub fn embed_text<F>(
    pixels: &mut [u8],
    text: &str,
    index_map: F,
    stop: StopRule,
) -> Result<usize, StegoError>
where
    F: Fn(usize) -> usize,
{
    let mut bytes = text
        .chars()
        .enumerate()
        .map(|(position, ch)| {
            u8::try_from(u32::from(ch)).map_err(|_| StegoError::NonLatin1 { ch, position })
        })
        .collect::<Result<Vec<u8>, StegoError>>()?;
    if let StopRule::Terminator(terminator) = stop {
        bytes.push(terminator);
    }

    let available = char_capacity(pixels.len(), &index_map);
    if bytes.len() > available {
        return Err(StegoError::CapacityExceeded {
            needed: bytes.len(),
            available,
        });
    }

    let mut cursor = 0usize;
    for byte in &bytes {
        for shift in (0..layout::BITS_PER_CHAR).rev() {
            let bit = (byte >> shift) & 1;
            let target = &mut pixels[index_map(cursor)];
            *target = (*target & !1) | bit;
            cursor += 1;
        }
    }
    debug!("embedded {} chars into {} carrier bits", bytes.len(), cursor);
    Ok(cursor)
}

/// Hide a voxel-painter payload (prefix, delimiter, chunk text) in an RGBA
/// buffer using the R, G, B channel walk.
///
/// # Errors
/// Same as [`embed_text`].
pub fn embed_payload(pixels: &mut [u8], chunks: &str, stop: StopRule) -> Result<usize, StegoError> {
    let mut text = String::with_capacity(layout::PAYLOAD_OFFSET + chunks.len());
    text.push_str(layout::MAGIC_PREFIX);
    text.push(layout::PAYLOAD_DELIMITER);
    text.push_str(chunks);
    embed_text(pixels, &text, layout::rgb_channel_index, stop)
}
